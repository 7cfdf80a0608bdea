use std::time::Duration;

use parking_lot::Mutex;

use super::*;
use crate::{
    assets::{fetch::ImageFetcher, loader::AssetLoader},
    foundation::{config::PosterConfig, error::PosterError},
    poster::surface::PosterSurface,
    render::{compositor::Compositor, text::TextEngine},
    roster::Roster,
};

struct NoAssets;

#[async_trait::async_trait]
impl ImageFetcher for NoAssets {
    async fn fetch_bytes(&self, url: &str) -> PosterResult<Vec<u8>> {
        Err(PosterError::fetch(format!("offline: {url}")))
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<Notice>>);

impl Notifier for Recorder {
    fn notify(&self, notice: Notice) {
        self.0.lock().push(notice);
    }
}

#[derive(Default)]
struct MemSink(Mutex<Vec<(String, usize)>>);

#[async_trait::async_trait]
impl ArtifactSink for MemSink {
    async fn save(&self, filename: &str, artifact: &PosterArtifact) -> PosterResult<PathBuf> {
        self.0
            .lock()
            .push((filename.to_string(), artifact.as_bytes().len()));
        Ok(PathBuf::from("mem").join(filename))
    }
}

fn controller() -> (ViewController, Arc<Recorder>, Arc<MemSink>) {
    let loader = Arc::new(AssetLoader::new(
        Arc::new(NoAssets),
        "mem://placeholder",
        Duration::from_secs(5),
    ));
    let compositor =
        Compositor::new(loader, TextEngine::without_font(), &PosterConfig::default()).unwrap();
    let notices = Arc::new(Recorder::default());
    let sink = Arc::new(MemSink::default());
    let orchestrator = Orchestrator::new(
        Arc::new(compositor),
        Roster::new(vec![PersonRecord {
            name: "Jane Doe".to_string(),
            ..PersonRecord::default()
        }]),
        PosterSurface::default(),
        notices.clone(),
        Duration::from_secs(30),
    );
    (ViewController::new(orchestrator, sink.clone()), notices, sink)
}

#[tokio::test]
async fn download_without_open_view_only_notifies() {
    let (view, notices, sink) = controller();
    assert_eq!(view.download().await.unwrap(), None);
    assert_eq!(*notices.0.lock(), vec![Notice::NothingToDownload]);
    assert!(sink.0.lock().is_empty());
}

#[tokio::test]
async fn download_after_upgrade_saves_without_pending_notice() {
    let (view, notices, sink) = controller();
    view.open(0).unwrap().settled().await;

    let path = view.download().await.unwrap().unwrap();
    assert_eq!(path, PathBuf::from("mem").join("poster_Jane Doe.png"));
    assert_eq!(sink.0.lock()[0].0, "poster_Jane Doe.png");
    assert_eq!(*notices.0.lock(), vec![Notice::Saved { path }]);
}

#[tokio::test]
async fn download_after_close_has_nothing_to_save() {
    let (view, notices, _) = controller();
    view.open(0).unwrap().settled().await;
    view.close();
    assert_eq!(view.download().await.unwrap(), None);
    assert_eq!(notices.0.lock().last(), Some(&Notice::NothingToDownload));
}
