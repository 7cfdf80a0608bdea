use std::{collections::HashMap, io::Cursor, time::Duration};

use super::*;
use crate::{
    assets::{fetch::ImageFetcher, loader::AssetLoader},
    poster::{notice::LogNotifier, surface::SurfaceDraw},
    render::text::TextEngine,
};

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 100, 50, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[derive(Default)]
struct MemFetcher {
    files: HashMap<String, Vec<u8>>,
    gate: Option<Arc<tokio::sync::Semaphore>>,
    hang: bool,
}

#[async_trait::async_trait]
impl ImageFetcher for MemFetcher {
    async fn fetch_bytes(&self, url: &str) -> PosterResult<Vec<u8>> {
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await;
        }
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| PosterError::fetch(format!("404 {url}")))
    }
}

fn roster() -> Roster {
    Roster::new(vec![
        PersonRecord {
            name: "Jane Doe".to_string(),
            photo_url: Some("mem://jane.png".to_string()),
            ..PersonRecord::default()
        },
        PersonRecord {
            name: "Ada Roe".to_string(),
            ..PersonRecord::default()
        },
    ])
}

fn orchestrator(
    fetcher: MemFetcher,
    fetch_timeout: Duration,
    render_timeout: Duration,
) -> Orchestrator {
    let loader = Arc::new(AssetLoader::new(
        Arc::new(fetcher),
        "mem://placeholder",
        fetch_timeout,
    ));
    let compositor = Compositor::new(loader, TextEngine::without_font(), &PosterConfig::default())
        .unwrap();
    Orchestrator::new(
        Arc::new(compositor),
        roster(),
        PosterSurface::default(),
        Arc::new(LogNotifier),
        render_timeout,
    )
}

fn quick(fetcher: MemFetcher) -> Orchestrator {
    orchestrator(fetcher, Duration::from_secs(5), Duration::from_secs(30))
}

#[tokio::test]
async fn unknown_index_fails_without_opening_the_view() {
    let orch = quick(MemFetcher::default());
    assert!(matches!(orch.open_poster(9), Err(PosterError::NotFound(9))));
    assert_eq!(orch.view_state(), ViewState::default());
    assert!(!orch.surface().is_visible());
    assert_eq!(orch.surface().draw_count(), 0);
}

#[tokio::test]
async fn open_upgrades_to_the_cached_poster() {
    let orch = quick(MemFetcher {
        files: HashMap::from([("mem://jane.png".to_string(), png(8, 8))]),
        ..MemFetcher::default()
    });

    let handle = orch.open_poster(0).unwrap();
    assert_eq!(orch.current_index(), Some(0));
    assert!(orch.is_current(handle.ticket()));
    handle.settled().await;

    assert_eq!(
        orch.surface().draw_log(),
        vec![
            SurfaceDraw::PreviewLayout,
            SurfaceDraw::PreviewPhoto,
            SurfaceDraw::Artifact
        ]
    );
    assert_eq!(orch.cache().len(), 1);
}

#[tokio::test]
async fn reopening_another_index_invalidates_the_first_ticket() {
    let orch = quick(MemFetcher::default());
    let first = orch.open_poster(0).unwrap();
    let second = orch.open_poster(1).unwrap();
    assert!(!orch.is_current(first.ticket()));
    assert!(orch.is_current(second.ticket()));

    first.settled().await;
    second.settled().await;
    assert_eq!(orch.current_index(), Some(1));
    assert!(orch.cache().get(1).is_some());
}

#[tokio::test]
async fn close_before_generation_finishes_suppresses_the_draw() {
    let gate = Arc::new(tokio::sync::Semaphore::new(0));
    let orch = quick(MemFetcher {
        gate: Some(gate.clone()),
        ..MemFetcher::default()
    });

    let handle = orch.open_poster(1).unwrap();
    orch.close();
    let draws = orch.surface().draw_count();

    gate.add_permits(64);
    handle.settled().await;

    assert_eq!(orch.surface().draw_count(), draws);
    assert!(!orch.surface().is_visible());
    assert_eq!(orch.current_index(), None);
    assert!(orch.cache().get(1).is_some());
}

#[tokio::test]
async fn roster_replacement_keeps_cached_posters_until_cleared() {
    let orch = quick(MemFetcher::default());
    orch.open_poster(1).unwrap().settled().await;
    let cached = orch.cache().get(1).unwrap();

    orch.replace_roster(Roster::new(vec![PersonRecord::default(); 2]));
    assert!(orch.cache().get(1).unwrap().ptr_eq(&cached));
    assert_eq!(orch.person(1).unwrap().name, "");

    orch.clear_posters();
    assert!(orch.cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn hanging_generation_times_out_and_caches_nothing() {
    let orch = orchestrator(
        MemFetcher {
            hang: true,
            ..MemFetcher::default()
        },
        Duration::from_secs(600),
        Duration::from_secs(1),
    );

    let Lookup::Started(generation) = orch.ensure_generation(0).unwrap() else {
        panic!("expected a new generation");
    };
    let err = generation.await.unwrap_err();
    assert!(matches!(*err, PosterError::Timeout(1000)));
    assert!(orch.cache().is_empty());
    assert!(orch.cache().in_flight(0).is_none());
}
