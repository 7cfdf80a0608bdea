use std::{future::Future, path::PathBuf, sync::Arc};

use crate::{
    foundation::error::PosterResult,
    poster::{
        cache::Lookup,
        notice::{Notice, Notifier},
        orchestrator::{OpenHandle, Orchestrator},
        sink::ArtifactSink,
    },
    render::compositor::PosterArtifact,
    roster::PersonRecord,
};

/// The three user actions on the poster view.
#[derive(Clone)]
pub struct ViewController {
    orchestrator: Orchestrator,
    sink: Arc<dyn ArtifactSink>,
}

impl std::fmt::Debug for ViewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewController")
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

impl ViewController {
    /// Controller saving downloads into `sink`.
    pub fn new(orchestrator: Orchestrator, sink: Arc<dyn ArtifactSink>) -> Self {
        Self { orchestrator, sink }
    }

    /// Underlying orchestrator.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Show the poster for `index`: preview now, high resolution when ready.
    pub fn open(&self, index: usize) -> PosterResult<OpenHandle> {
        self.orchestrator.open_poster(index)
    }

    /// Hide the view. Background generation is not cancelled.
    pub fn close(&self) {
        self.orchestrator.close();
    }

    /// Save the high-resolution poster of the open view.
    ///
    /// The open index is read when this is called. If the poster is not cached yet, a
    /// [`Notice::GenerationPending`] is raised and the running generation is joined (or started),
    /// and the returned future saves once it resolves. Resolves to `None` when no view is open.
    pub fn download(
        &self,
    ) -> impl Future<Output = PosterResult<Option<PathBuf>>> + Send + 'static + use<> {
        let notifier: Arc<dyn Notifier> = self.orchestrator.notifier().clone();
        let sink = self.sink.clone();
        let prepared = self.prepare_download();

        async move {
            let (index, person, lookup) = match prepared {
                Ok(Some(found)) => found,
                Ok(None) => {
                    notifier.notify(Notice::NothingToDownload);
                    return Ok(None);
                }
                Err(err) => return Err(err),
            };

            let artifact = match lookup {
                Lookup::Ready(artifact) => artifact,
                Lookup::Pending(generation) | Lookup::Started(generation) => {
                    notifier.notify(Notice::GenerationPending { index });
                    match generation.await {
                        Ok(artifact) => artifact,
                        Err(err) => {
                            notifier.notify(Notice::GenerationFailed {
                                index,
                                message: err.to_string(),
                            });
                            return Err(err.duplicate());
                        }
                    }
                }
            };

            let path = save(sink.as_ref(), &person, &artifact).await?;
            notifier.notify(Notice::Saved { path: path.clone() });
            Ok(Some(path))
        }
    }

    fn prepare_download(&self) -> PosterResult<Option<(usize, PersonRecord, Lookup)>> {
        let Some(index) = self.orchestrator.current_index() else {
            return Ok(None);
        };
        let person = self.orchestrator.person(index)?;
        let lookup = self.orchestrator.ensure_generation(index)?;
        Ok(Some((index, person, lookup)))
    }
}

async fn save(
    sink: &dyn ArtifactSink,
    person: &PersonRecord,
    artifact: &PosterArtifact,
) -> PosterResult<PathBuf> {
    sink.save(&person.poster_filename(), artifact).await
}

#[cfg(test)]
#[path = "../../tests/unit/poster/view.rs"]
mod tests;
