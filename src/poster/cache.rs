use std::{collections::HashMap, future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::{
    foundation::error::{PosterError, PosterResult},
    render::compositor::PosterArtifact,
};

/// Outcome of one high-resolution generation, shared by everyone waiting on it.
pub type GenerationResult = Result<PosterArtifact, Arc<PosterError>>;

/// Pending high-resolution generation for one index.
pub type Generation = Shared<BoxFuture<'static, GenerationResult>>;

/// Answer of [`PosterCache::get_or_start`].
#[derive(Clone)]
pub enum Lookup {
    /// Artifact already cached.
    Ready(PosterArtifact),
    /// Generation already running; join it.
    Pending(Generation),
    /// Generation just created by this call; nothing drives it yet.
    Started(Generation),
}

impl std::fmt::Debug for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("Ready"),
            Self::Pending(_) => f.write_str("Pending"),
            Self::Started(_) => f.write_str("Started"),
        }
    }
}

#[derive(Default)]
struct CacheState {
    epoch: u64,
    completed: HashMap<usize, PosterArtifact>,
    in_flight: HashMap<usize, Generation>,
}

/// High-resolution posters by roster index, plus the generations still running.
///
/// An index has at most one generation in flight, and once an artifact is stored for an index it
/// is served unchanged until [`PosterCache::clear`]. Failed generations store nothing.
#[derive(Clone, Default)]
pub struct PosterCache {
    state: Arc<Mutex<CacheState>>,
}

impl std::fmt::Debug for PosterCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.state.lock();
        f.debug_struct("PosterCache")
            .field("completed", &st.completed.len())
            .field("in_flight", &st.in_flight.len())
            .finish()
    }
}

impl PosterCache {
    /// Cached artifact for `index`.
    pub fn get(&self, index: usize) -> Option<PosterArtifact> {
        self.state.lock().completed.get(&index).cloned()
    }

    /// Running generation for `index`.
    pub fn in_flight(&self, index: usize) -> Option<Generation> {
        self.state.lock().in_flight.get(&index).cloned()
    }

    /// Cached artifact, running generation, or a new generation built from `start`.
    ///
    /// `start` is called under the cache lock, only when neither of the others exists, and must not
    /// block. The returned [`Lookup::Started`] future stores its artifact when it completes.
    pub fn get_or_start<F, Fut>(&self, index: usize, start: F) -> Lookup
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PosterResult<PosterArtifact>> + Send + 'static,
    {
        let mut st = self.state.lock();
        if let Some(done) = st.completed.get(&index) {
            tracing::debug!(index, "poster cache hit");
            return Lookup::Ready(done.clone());
        }
        if let Some(running) = st.in_flight.get(&index) {
            tracing::debug!(index, "joining in-flight poster generation");
            return Lookup::Pending(running.clone());
        }

        tracing::debug!(index, "poster cache miss");
        let work = start();
        let state = self.state.clone();
        let epoch = st.epoch;
        let generation = async move {
            let result = work.await;
            let mut st = state.lock();
            if st.epoch != epoch {
                tracing::debug!(index, "poster cache cleared during generation; result not stored");
                return result.map_err(Arc::new);
            }
            st.in_flight.remove(&index);
            match result {
                Ok(artifact) => Ok(st.completed.entry(index).or_insert(artifact).clone()),
                Err(err) => Err(Arc::new(err)),
            }
        }
        .boxed()
        .shared();
        st.in_flight.insert(index, generation.clone());
        Lookup::Started(generation)
    }

    /// Drop every cached artifact and forget running generations.
    ///
    /// Generations already running still complete for their waiters but store nothing.
    pub fn clear(&self) {
        let mut st = self.state.lock();
        st.epoch += 1;
        st.completed.clear();
        st.in_flight.clear();
    }

    /// Number of cached artifacts.
    pub fn len(&self) -> usize {
        self.state.lock().completed.len()
    }

    /// Whether no artifact is cached.
    pub fn is_empty(&self) -> bool {
        self.state.lock().completed.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/poster/cache.rs"]
mod tests;
