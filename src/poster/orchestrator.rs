//! Per-index coordination of preview, cache, background generation and the visible view.
//!
//! Opening a poster draws the preview synchronously. A background task then waits for the preview
//! photo, serves the high-resolution poster from the cache or starts (or joins) its generation,
//! and puts the result on the surface only if the view still shows the same open. Every open and
//! close advances a view generation counter; a [`ViewTicket`] taken at open time is compared with
//! it before any deferred draw.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::{
    foundation::{
        config::PosterConfig,
        error::{PosterError, PosterResult},
    },
    poster::{
        cache::{Generation, Lookup, PosterCache},
        notice::{Notice, Notifier},
        surface::PosterSurface,
    },
    render::compositor::{Compositor, PosterArtifact},
    roster::{PersonRecord, Roster},
};

/// Which poster the view shows, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Open roster index.
    pub current: Option<usize>,
    /// Advances on every open and close.
    pub generation: u64,
}

/// Identity of one open, used to discard results that arrive after the view moved on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewTicket {
    /// Roster index that was opened.
    pub index: usize,
    /// View generation at open time.
    pub generation: u64,
}

/// Background work started by [`Orchestrator::open_poster`].
///
/// Dropping the handle does not cancel anything.
#[derive(Debug)]
pub struct OpenHandle {
    ticket: ViewTicket,
    task: JoinHandle<()>,
}

impl OpenHandle {
    /// Ticket of this open.
    pub fn ticket(&self) -> ViewTicket {
        self.ticket
    }

    /// Wait until the preview photo and the high-resolution stage are settled.
    pub async fn settled(self) {
        if let Err(err) = self.task.await {
            tracing::warn!(index = self.ticket.index, error = %err, "poster task aborted");
        }
    }
}

struct Inner {
    compositor: Arc<Compositor>,
    roster: Mutex<Arc<Roster>>,
    cache: PosterCache,
    view: Mutex<ViewState>,
    surface: PosterSurface,
    notifier: Arc<dyn Notifier>,
    render_timeout: Duration,
}

/// Coordinates one poster view. Clones share state.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("view", &*self.inner.view.lock())
            .field("cache", &self.inner.cache)
            .field("render_timeout", &self.inner.render_timeout)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Orchestrator drawing onto `surface`.
    pub fn new(
        compositor: Arc<Compositor>,
        roster: Roster,
        surface: PosterSurface,
        notifier: Arc<dyn Notifier>,
        render_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                compositor,
                roster: Mutex::new(Arc::new(roster)),
                cache: PosterCache::default(),
                view: Mutex::new(ViewState::default()),
                surface,
                notifier,
                render_timeout,
            }),
        }
    }

    /// Orchestrator using the render timeout from `cfg`.
    pub fn from_config(
        compositor: Arc<Compositor>,
        roster: Roster,
        surface: PosterSurface,
        notifier: Arc<dyn Notifier>,
        cfg: &PosterConfig,
    ) -> Self {
        Self::new(compositor, roster, surface, notifier, cfg.render_timeout())
    }

    /// Visible surface.
    pub fn surface(&self) -> &PosterSurface {
        &self.inner.surface
    }

    /// High-resolution poster cache.
    pub fn cache(&self) -> &PosterCache {
        &self.inner.cache
    }

    /// Notice channel.
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    /// Current roster snapshot.
    pub fn roster(&self) -> Arc<Roster> {
        self.inner.roster.lock().clone()
    }

    /// Record at `index` in the current roster.
    pub fn person(&self, index: usize) -> PosterResult<PersonRecord> {
        self.roster().get(index).cloned()
    }

    /// Swap the roster. Cached posters are kept; see [`Orchestrator::clear_posters`].
    pub fn replace_roster(&self, roster: Roster) {
        tracing::info!(people = roster.len(), "roster replaced");
        *self.inner.roster.lock() = Arc::new(roster);
    }

    /// Drop every cached poster.
    pub fn clear_posters(&self) {
        tracing::info!("poster cache cleared");
        self.inner.cache.clear();
    }

    /// Current view state.
    pub fn view_state(&self) -> ViewState {
        *self.inner.view.lock()
    }

    /// Open roster index.
    pub fn current_index(&self) -> Option<usize> {
        self.inner.view.lock().current
    }

    /// Whether `ticket` is still the open view.
    pub fn is_current(&self, ticket: ViewTicket) -> bool {
        let view = self.inner.view.lock();
        view.current == Some(ticket.index) && view.generation == ticket.generation
    }

    /// Open the poster for `index`.
    ///
    /// Before returning, the view is shown and the preview layout is on the surface. Everything
    /// else happens in a spawned task; must be called within a tokio runtime. An unknown index
    /// fails without touching the view.
    #[tracing::instrument(skip(self))]
    pub fn open_poster(&self, index: usize) -> PosterResult<OpenHandle> {
        let person = self.person(index)?;
        let ticket = self.begin_view(index);

        let preview = self
            .inner
            .compositor
            .render_preview(&person, &self.inner.surface);

        let this = self.clone();
        let task = tokio::spawn(async move {
            preview.await;
            match this.lookup(index, person) {
                Lookup::Ready(artifact) => this.present(ticket, &artifact),
                Lookup::Pending(generation) | Lookup::Started(generation) => {
                    match generation.await {
                        Ok(artifact) => this.present(ticket, &artifact),
                        Err(err) => this.inner.notifier.notify(Notice::GenerationFailed {
                            index,
                            message: err.to_string(),
                        }),
                    }
                }
            }
        });

        Ok(OpenHandle { ticket, task })
    }

    /// Close the view. Running generations continue; their results are cached but not drawn.
    pub fn close(&self) {
        let mut view = self.inner.view.lock();
        view.current = None;
        view.generation += 1;
        self.inner.surface.hide();
    }

    /// Cached poster for `index`, or the generation producing it.
    ///
    /// Joins a running generation instead of starting a second one.
    pub fn ensure_generation(&self, index: usize) -> PosterResult<Lookup> {
        let person = self.person(index)?;
        Ok(self.lookup(index, person))
    }

    fn begin_view(&self, index: usize) -> ViewTicket {
        let mut view = self.inner.view.lock();
        view.current = Some(index);
        view.generation += 1;
        self.inner.surface.show();
        ViewTicket {
            index,
            generation: view.generation,
        }
    }

    fn lookup(&self, index: usize, person: PersonRecord) -> Lookup {
        let compositor = self.inner.compositor.clone();
        let limit = self.inner.render_timeout;
        let lookup = self.inner.cache.get_or_start(index, move || async move {
            match tokio::time::timeout(limit, compositor.render_high_res(&person, index)).await {
                Ok(result) => result,
                Err(_) => Err(PosterError::Timeout(limit.as_millis() as u64)),
            }
        });
        if let Lookup::Started(generation) = &lookup {
            spawn_driver(index, generation.clone());
        }
        lookup
    }

    fn present(&self, ticket: ViewTicket, artifact: &PosterArtifact) {
        let view = self.inner.view.lock();
        if view.current != Some(ticket.index) || view.generation != ticket.generation {
            tracing::debug!(index = ticket.index, "discarding poster for a view that moved on");
            return;
        }
        if let Err(err) = self.inner.surface.draw_artifact(artifact) {
            tracing::warn!(index = ticket.index, error = %err, "cached poster could not be drawn");
        }
    }
}

/// Run a generation to completion whether or not anyone awaits it.
fn spawn_driver(index: usize, generation: Generation) {
    tokio::spawn(async move {
        if let Err(err) = generation.await {
            tracing::warn!(index, error = %err, "high-resolution generation failed");
        }
    });
}

#[cfg(test)]
#[path = "../../tests/unit/poster/orchestrator.rs"]
mod tests;
