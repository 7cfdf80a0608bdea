use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    assets::decode::{ImageHandle, decode_image},
    foundation::error::PosterResult,
    render::{compositor::PosterArtifact, scene::DrawOp, scene::Scene},
};

/// What the visible poster surface currently shows.
#[derive(Clone, Debug, Default)]
pub enum SurfaceContent {
    /// Nothing drawn since the surface was created or hidden.
    #[default]
    Blank,
    /// Preview display list, possibly still waiting for its photo.
    Preview(Scene),
    /// Decoded high-resolution poster.
    Artifact {
        /// Encoded poster.
        artifact: PosterArtifact,
        /// Decoded pixels scaled to fit by the host.
        image: ImageHandle,
    },
}

/// One draw accepted by the surface, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceDraw {
    /// Preview layout with a placeholder photo box.
    PreviewLayout,
    /// Photo drawn into the preview.
    PreviewPhoto,
    /// High-resolution poster replaced the preview.
    Artifact,
}

#[derive(Debug, Default)]
struct SurfaceState {
    visible: bool,
    epoch: u64,
    content: SurfaceContent,
    log: Vec<SurfaceDraw>,
}

/// Shared handle to the poster surface of the view.
///
/// The surface carries an epoch that advances on every preview draw and every hide. Deferred
/// preview work holds the epoch it was started with and is dropped once that epoch has passed.
#[derive(Clone, Debug, Default)]
pub struct PosterSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl PosterSurface {
    /// Make the surface visible.
    pub fn show(&self) {
        self.state.lock().visible = true;
    }

    /// Hide and clear the surface.
    pub fn hide(&self) {
        let mut st = self.state.lock();
        st.visible = false;
        st.epoch += 1;
        st.content = SurfaceContent::Blank;
    }

    /// Whether the surface is shown.
    pub fn is_visible(&self) -> bool {
        self.state.lock().visible
    }

    /// Current epoch.
    pub fn epoch(&self) -> u64 {
        self.state.lock().epoch
    }

    /// Replace the content with a preview; returns the epoch the preview belongs to.
    pub fn draw_preview(&self, scene: Scene) -> u64 {
        let mut st = self.state.lock();
        st.epoch += 1;
        st.content = SurfaceContent::Preview(scene);
        st.log.push(SurfaceDraw::PreviewLayout);
        st.epoch
    }

    /// Put the photo into the preview started at `epoch`.
    ///
    /// Returns `false` and leaves the surface untouched when the preview has since been replaced,
    /// upgraded or hidden.
    pub fn draw_preview_photo(&self, epoch: u64, photo: DrawOp) -> bool {
        let mut st = self.state.lock();
        if st.epoch != epoch {
            return false;
        }
        let SurfaceContent::Preview(scene) = &mut st.content else {
            return false;
        };
        if !scene.replace_photo(photo) {
            return false;
        }
        st.log.push(SurfaceDraw::PreviewPhoto);
        true
    }

    /// Replace the content with a high-resolution poster.
    pub fn draw_artifact(&self, artifact: &PosterArtifact) -> PosterResult<()> {
        let image = decode_image(artifact.as_bytes())?;
        let mut st = self.state.lock();
        st.epoch += 1;
        st.content = SurfaceContent::Artifact {
            artifact: artifact.clone(),
            image,
        };
        st.log.push(SurfaceDraw::Artifact);
        Ok(())
    }

    /// Snapshot of the current content.
    pub fn content(&self) -> SurfaceContent {
        self.state.lock().content.clone()
    }

    /// Every accepted draw since creation.
    pub fn draw_log(&self) -> Vec<SurfaceDraw> {
        self.state.lock().log.clone()
    }

    /// Number of accepted draws.
    pub fn draw_count(&self) -> usize {
        self.state.lock().log.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/poster/surface.rs"]
mod tests;
