use std::{future::Future, sync::Arc};

use parking_lot::Mutex;

use crate::{
    assets::{decode::ImageHandle, loader::AssetLoader},
    foundation::{
        config::PosterConfig,
        core::Tier,
        error::{PosterError, PosterResult},
    },
    poster::surface::PosterSurface,
    render::{
        cpu,
        layout::{self, PosterStyle, QR_SIZE_PX},
        scene::Scene,
        text::TextEngine,
    },
    roster::PersonRecord,
};

/// Encoded high-resolution poster (PNG). Immutable; clones share the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PosterArtifact {
    png: Arc<Vec<u8>>,
}

impl PosterArtifact {
    /// Wrap encoded PNG bytes.
    pub fn from_png(png: Vec<u8>) -> Self {
        Self { png: Arc::new(png) }
    }

    /// Encoded PNG bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.png
    }

    /// Whether both artifacts share one buffer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.png, &other.png)
    }
}

/// Draws posters for both tiers from one layout.
pub struct Compositor {
    loader: Arc<AssetLoader>,
    text: Arc<Mutex<TextEngine>>,
    style: PosterStyle,
    qr_endpoint: String,
    profile_base_url: String,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("style", &self.style)
            .field("qr_endpoint", &self.qr_endpoint)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Compositor fetching images through `loader` and setting text with `text`.
    pub fn new(
        loader: Arc<AssetLoader>,
        text: TextEngine,
        cfg: &PosterConfig,
    ) -> PosterResult<Self> {
        Ok(Self {
            loader,
            text: Arc::new(Mutex::new(text)),
            style: PosterStyle::from_config(cfg)?,
            qr_endpoint: cfg.qr_endpoint.clone(),
            profile_base_url: cfg.profile_base_url.clone(),
        })
    }

    /// Loader used for photos and QR codes.
    pub fn loader(&self) -> &Arc<AssetLoader> {
        &self.loader
    }

    /// QR endpoint URL whose image encodes the person's profile URL.
    pub fn qr_url(&self, person: &PersonRecord, index: usize) -> PosterResult<String> {
        let payload = person.profile_ref(&self.profile_base_url, index);
        let size = format!("{QR_SIZE_PX}x{QR_SIZE_PX}");
        let url = reqwest::Url::parse_with_params(
            &self.qr_endpoint,
            &[
                ("cht", "qr"),
                ("chs", size.as_str()),
                ("chl", payload.as_str()),
                ("chld", "L|2"),
            ],
        )
        .map_err(|e| PosterError::validation(format!("invalid qr endpoint: {e}")))?;
        Ok(url.to_string())
    }

    /// Preview layout with an empty photo box.
    pub fn preview_scene(&self, person: &PersonRecord) -> Scene {
        let mut text = self.text.lock();
        layout::compose(Tier::Preview, &self.style, person, &mut *text)
    }

    /// Draw the preview onto `surface` now and return the photo upgrade.
    ///
    /// The layout, including a placeholder photo box, is on the surface before this returns. The
    /// returned future awaits the photo and draws it into the box; the surface ignores the photo
    /// if it has been redrawn or hidden in the meantime.
    pub fn render_preview(
        &self,
        person: &PersonRecord,
        surface: &PosterSurface,
    ) -> impl Future<Output = ()> + Send + 'static + use<> {
        let epoch = surface.draw_preview(self.preview_scene(person));
        let photo = self.loader.fetch_image(&person.photo_ref());
        let surface = surface.clone();
        async move {
            let image = photo.await;
            if !surface.draw_preview_photo(epoch, layout::photo_op(Tier::Preview, &image)) {
                tracing::debug!(epoch, "preview photo arrived for a replaced surface");
            }
        }
    }

    /// Render the full poster offscreen and encode it.
    ///
    /// Photo and QR failures degrade to placeholders; only layout, raster or encode failures
    /// fail the call. Rasterization and encoding run on the blocking pool.
    #[tracing::instrument(skip(self, person), fields(name = %person.name))]
    pub async fn render_high_res(
        &self,
        person: &PersonRecord,
        index: usize,
    ) -> PosterResult<PosterArtifact> {
        let qr_url = self.qr_url(person, index)?;
        let photo = self.loader.fetch_image(&person.photo_ref());
        let qr = self.loader.fetch_image(&qr_url);
        let (photo, qr) = futures::join!(photo, qr);

        let text = self.text.clone();
        let style = self.style.clone();
        let person = person.clone();
        let png = tokio::task::spawn_blocking(move || {
            draw_high_res(&text, &style, &person, &photo, &qr)
        })
        .await
        .map_err(|e| PosterError::render(format!("poster render task failed: {e}")))??;

        tracing::info!(bytes = png.len(), "high-resolution poster rendered");
        Ok(PosterArtifact::from_png(png))
    }

    /// Rasterize any scene with this compositor's fonts.
    pub fn rasterize_png(&self, scene: &Scene) -> PosterResult<Vec<u8>> {
        let frame = cpu::rasterize(scene, &mut self.text.lock())?;
        cpu::encode_png(&frame)
    }
}

fn draw_high_res(
    text: &Mutex<TextEngine>,
    style: &PosterStyle,
    person: &PersonRecord,
    photo: &ImageHandle,
    qr: &ImageHandle,
) -> PosterResult<Vec<u8>> {
    let mut text = text.lock();
    let mut scene = layout::compose(Tier::HighRes, style, person, &mut *text);
    scene.replace_photo(layout::photo_op(Tier::HighRes, photo));
    for op in layout::qr_ops(qr) {
        scene.push(op);
    }
    let frame = cpu::rasterize(&scene, &mut text)?;
    cpu::encode_png(&frame)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
