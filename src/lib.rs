//! Staff directory poster pipeline.
//!
//! Posters are drawn in two tiers. Opening a poster puts a low-resolution preview on the view
//! surface immediately; a high-resolution poster is generated in the background, cached per roster
//! index, and swapped in only if the view still shows that person. Images (photos, QR codes) come
//! through a memoizing loader that fetches each URL once and never fails.
//!
//! - Load a [`Roster`] and a [`PosterConfig`]
//! - Build an [`AssetLoader`], a [`Compositor`] and an [`Orchestrator`]
//! - Drive it through a [`ViewController`]: `open`, `close`, `download`
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod poster;
pub(crate) mod render;
pub(crate) mod roster;

pub use crate::assets::decode::{ImageHandle, decode_image};
pub use crate::assets::fetch::{DefaultFetcher, ImageFetcher, normalize_rel_path};
pub use crate::assets::loader::AssetLoader;
pub use crate::foundation::config::{DEFAULT_PLACEHOLDER_URL, PosterConfig};
pub use crate::foundation::core::{Rect, Rgba8, Tier};
pub use crate::foundation::error::{PosterError, PosterResult};

pub use crate::poster::cache::{Generation, GenerationResult, Lookup, PosterCache};
pub use crate::poster::notice::{LogNotifier, Notice, Notifier};
pub use crate::poster::orchestrator::{OpenHandle, Orchestrator, ViewState, ViewTicket};
pub use crate::poster::sink::{ArtifactSink, DirSink};
pub use crate::poster::surface::{PosterSurface, SurfaceContent, SurfaceDraw};
pub use crate::poster::view::ViewController;
pub use crate::render::compositor::{Compositor, PosterArtifact};
pub use crate::render::cpu::{FrameRgba, encode_png, rasterize};
pub use crate::render::layout::{
    PosterStyle, QR_SIZE_PX, TierGeometry, compose, cover_crop, photo_op, qr_ops,
};
pub use crate::render::scene::{DrawOp, Scene};
pub use crate::render::text::{TextEngine, TextMeasure, wrap_text};
pub use crate::roster::{PersonRecord, Roster};
