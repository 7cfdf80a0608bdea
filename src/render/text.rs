use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::{
    config::PosterConfig,
    core::Rgba8,
    error::{PosterError, PosterResult},
};

/// Average advance, as a fraction of the font size, assumed when no font is loaded.
const FALLBACK_ADVANCE_EM: f32 = 0.55;

/// Common locations of a sans-serif system font, probed when no font is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Horizontal text measurement used by line wrapping.
pub trait TextMeasure {
    /// Advance width of `text` set at `size_px`.
    fn measure(&mut self, text: &str, size_px: f32) -> f32;
}

pub(crate) struct LoadedFont {
    pub(crate) family: String,
    pub(crate) data: vello_cpu::peniko::FontData,
}

/// Shapes and measures text with Parley.
///
/// Without a font the engine still measures (with a fixed per-character advance) but produces no
/// glyphs, so posters render with their layout intact and text omitted.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    font: Option<LoadedFont>,
}

impl std::fmt::Debug for TextEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEngine")
            .field("family", &self.font.as_ref().map(|f| f.family.as_str()))
            .finish()
    }
}

impl TextEngine {
    /// Engine without a font: fixed-advance metrics, no glyph output.
    pub fn without_font() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            font: None,
        }
    }

    /// Engine drawing with the font in `font_bytes`.
    pub fn with_font_bytes(font_bytes: Vec<u8>) -> PosterResult<Self> {
        let mut engine = Self::without_font();
        let families = engine
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            PosterError::validation("no font families registered from font bytes")
        })?;
        let family = engine
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PosterError::validation("registered font family has no name"))?
            .to_string();

        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        engine.font = Some(LoadedFont { family, data });
        Ok(engine)
    }

    /// Engine using a font file.
    pub fn from_font_file(path: &Path) -> PosterResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::with_font_bytes(bytes)
    }

    /// Engine for `cfg`: the configured font, else the first usable system font, else none.
    pub fn from_config(cfg: &PosterConfig) -> Self {
        let candidates: Vec<PathBuf> = match &cfg.font_path {
            Some(p) => vec![p.clone()],
            None => SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
        };
        for path in candidates {
            if cfg.font_path.is_none() && !path.is_file() {
                continue;
            }
            match Self::from_font_file(&path) {
                Ok(engine) => {
                    tracing::debug!(font = %path.display(), "loaded poster font");
                    return engine;
                }
                Err(err) => tracing::warn!(font = %path.display(), error = %err, "font unusable"),
            }
        }
        tracing::warn!("no font available; poster text will be omitted");
        Self::without_font()
    }

    /// Whether a font is loaded and text will be drawn.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub(crate) fn font(&self) -> Option<&LoadedFont> {
        self.font.as_ref()
    }

    /// Shape `text` on a single unbounded line. `None` without a font.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: Rgba8,
    ) -> Option<parley::Layout<Rgba8>> {
        let family = self.font.as_ref()?.family.clone();
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Some(layout)
    }
}

impl TextMeasure for TextEngine {
    fn measure(&mut self, text: &str, size_px: f32) -> f32 {
        match self.layout_line(text, size_px, Rgba8::default()) {
            Some(layout) => layout.width(),
            None => text.chars().count() as f32 * size_px * FALLBACK_ADVANCE_EM,
        }
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// `;` and newlines separate paragraphs; blank paragraphs are dropped. A paragraph wider than the
/// column is split at the longest prefix that fits (found by binary search over character
/// boundaries), and the remainder is wrapped the same way. Every line fits except a line holding a
/// single character that overflows on its own.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    size_px: f32,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split([';', '\n']).map(str::trim).filter(|p| !p.is_empty()) {
        let mut rest = paragraph;
        while !rest.is_empty() && measure.measure(rest, size_px) > max_width {
            // ends[k - 1] is the byte length of the k-character prefix.
            let ends: Vec<usize> = rest
                .char_indices()
                .skip(1)
                .map(|(i, _)| i)
                .chain(std::iter::once(rest.len()))
                .collect();

            let (mut fits, mut overflows) = (0usize, ends.len());
            while overflows - fits > 1 {
                let mid = (fits + overflows) / 2;
                if measure.measure(&rest[..ends[mid - 1]], size_px) <= max_width {
                    fits = mid;
                } else {
                    overflows = mid;
                }
            }

            let cut = ends[fits.max(1) - 1];
            lines.push(rest[..cut].trim_end().to_string());
            rest = rest[cut..].trim_start();
        }
        if !rest.is_empty() {
            lines.push(rest.to_string());
        }
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
