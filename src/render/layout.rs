//! Fixed poster layout, parameterized by [`Tier`].
//!
//! Both tiers share one composition routine; the tier only selects geometry, type sizes and how
//! much detail is drawn.

use crate::{
    assets::decode::ImageHandle,
    foundation::{
        config::PosterConfig,
        core::{Rect, Rgba8, Tier},
        error::PosterResult,
    },
    render::{
        scene::{DrawOp, Scene},
        text::{TextMeasure, wrap_text},
    },
    roster::PersonRecord,
};

const INK: Rgba8 = Rgba8::opaque(0x22, 0x22, 0x22);
const MUTED: Rgba8 = Rgba8::opaque(0x66, 0x66, 0x66);
const QR_FALLBACK_FILL: Rgba8 = Rgba8::opaque(0xef, 0xef, 0xef);
const EMPTY_FIELD: &str = "—";

/// Edge length of the QR code on the high-resolution poster.
pub const QR_SIZE_PX: u32 = 280;

/// Geometry and type sizes of one tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierGeometry {
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Height of the accent band across the top.
    pub header_height: f64,
    /// Name size in the header.
    pub name_size: f32,
    /// Name left edge and baseline.
    pub name_origin: (f64, f64),
    /// Photo box.
    pub photo: Rect,
    /// Photo corner radius.
    pub photo_radius: f64,
    /// Fill of the photo box before the photo arrives.
    pub photo_placeholder: Rgba8,
}

impl TierGeometry {
    /// Geometry for `tier`.
    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Preview => Self {
                width: 600,
                height: 800,
                header_height: 110.0,
                name_size: 26.0,
                name_origin: (30.0, 76.0),
                photo: Rect::new(40.0, 150.0, 300.0, 410.0),
                photo_radius: 12.0,
                photo_placeholder: Rgba8::opaque(0xf0, 0xf0, 0xf0),
            },
            Tier::HighRes => Self {
                width: 1200,
                height: 1600,
                header_height: 140.0,
                name_size: 48.0,
                name_origin: (60.0, 96.0),
                photo: Rect::new(70.0, 200.0, 590.0, 720.0),
                photo_radius: 20.0,
                photo_placeholder: Rgba8::opaque(0xf5, 0xf5, 0xf5),
            },
        }
    }

    fn qr_box(&self) -> Rect {
        let s = f64::from(QR_SIZE_PX);
        let x = f64::from(self.width) - s - 80.0;
        let y = f64::from(self.height) - s - 80.0;
        Rect::new(x, y, x + s, y + s)
    }
}

/// Colours and fixed strings shared by both tiers.
#[derive(Clone, Debug, PartialEq)]
pub struct PosterStyle {
    /// Header band and heading colour.
    pub accent: Rgba8,
    /// Footer line of the high-resolution tier.
    pub footer_text: String,
}

impl PosterStyle {
    /// Style from `cfg`.
    pub fn from_config(cfg: &PosterConfig) -> PosterResult<Self> {
        Ok(Self {
            accent: cfg.accent()?,
            footer_text: cfg.footer_text.clone(),
        })
    }
}

impl Default for PosterStyle {
    fn default() -> Self {
        Self {
            accent: Rgba8::opaque(0x0b, 0x4f, 0x6c),
            footer_text: String::new(),
        }
    }
}

/// Source rectangle that crops an `img_w`×`img_h` image to the aspect ratio of the box.
///
/// A wider image loses equal margins left and right; otherwise equal margins top and bottom. The
/// result is centred and scales into the box without distortion or letterboxing.
pub fn cover_crop(img_w: f64, img_h: f64, box_w: f64, box_h: f64) -> Rect {
    if img_w <= 0.0 || img_h <= 0.0 || box_w <= 0.0 || box_h <= 0.0 {
        return Rect::new(0.0, 0.0, img_w.max(0.0), img_h.max(0.0));
    }
    let img_ratio = img_w / img_h;
    let box_ratio = box_w / box_h;
    if img_ratio > box_ratio {
        let sw = img_h * box_ratio;
        let sx = (img_w - sw) / 2.0;
        Rect::new(sx, 0.0, sx + sw, img_h)
    } else {
        let sh = img_w / box_ratio;
        let sy = (img_h - sh) / 2.0;
        Rect::new(0.0, sy, img_w, sy + sh)
    }
}

/// Cover-cropped photo op for the tier's photo box.
pub fn photo_op(tier: Tier, image: &ImageHandle) -> DrawOp {
    let geom = TierGeometry::for_tier(tier);
    let dst = geom.photo;
    DrawOp::Image {
        src: cover_crop(
            f64::from(image.width),
            f64::from(image.height),
            dst.width(),
            dst.height(),
        ),
        image: image.clone(),
        dst,
        radius: geom.photo_radius,
    }
}

/// QR code ops: the image, or a labelled box when the QR could not be loaded.
pub fn qr_ops(qr: &ImageHandle) -> Vec<DrawOp> {
    let qr_box = TierGeometry::for_tier(Tier::HighRes).qr_box();
    if qr.is_placeholder() {
        return vec![
            DrawOp::Fill {
                rect: qr_box,
                radius: 0.0,
                color: QR_FALLBACK_FILL,
            },
            text("QR unavailable", qr_box.x0 + 12.0, qr_box.y0 + 20.0, 16.0, MUTED),
        ];
    }
    vec![DrawOp::Image {
        image: qr.clone(),
        src: Rect::new(0.0, 0.0, f64::from(qr.width), f64::from(qr.height)),
        dst: qr_box,
        radius: 0.0,
    }]
}

fn text(s: impl Into<String>, x: f64, baseline: f64, size_px: f32, color: Rgba8) -> DrawOp {
    DrawOp::Text {
        text: s.into(),
        x,
        baseline,
        size_px,
        color,
    }
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() { EMPTY_FIELD } else { s }
}

/// Lay out everything except the photo and QR code.
///
/// The photo box holds a placeholder fill in the scene's photo slot, so the surface is never
/// empty while the photo loads.
pub fn compose(
    tier: Tier,
    style: &PosterStyle,
    person: &PersonRecord,
    measure: &mut dyn TextMeasure,
) -> Scene {
    let geom = TierGeometry::for_tier(tier);
    let mut scene = Scene::new(geom.width, geom.height, Rgba8::WHITE);
    let w = f64::from(geom.width);
    let h = f64::from(geom.height);

    scene.push(DrawOp::Fill {
        rect: Rect::new(0.0, 0.0, w, geom.header_height),
        radius: 0.0,
        color: style.accent,
    });
    scene.push(text(
        person.name.clone(),
        geom.name_origin.0,
        geom.name_origin.1,
        geom.name_size,
        Rgba8::WHITE,
    ));

    let photo = geom.photo;
    if tier == Tier::HighRes {
        scene.push(DrawOp::Fill {
            rect: photo.inflate(8.0, 8.0),
            radius: 0.0,
            color: geom.photo_placeholder,
        });
    }
    scene.push_photo_slot(DrawOp::Fill {
        rect: photo,
        radius: geom.photo_radius,
        color: geom.photo_placeholder,
    });

    match tier {
        Tier::Preview => {
            let x = photo.x1 + 20.0;
            let first_topic = person
                .research
                .split([';', '\n'])
                .next()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(EMPTY_FIELD);
            scene.push(text(
                format!("Research: {first_topic}"),
                x,
                photo.y0 + 10.0,
                14.0,
                INK,
            ));
            scene.push(text(
                format!("Email: {}", or_dash(&person.email)),
                x,
                photo.y0 + 40.0,
                14.0,
                INK,
            ));
        }
        Tier::HighRes => {
            let x = photo.x1 + 60.0;
            let column = (w - x - 80.0) as f32;
            let mut y = photo.y0;

            scene.push(text("Research", x, y + 6.0, 26.0, style.accent));
            y += 34.0;
            push_block(
                &mut scene,
                measure,
                or_dash(&person.research),
                x,
                y,
                20.0,
                28.0,
                column,
                140.0,
            );
            y += 140.0;

            scene.push(text("Selected Papers", x, y, 24.0, style.accent));
            y += 36.0;
            push_block(
                &mut scene,
                measure,
                or_dash(&person.papers),
                x,
                y,
                18.0,
                24.0,
                column,
                200.0,
            );
            y += 200.0;

            scene.push(text("Contact", x, y, 22.0, style.accent));
            y += 36.0;
            for (label, value) in [
                ("Email", &person.email),
                ("Phone", &person.phone),
                ("Office", &person.office),
            ] {
                scene.push(text(format!("{label}: {}", or_dash(value)), x, y, 18.0, INK));
                y += 28.0;
            }

            if !style.footer_text.is_empty() {
                scene.push(text(style.footer_text.clone(), 80.0, h - 40.0, 16.0, MUTED));
            }
        }
    }

    scene
}

/// Wrapped paragraph lines, cut off where the block's height runs out.
#[allow(clippy::too_many_arguments)]
fn push_block(
    scene: &mut Scene,
    measure: &mut dyn TextMeasure,
    body: &str,
    x: f64,
    first_baseline: f64,
    size_px: f32,
    line_height: f64,
    column: f32,
    block_height: f64,
) {
    let max_lines = ((block_height / line_height).floor() as usize).max(1);
    for (i, line) in wrap_text(measure, body, size_px, column)
        .into_iter()
        .take(max_lines)
        .enumerate()
    {
        scene.push(text(line, x, first_baseline + line_height * i as f64, size_px, INK));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
