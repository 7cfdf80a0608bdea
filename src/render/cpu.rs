use std::io::Cursor;

use anyhow::Context;

use crate::{
    assets::decode::{ImageHandle, unpremultiply_rgba8_in_place},
    foundation::{
        core::{Rect, Rgba8},
        error::{PosterError, PosterResult},
    },
    render::{
        scene::{DrawOp, Scene},
        text::TextEngine,
    },
};

/// Rasterized poster pixels.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8.
    pub data: Vec<u8>,
}

/// Rasterize `scene` on the CPU.
pub fn rasterize(scene: &Scene, text: &mut TextEngine) -> PosterResult<FrameRgba> {
    let width: u16 = scene
        .width
        .try_into()
        .map_err(|_| PosterError::render("surface width exceeds u16"))?;
    let height: u16 = scene
        .height
        .try_into()
        .map_err(|_| PosterError::render("surface height exceeds u16"))?;
    if width == 0 || height == 0 {
        return Err(PosterError::render("surface must be at least 1x1"));
    }

    let mut pixmap = vello_cpu::Pixmap::new(width, height);
    let mut ctx = vello_cpu::RenderContext::new(width, height);

    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(scene.background));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(width),
        f64::from(height),
    ));

    for op in &scene.ops {
        draw_op(&mut ctx, op, text)?;
    }
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    Ok(FrameRgba {
        width: scene.width,
        height: scene.height,
        data: pixmap.data_as_u8_slice().to_vec(),
    })
}

/// Encode a frame as PNG (straight alpha).
pub fn encode_png(frame: &FrameRgba) -> PosterResult<Vec<u8>> {
    let mut straight = frame.data.clone();
    unpremultiply_rgba8_in_place(&mut straight);
    let img = image::RgbaImage::from_raw(frame.width, frame.height, straight)
        .ok_or_else(|| PosterError::render("frame byte length does not match its size"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode poster png")?;
    Ok(buf)
}

fn draw_op(
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
    text: &mut TextEngine,
) -> PosterResult<()> {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match op {
        DrawOp::Fill {
            rect,
            radius,
            color,
        } => {
            ctx.set_paint(color_to_cpu(*color));
            if *radius > 0.0 {
                ctx.fill_path(&rounded_rect_path(*rect, *radius));
            } else {
                ctx.fill_rect(&rect_to_cpu(*rect));
            }
            Ok(())
        }
        DrawOp::Image {
            image,
            src,
            dst,
            radius,
        } => {
            if src.width() <= 0.0 || src.height() <= 0.0 {
                return Ok(());
            }
            let paint = image_paint(image)?;

            if *radius > 0.0 {
                ctx.push_clip_layer(&rounded_rect_path(*dst, *radius));
            }
            let to_dst = vello_cpu::kurbo::Affine::translate((dst.x0, dst.y0))
                * vello_cpu::kurbo::Affine::scale_non_uniform(
                    dst.width() / src.width(),
                    dst.height() / src.height(),
                )
                * vello_cpu::kurbo::Affine::translate((-src.x0, -src.y0));
            ctx.set_transform(to_dst);
            ctx.set_paint(paint);
            ctx.fill_rect(&rect_to_cpu(*src));
            if *radius > 0.0 {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.pop_layer();
            }
            Ok(())
        }
        DrawOp::Text {
            text: s,
            x,
            baseline,
            size_px,
            color,
        } => {
            let Some(layout) = text.layout_line(s, *size_px, *color) else {
                return Ok(());
            };
            let Some(font) = text.font() else {
                return Ok(());
            };
            let first_baseline = layout
                .lines()
                .next()
                .map(|line| f64::from(line.metrics().baseline))
                .unwrap_or(0.0);
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                *x,
                *baseline - first_baseline,
            )));

            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };

                    let brush = run.style().brush;
                    ctx.set_paint(color_to_cpu(brush));

                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font.data)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
            Ok(())
        }
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn rounded_rect_path(r: Rect, radius: f64) -> vello_cpu::kurbo::BezPath {
    use vello_cpu::kurbo::Shape;

    vello_cpu::kurbo::RoundedRect::from_rect(rect_to_cpu(r), radius).to_path(0.1)
}

fn image_paint(image: &ImageHandle) -> PosterResult<vello_cpu::Image> {
    let pixmap =
        image_premul_bytes_to_pixmap(image.rgba8_premul.as_slice(), image.width, image.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> PosterResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PosterError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PosterError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(PosterError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
