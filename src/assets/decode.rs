use std::sync::Arc;

use anyhow::Context;

use crate::foundation::{core::Rgba8, error::PosterResult};

/// Decoded, ready-to-draw bitmap.
///
/// Clones share the same pixel buffer; [`ImageHandle::ptr_eq`] tells whether two handles came
/// from the same decode.
#[derive(Clone, Debug)]
pub struct ImageHandle {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
    placeholder: bool,
}

impl ImageHandle {
    /// Whether this handle stands in for an image that could not be loaded.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Whether both handles share one pixel buffer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rgba8_premul, &other.rgba8_premul)
    }

    /// Wrap premultiplied RGBA8 pixels. Returns `None` if the length does not match the size.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Option<Self> {
        if rgba8_premul.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
            placeholder: false,
        })
    }

    pub(crate) fn into_placeholder(mut self) -> Self {
        self.placeholder = true;
        self
    }

    /// Built-in solid placeholder, used when even the placeholder URL cannot be loaded.
    pub fn solid(width: u32, height: u32, color: Rgba8) -> Self {
        let px = color.premul_bytes();
        let mut bytes = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            bytes.extend_from_slice(&px);
        }
        Self {
            width,
            height,
            rgba8_premul: Arc::new(bytes),
            placeholder: true,
        }
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> PosterResult<ImageHandle> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(ImageHandle {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
        placeholder: false,
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
