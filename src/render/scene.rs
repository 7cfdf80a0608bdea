use crate::{
    assets::decode::ImageHandle,
    foundation::core::{Rect, Rgba8},
};

/// One drawing command in a poster display list.
#[derive(Clone, Debug)]
pub enum DrawOp {
    /// Solid rectangle, rounded when `radius > 0`.
    Fill {
        /// Target rectangle.
        rect: Rect,
        /// Corner radius.
        radius: f64,
        /// Fill colour.
        color: Rgba8,
    },
    /// Single line of text; `baseline` is the y of the first baseline.
    Text {
        /// Text content.
        text: String,
        /// Left edge.
        x: f64,
        /// Baseline y.
        baseline: f64,
        /// Font size.
        size_px: f32,
        /// Text colour.
        color: Rgba8,
    },
    /// The `src` region of `image` scaled into `dst`, clipped to a rounded rectangle.
    Image {
        /// Bitmap to sample.
        image: ImageHandle,
        /// Source region in image pixels.
        src: Rect,
        /// Destination rectangle.
        dst: Rect,
        /// Corner radius of the clip.
        radius: f64,
    },
}

/// Display list for one poster surface.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Colour under every op.
    pub background: Rgba8,
    /// Ops in paint order.
    pub ops: Vec<DrawOp>,
    photo_slot: Option<usize>,
}

impl Scene {
    /// Empty scene of the given size.
    pub fn new(width: u32, height: u32, background: Rgba8) -> Self {
        Self {
            width,
            height,
            background,
            ops: Vec::new(),
            photo_slot: None,
        }
    }

    /// Append `op`.
    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Append the placeholder op that the subject photo later replaces in place.
    pub fn push_photo_slot(&mut self, op: DrawOp) {
        self.photo_slot = Some(self.ops.len());
        self.ops.push(op);
    }

    /// Current op in the photo slot.
    pub fn photo(&self) -> Option<&DrawOp> {
        self.photo_slot.and_then(|i| self.ops.get(i))
    }

    /// Overwrite the photo slot. Returns `false` when the scene has none.
    pub fn replace_photo(&mut self, op: DrawOp) -> bool {
        match self.photo_slot.and_then(|i| self.ops.get_mut(i)) {
            Some(slot) => {
                *slot = op;
                true
            }
            None => false,
        }
    }

    /// Text runs in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}
