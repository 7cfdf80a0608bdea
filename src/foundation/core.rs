use crate::foundation::error::{PosterError, PosterResult};

pub use kurbo::Rect;

/// Resolution tier of a poster render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Tier {
    /// Fast, low-resolution, drawn immediately.
    Preview,
    /// Final, cacheable, exportable; includes the QR code.
    HighRes,
}

/// Straight (non-premultiplied) RGBA8 colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(0xff, 0xff, 0xff);

    /// Fully opaque colour from RGB channels.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> PosterResult<Self> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| PosterError::validation(format!("colour '{s}' must start with '#'")))?;
        let nibble = |c: u8| -> PosterResult<u8> {
            match c {
                b'0'..=b'9' => Ok(c - b'0'),
                b'a'..=b'f' => Ok(c - b'a' + 10),
                b'A'..=b'F' => Ok(c - b'A' + 10),
                _ => Err(PosterError::validation(format!("invalid hex digit in '{s}'"))),
            }
        };
        let b = hex.as_bytes();
        match b.len() {
            3 => {
                let (r, g, bl) = (nibble(b[0])?, nibble(b[1])?, nibble(b[2])?);
                Ok(Self::opaque(r * 17, g * 17, bl * 17))
            }
            6 | 8 => {
                let byte =
                    |i: usize| -> PosterResult<u8> { Ok((nibble(b[i])? << 4) | nibble(b[i + 1])?) };
                let a = if b.len() == 8 { byte(6)? } else { 0xff };
                Ok(Self {
                    r: byte(0)?,
                    g: byte(2)?,
                    b: byte(4)?,
                    a,
                })
            }
            _ => Err(PosterError::validation(format!(
                "colour '{s}' must have 3, 6 or 8 hex digits"
            ))),
        }
    }

    /// Premultiplied RGBA8 bytes.
    pub fn premul_bytes(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }
        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
