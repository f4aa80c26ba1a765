use serde::{Deserialize, Serialize};

/// Identifier for an element of a [`crate::grid::Grid`].
///
/// This is an index into the grid's buffers, and is only meaningful within
/// the lifetime of a given initialized driver.
pub type ElementId = usize;

/// Linear RGBA color handed to the render sink.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Converts to 8-bit channels, clamping each to `[0, 1]` first.
    pub fn to_srgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_srgba_u8_clamps_channels() {
        assert_eq!(Rgba::WHITE.to_srgba_u8(), [255, 255, 255, 255]);
        assert_eq!(Rgba::GREEN.to_srgba_u8(), [0, 255, 0, 255]);
        assert_eq!(Rgba::new(2.0, -1.0, 0.5, 1.0).to_srgba_u8(), [255, 0, 128, 255]);
    }
}
