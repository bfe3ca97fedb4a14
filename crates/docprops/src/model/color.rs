//! RGBA colour value.

/// An RGBA colour with float channels in `[0, 1]`.
///
/// The packed form stores one byte per channel as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque colour.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Creates a colour with the same value in the three colour channels.
    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v, 1.0)
    }

    /// Unpacks a `0xRRGGBBAA` value.
    pub fn from_packed(packed: u32) -> Self {
        let channel = |shift: u32| ((packed >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(24), channel(16), channel(8), channel(0))
    }

    /// Packs into `0xRRGGBBAA`, rounding each channel to the nearest byte.
    pub fn packed(&self) -> u32 {
        (to_byte(self.r) << 24) | (to_byte(self.g) << 16) | (to_byte(self.b) << 8) | to_byte(self.a)
    }

    pub fn set_packed(&mut self, packed: u32) {
        *self = Self::from_packed(packed);
    }

    /// Builds a colour from integer channels in `0..=255`.
    pub fn from_bytes(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }
}

fn to_byte(channel: f32) -> u32 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_packed_layout() {
        let c = Color::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(c.packed(), 0xff00_00ff);

        let c = Color::from_packed(0x00ff_0080);
        assert_eq!(c.r, 0.0);
        assert_eq!(c.g, 1.0);
        assert_eq!(c.b, 0.0);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_packed_clamps_out_of_range() {
        let c = Color::new(2.0, -1.0, 0.5, 1.0);
        assert_eq!(c.packed(), 0xff00_80ff);
    }

    #[test]
    fn test_default_is_opaque_black() {
        assert_eq!(Color::default(), Color::rgb(0.0, 0.0, 0.0));
        assert_eq!(Color::default().packed(), 0x0000_00ff);
    }

    proptest! {
        #[test]
        fn packed_roundtrip(packed in any::<u32>()) {
            prop_assert_eq!(Color::from_packed(packed).packed(), packed);
        }
    }
}
