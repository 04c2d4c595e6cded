//! Pixel color values.
//!
//! [`Color`] is an 8-bit RGBA pixel from the `rgb` crate. Layers store
//! premultiplied alpha, so a color read from a layer surface is already
//! scaled by its alpha; the compositor consumes it that way.

use rgb::Rgba;

/// A single layer pixel: red, green, blue, alpha, 8 bits each.
pub type Color = Rgba<u8>;

/// Fully transparent black. The value of a cleared pixel.
pub const TRANSPARENT: Color = Rgba {
    r: 0,
    g: 0,
    b: 0,
    a: 0,
};

/// Opaque black.
pub const BLACK: Color = Rgba {
    r: 0,
    g: 0,
    b: 0,
    a: 255,
};

/// Opaque white.
pub const WHITE: Color = Rgba {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

// Rec.601 luma weights in 16.16 fixed point. They sum to 65536, so any gray
// input maps back to itself.
const WEIGHT_R: u32 = 19_595;
const WEIGHT_G: u32 = 38_470;
const WEIGHT_B: u32 = 7_471;

/// Perceptual intensity of a color.
pub trait Intensity {
    /// Luma byte: `0.299 R + 0.587 G + 0.114 B`, rounded to nearest.
    ///
    /// Alpha does not participate.
    fn intensity(&self) -> u8;
}

impl Intensity for Color {
    #[inline]
    fn intensity(&self) -> u8 {
        intensity(self.r, self.g, self.b)
    }
}

/// Luma byte of an `(r, g, b)` triple.
#[inline]
pub const fn intensity(r: u8, g: u8, b: u8) -> u8 {
    let sum = WEIGHT_R * r as u32 + WEIGHT_G * g as u32 + WEIGHT_B * b as u32;
    ((sum + (1 << 15)) >> 16) as u8
}

/// Scale the color channels by alpha, rounding to nearest.
#[inline]
pub const fn premultiply(c: Color) -> Color {
    let a = c.a as u32;
    Rgba {
        r: ((c.r as u32 * a + 127) / 255) as u8,
        g: ((c.g as u32 * a + 127) / 255) as u8,
        b: ((c.b as u32 * a + 127) / 255) as u8,
        a: c.a,
    }
}

/// Undo [`premultiply`]. Fully transparent input becomes [`TRANSPARENT`].
///
/// Channels above alpha (not valid premultiplied data) saturate at 255.
#[inline]
pub const fn unpremultiply(c: Color) -> Color {
    if c.a == 0 {
        return TRANSPARENT;
    }
    Rgba {
        r: unscale(c.r, c.a),
        g: unscale(c.g, c.a),
        b: unscale(c.b, c.a),
        a: c.a,
    }
}

const fn unscale(v: u8, a: u8) -> u8 {
    let a = a as u32;
    let v = (v as u32 * 255 + a / 2) / a;
    if v > 255 { 255 } else { v as u8 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_unity() {
        assert_eq!(WEIGHT_R + WEIGHT_G + WEIGHT_B, 1 << 16);
    }

    #[test]
    fn gray_is_fixed_point() {
        for v in 0..=255u8 {
            assert_eq!(intensity(v, v, v), v, "gray {v}");
        }
    }

    #[test]
    fn primaries() {
        // 0.299 * 255 = 76.2, 0.587 * 255 = 149.7, 0.114 * 255 = 29.1
        assert_eq!(intensity(255, 0, 0), 76);
        assert_eq!(intensity(0, 255, 0), 150);
        assert_eq!(intensity(0, 0, 255), 29);
    }

    #[test]
    fn ignores_alpha() {
        let opaque = Color::new(10, 200, 30, 255);
        let clear = Color::new(10, 200, 30, 0);
        assert_eq!(opaque.intensity(), clear.intensity());
    }

    #[test]
    fn named_constants() {
        assert_eq!(TRANSPARENT, Color::new(0, 0, 0, 0));
        assert_eq!(BLACK.a, 255);
        assert_eq!(WHITE, Color::new(255, 255, 255, 255));
    }

    #[test]
    fn premultiply_rounds_to_nearest() {
        assert_eq!(premultiply(Color::new(200, 100, 50, 128)), Color::new(100, 50, 25, 128));
        assert_eq!(premultiply(Color::new(255, 255, 255, 10)), Color::new(10, 10, 10, 10));
        assert_eq!(premultiply(Color::new(9, 8, 7, 255)), Color::new(9, 8, 7, 255));
        assert_eq!(premultiply(Color::new(9, 8, 7, 0)), TRANSPARENT);
    }

    #[test]
    fn unpremultiply_recovers_opaque_and_clamps() {
        assert_eq!(unpremultiply(Color::new(100, 50, 25, 128)), Color::new(199, 100, 50, 128));
        assert_eq!(unpremultiply(Color::new(9, 8, 7, 255)), Color::new(9, 8, 7, 255));
        assert_eq!(unpremultiply(Color::new(30, 0, 0, 10)), Color::new(255, 0, 0, 10));
        assert_eq!(unpremultiply(Color::new(5, 5, 5, 0)), TRANSPARENT);
    }

    #[test]
    fn premultiplied_round_trip_is_stable() {
        for a in [1u8, 17, 128, 254, 255] {
            for v in [0u8, 1, 63, 200, 255] {
                let once = premultiply(Color::new(v, v, v, a));
                assert!(once.r <= a);
                assert_eq!(premultiply(unpremultiply(once)), once, "v={v} a={a}");
            }
        }
    }
}
