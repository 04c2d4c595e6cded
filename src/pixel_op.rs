//! Per-pixel color operations.
//!
//! Each operation is a small stateless strategy implementing
//! [`UnaryPixelOp`]. [`apply_pixel_op`] runs one over a scratch copy of a
//! surface and paints the result back through a selection clip.

use log::debug;

use crate::buffer::{BufferError, PixelBuffer};
use crate::color::{BLACK, Color, Intensity, WHITE};
use crate::paint::Painter;
use crate::region::{ClipRegion, Everything};

/// A mapping from one pixel value to another.
pub trait UnaryPixelOp {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Transform a single pixel.
    fn apply(&self, color: Color) -> Color;

    /// Transform every pixel of `buffer` in raster order.
    fn apply_to(&self, buffer: &mut PixelBuffer) {
        buffer.for_each_pixel_mut(|c| self.apply(c));
    }

    /// Run `self`, then `next`, on each pixel.
    fn then<B: UnaryPixelOp>(self, next: B) -> Chain<Self, B>
    where
        Self: Sized,
    {
        Chain {
            first: self,
            second: next,
        }
    }
}

/// Apply `op` to the pixels of `buffer` selected by `region`.
///
/// The op runs over a full scratch copy, which is then painted onto
/// `buffer` through the clip: selected pixels are replaced outright,
/// everything else stays bit-identical. `None` selects the whole buffer.
///
/// # Errors
///
/// [`BufferError::AllocationFailed`] if the scratch copy cannot be allocated.
/// `buffer` is unchanged in that case.
pub fn apply_pixel_op<O: UnaryPixelOp + ?Sized>(
    op: &O,
    buffer: &mut PixelBuffer,
    region: Option<&dyn ClipRegion>,
) -> Result<(), BufferError> {
    debug!(
        "applying {} to {}x{} surface",
        op.name(),
        buffer.width(),
        buffer.height()
    );
    let mut scratch = buffer.try_clone()?;
    op.apply_to(&mut scratch);

    let region = region.unwrap_or(&Everything);
    Painter::new(buffer).paint_clipped(&scratch, region);
    Ok(())
}

/// `(r, g, b, a) -> (255 - r, 255 - g, 255 - b, a)`.
///
/// Fully transparent pixels are left alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Invert;

impl UnaryPixelOp for Invert {
    fn name(&self) -> &'static str {
        "invert"
    }

    #[inline]
    fn apply(&self, c: Color) -> Color {
        if c.a == 0 {
            return c;
        }
        Color::new(255 - c.r, 255 - c.g, 255 - c.b, c.a)
    }
}

/// `(r, g, b, a) -> (i, i, i, a)` with `i` the color's intensity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Desaturate;

impl UnaryPixelOp for Desaturate {
    fn name(&self) -> &'static str {
        "desaturate"
    }

    #[inline]
    fn apply(&self, c: Color) -> Color {
        let i = c.intensity();
        Color::new(i, i, i, c.a)
    }
}

/// Piecewise-linear remap of the color channels.
///
/// For each of red, green and blue independently:
///
/// ```text
/// t   = clamp((v - in_low) / (in_high - in_low), 0, 1)
/// t'  = clamp(t * multiplier, 0, 1)
/// out = round(out_low + t' * (out_high - out_low))
/// ```
///
/// Alpha passes through. The curves are baked into lookup tables when the
/// op is built.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    in_low: Color,
    in_high: Color,
    multiplier: [f32; 3],
    out_low: Color,
    out_high: Color,
    curves: [[u8; 256]; 3],
}

impl Level {
    /// Build a level op. `multiplier` is ordered red, green, blue.
    pub fn new(
        in_low: Color,
        in_high: Color,
        multiplier: [f32; 3],
        out_low: Color,
        out_high: Color,
    ) -> Self {
        let channel = |c: Color, i: usize| [c.r, c.g, c.b][i];
        let curves = core::array::from_fn(|i| {
            build_curve(
                channel(in_low, i),
                channel(in_high, i),
                multiplier[i],
                channel(out_low, i),
                channel(out_high, i),
            )
        });
        Self {
            in_low,
            in_high,
            multiplier,
            out_low,
            out_high,
            curves,
        }
    }

    /// Full range in and out, unit multipliers. Maps every value to itself.
    pub fn identity() -> Self {
        Self::new(BLACK, WHITE, [1.0, 1.0, 1.0], BLACK, WHITE)
    }

    /// Warm tone applied after desaturation by [`Sepia`].
    pub fn sepia() -> Self {
        Self::new(BLACK, WHITE, [1.2, 1.0, 0.8], BLACK, WHITE)
    }

    /// Lower input bound.
    pub fn in_low(&self) -> Color {
        self.in_low
    }

    /// Upper input bound.
    pub fn in_high(&self) -> Color {
        self.in_high
    }

    /// Per-channel multipliers (red, green, blue).
    pub fn multiplier(&self) -> [f32; 3] {
        self.multiplier
    }

    /// Lower output bound.
    pub fn out_low(&self) -> Color {
        self.out_low
    }

    /// Upper output bound.
    pub fn out_high(&self) -> Color {
        self.out_high
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::identity()
    }
}

impl UnaryPixelOp for Level {
    fn name(&self) -> &'static str {
        "level"
    }

    #[inline]
    fn apply(&self, c: Color) -> Color {
        let [r, g, b] = &self.curves;
        Color::new(r[c.r as usize], g[c.g as usize], b[c.b as usize], c.a)
    }
}

fn build_curve(in_low: u8, in_high: u8, multiplier: f32, out_low: u8, out_high: u8) -> [u8; 256] {
    let in_low = in_low as f32;
    let in_range = (in_high as f32 - in_low).max(1.0);
    let out_low = out_low as f32;
    let out_range = out_high as f32 - out_low;

    let mut curve = [0u8; 256];
    for (v, slot) in curve.iter_mut().enumerate() {
        let t = ((v as f32 - in_low) / in_range).clamp(0.0, 1.0);
        let t = (t * multiplier).clamp(0.0, 1.0);
        let out = (out_low + t * out_range).clamp(0.0, 255.0);
        // Non-negative after the clamp, so adding one half and truncating rounds.
        *slot = (out + 0.5) as u8;
    }
    curve
}

/// Two ops applied back to back.
#[derive(Clone, Debug, PartialEq)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A: UnaryPixelOp, B: UnaryPixelOp> UnaryPixelOp for Chain<A, B> {
    fn name(&self) -> &'static str {
        "chain"
    }

    #[inline]
    fn apply(&self, c: Color) -> Color {
        self.second.apply(self.first.apply(c))
    }
}

/// Desaturate, then tint warm with [`Level::sepia`].
#[derive(Clone, Debug, PartialEq)]
pub struct Sepia(Chain<Desaturate, Level>);

impl Sepia {
    /// Build the sepia pipeline.
    pub fn new() -> Self {
        Self(Desaturate.then(Level::sepia()))
    }
}

impl Default for Sepia {
    fn default() -> Self {
        Self::new()
    }
}

impl UnaryPixelOp for Sepia {
    fn name(&self) -> &'static str {
        "sepia"
    }

    #[inline]
    fn apply(&self, c: Color) -> Color {
        self.0.apply(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelDescriptor;
    use crate::region::RectRegion;

    fn filled(w: u32, h: u32, c: Color) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h, PixelDescriptor::default()).unwrap();
        buf.fill(c);
        buf
    }

    #[test]
    fn invert_example() {
        assert_eq!(
            Invert.apply(Color::new(10, 20, 30, 255)),
            Color::new(245, 235, 225, 255)
        );
    }

    #[test]
    fn invert_is_involution_on_visible_pixels() {
        for a in [1u8, 128, 255] {
            for v in [0u8, 1, 77, 200, 255] {
                let c = Color::new(v, 255 - v, v / 2, a);
                assert_eq!(Invert.apply(Invert.apply(c)), c);
            }
        }
    }

    #[test]
    fn invert_skips_transparent() {
        let c = Color::new(0, 0, 0, 0);
        assert_eq!(Invert.apply(c), c);
        let odd = Color::new(12, 34, 56, 0);
        assert_eq!(Invert.apply(odd), odd);
    }

    #[test]
    fn desaturate_ignores_alpha_and_is_idempotent() {
        let c = Color::new(200, 100, 50, 0);
        let once = Desaturate.apply(c);
        assert_eq!(once.r, once.g);
        assert_eq!(once.g, once.b);
        assert_eq!(once.a, 0);
        assert_ne!(once, c);
        assert_eq!(Desaturate.apply(once), once);
    }

    #[test]
    fn level_identity_maps_to_self() {
        let level = Level::identity();
        for v in 0..=255u8 {
            assert_eq!(level.apply(Color::new(v, v, v, 9)), Color::new(v, v, v, 9));
        }
    }

    #[test]
    fn level_sepia_curves() {
        let level = Level::sepia();
        let out = level.apply(Color::new(100, 100, 100, 255));
        assert_eq!(out, Color::new(120, 100, 80, 255));
        // red saturates at 255 / 1.2 = 212.5
        assert_eq!(level.apply(Color::new(250, 0, 0, 255)).r, 255);
        assert_eq!(level.apply(Color::new(255, 255, 255, 255)).b, 204);
    }

    #[test]
    fn level_input_window_and_output_range() {
        let level = Level::new(
            Color::new(50, 50, 50, 255),
            Color::new(150, 150, 150, 255),
            [1.0, 1.0, 1.0],
            Color::new(10, 10, 10, 255),
            Color::new(110, 110, 110, 255),
        );
        assert_eq!(level.apply(Color::new(0, 50, 255, 7)), Color::new(10, 10, 110, 7));
        assert_eq!(level.apply(Color::new(100, 100, 100, 7)).g, 60);
    }

    #[test]
    fn level_degenerate_input_range_does_not_divide_by_zero() {
        let gray = Color::new(128, 128, 128, 255);
        let level = Level::new(gray, gray, [1.0, 1.0, 1.0], BLACK, WHITE);
        assert_eq!(level.apply(Color::new(127, 128, 129, 255)), Color::new(0, 0, 255, 255));
    }

    #[test]
    fn sepia_is_desaturate_then_level() {
        let c = Color::new(30, 160, 220, 200);
        let expected = Level::sepia().apply(Desaturate.apply(c));
        assert_eq!(Sepia::new().apply(c), expected);
        assert!(expected.r >= expected.g && expected.g >= expected.b);
    }

    #[test]
    fn apply_pixel_op_whole_buffer_by_default() {
        let mut buf = filled(3, 2, Color::new(10, 20, 30, 255));
        apply_pixel_op(&Invert, &mut buf, None).unwrap();
        assert!(buf.pixels().all(|c| c == Color::new(245, 235, 225, 255)));
    }

    #[test]
    fn apply_pixel_op_respects_clip() {
        let start = Color::new(10, 20, 30, 255);
        let mut buf = filled(4, 4, start);
        let region = RectRegion::new(1, 1, 2, 2);
        apply_pixel_op(&Desaturate, &mut buf, Some(&region)).unwrap();

        let gray = Desaturate.apply(start);
        for y in 0..4 {
            for x in 0..4 {
                let expected = if region.contains(x, y) { gray } else { start };
                assert_eq!(buf.pixel(x, y), expected, "({x}, {y})");
            }
        }
    }

    #[test]
    fn apply_pixel_op_through_dyn() {
        let ops: [&dyn UnaryPixelOp; 3] = [&Invert, &Desaturate, &Level::identity()];
        let mut buf = filled(2, 2, Color::new(1, 2, 3, 4));
        for op in ops {
            apply_pixel_op(op, &mut buf, None).unwrap();
        }
        assert_eq!(buf.pixel(0, 0), Desaturate.apply(Invert.apply(Color::new(1, 2, 3, 4))));
    }
}
