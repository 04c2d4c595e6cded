//! Clip regions for color operations.
//!
//! The editor's selection is a path owned by another component. Here it is
//! only ever asked one question: is the pixel at `(x, y)` inside? A pixel
//! counts as inside when its center `(x + 0.5, y + 0.5)` is.

use alloc::boxed::Box;
use alloc::vec::Vec;

/// A clip mask over pixel coordinates.
pub trait ClipRegion {
    /// Whether pixel `(x, y)` is inside the region.
    fn contains(&self, x: u32, y: u32) -> bool;

    /// Pixels of a `width`×`height` buffer that may be inside.
    ///
    /// Everything outside the returned rectangle must be outside the region.
    /// The default is the whole buffer.
    fn bounds(&self, width: u32, height: u32) -> PixelRect {
        PixelRect::new(0, 0, width, height)
    }
}

impl<R: ClipRegion + ?Sized> ClipRegion for &R {
    fn contains(&self, x: u32, y: u32) -> bool {
        (**self).contains(x, y)
    }

    fn bounds(&self, width: u32, height: u32) -> PixelRect {
        (**self).bounds(width, height)
    }
}

impl<R: ClipRegion + ?Sized> ClipRegion for Box<R> {
    fn contains(&self, x: u32, y: u32) -> bool {
        (**self).contains(x, y)
    }

    fn bounds(&self, width: u32, height: u32) -> PixelRect {
        (**self).bounds(width, height)
    }
}

/// Axis-aligned pixel rectangle, half-open on the right and bottom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Create a rectangle from its top-left corner and size.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the rightmost column.
    #[inline]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// One past the bottom row.
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Whether the rectangle covers no pixels.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Overlap of two rectangles (empty if disjoint).
    pub fn intersect(&self, other: &PixelRect) -> PixelRect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        PixelRect::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }

    /// Whether pixel `(x, y)` lies in the rectangle.
    #[inline]
    pub const fn contains_pixel(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// The whole buffer. Used when no selection is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Everything;

impl ClipRegion for Everything {
    #[inline]
    fn contains(&self, _x: u32, _y: u32) -> bool {
        true
    }
}

/// Rectangular selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RectRegion(pub PixelRect);

impl RectRegion {
    /// Selection covering `width`×`height` pixels starting at `(x, y)`.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self(PixelRect::new(x, y, width, height))
    }
}

impl ClipRegion for RectRegion {
    #[inline]
    fn contains(&self, x: u32, y: u32) -> bool {
        self.0.contains_pixel(x, y)
    }

    fn bounds(&self, width: u32, height: u32) -> PixelRect {
        self.0.intersect(&PixelRect::new(0, 0, width, height))
    }
}

/// Per-pixel selection mask: non-zero bytes are selected.
///
/// Pixels beyond the mask's own size are outside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskRegion {
    width: u32,
    height: u32,
    mask: Vec<u8>,
}

impl MaskRegion {
    /// Wrap a row-major mask of `width * height` bytes.
    ///
    /// Returns `None` when the mask length does not match.
    pub fn new(width: u32, height: u32, mask: Vec<u8>) -> Option<Self> {
        let len = (width as usize).checked_mul(height as usize)?;
        (mask.len() == len).then_some(Self {
            width,
            height,
            mask,
        })
    }

    /// Build a mask by asking another region about every pixel of a
    /// `width`×`height` area.
    pub fn rasterize(region: &dyn ClipRegion, width: u32, height: u32) -> Self {
        let mut mask = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            mask.extend((0..width).map(|x| u8::from(region.contains(x, y)) * 255));
        }
        Self {
            width,
            height,
            mask,
        }
    }

    /// Mask width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl ClipRegion for MaskRegion {
    #[inline]
    fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width
            && y < self.height
            && self.mask[y as usize * self.width as usize + x as usize] != 0
    }

    fn bounds(&self, width: u32, height: u32) -> PixelRect {
        PixelRect::new(0, 0, self.width.min(width), self.height.min(height))
    }
}

/// Complement of another region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Inverted<R>(pub R);

impl<R: ClipRegion> ClipRegion for Inverted<R> {
    #[inline]
    fn contains(&self, x: u32, y: u32) -> bool {
        !self.0.contains(x, y)
    }
}
