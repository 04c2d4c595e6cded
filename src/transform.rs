//! Flip and rotate mappings.
//!
//! Layers only ever flip or turn by quarter turns, so the mappings are kept
//! exact: [`Affine`] holds a signed-permutation linear part and a
//! translation counted in half pixels. Pixel centers sit on odd half-pixel
//! coordinates, which lets a canvas of odd width or height rotate about its
//! true center without any rounding.

use core::fmt;

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width and height exchanged.
    pub const fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A rotation by a multiple of 90 degrees, in y-down screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuarterTurn {
    /// +π/2: clockwise on screen.
    Clockwise,
    /// π.
    Half,
    /// −π/2: counter-clockwise on screen.
    CounterClockwise,
}

impl QuarterTurn {
    /// `(cos, sin)` of the angle.
    const fn cos_sin(self) -> (i64, i64) {
        match self {
            Self::Clockwise => (0, 1),
            Self::Half => (-1, 0),
            Self::CounterClockwise => (0, -1),
        }
    }
}

/// Exact affine map for flips and quarter turns.
///
/// Field order follows the usual 2D matrix convention:
///
/// ```text
/// x' = xx * x + xy * y + x0
/// y' = yx * x + yy * y + y0
/// ```
///
/// Points and translations are in half pixels (2 = one pixel). The linear
/// part is always a signed permutation, so the inverse is its transpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Affine {
    xx: i64,
    yx: i64,
    xy: i64,
    yy: i64,
    x0: i64,
    y0: i64,
}

impl Affine {
    /// The identity map.
    pub const fn identity() -> Self {
        Self {
            xx: 1,
            yx: 0,
            xy: 0,
            yy: 1,
            x0: 0,
            y0: 0,
        }
    }

    /// Pure translation by `(tx, ty)` half pixels.
    pub const fn translation(tx: i64, ty: i64) -> Self {
        Self {
            x0: tx,
            y0: ty,
            ..Self::identity()
        }
    }

    /// Pure rotation about the origin.
    pub const fn rotation(turn: QuarterTurn) -> Self {
        let (cos, sin) = turn.cos_sin();
        Self {
            xx: cos,
            yx: sin,
            xy: -sin,
            yy: cos,
            x0: 0,
            y0: 0,
        }
    }

    /// Axis mirror: `mirror_x` negates x, `mirror_y` negates y.
    pub const fn mirror(mirror_x: bool, mirror_y: bool) -> Self {
        Self {
            xx: if mirror_x { -1 } else { 1 },
            yy: if mirror_y { -1 } else { 1 },
            ..Self::identity()
        }
    }

    /// Linear part and translation, in `(xx, yx, xy, yy, x0, y0)` order.
    pub const fn coefficients(&self) -> (i64, i64, i64, i64, i64, i64) {
        (self.xx, self.yx, self.xy, self.yy, self.x0, self.y0)
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    pub const fn multiply(&self, other: &Affine) -> Affine {
        Affine {
            xx: self.xx * other.xx + self.xy * other.yx,
            yx: self.yx * other.xx + self.yy * other.yx,
            xy: self.xx * other.xy + self.xy * other.yy,
            yy: self.yx * other.xy + self.yy * other.yy,
            x0: self.xx * other.x0 + self.xy * other.y0 + self.x0,
            y0: self.yx * other.x0 + self.yy * other.y0 + self.y0,
        }
    }

    /// Prepend a translation, so it is applied to points before `self`.
    pub const fn translate(self, tx: i64, ty: i64) -> Affine {
        self.multiply(&Affine::translation(tx, ty))
    }

    /// Prepend a rotation, so it is applied to points before `self`.
    pub const fn rotate(self, turn: QuarterTurn) -> Affine {
        self.multiply(&Affine::rotation(turn))
    }

    /// Append a translation, so it is applied to points after `self`.
    pub const fn then_translate(self, tx: i64, ty: i64) -> Affine {
        Affine::translation(tx, ty).multiply(&self)
    }

    /// Map a point, in half pixels.
    #[inline]
    pub const fn transform_point(&self, x: i64, y: i64) -> (i64, i64) {
        (
            self.xx * x + self.xy * y + self.x0,
            self.yx * x + self.yy * y + self.y0,
        )
    }

    /// Map a destination point back to where it came from, in half pixels.
    #[inline]
    pub const fn inverse_transform_point(&self, x: i64, y: i64) -> (i64, i64) {
        let dx = x - self.x0;
        let dy = y - self.y0;
        (self.xx * dx + self.yx * dy, self.xy * dx + self.yy * dy)
    }

    /// The inverse map.
    pub const fn invert(&self) -> Affine {
        let (x0, y0) = self.inverse_transform_point(0, 0);
        Affine {
            xx: self.xx,
            yx: self.xy,
            xy: self.yx,
            yy: self.yy,
            x0,
            y0,
        }
    }

    /// Source pixel sampled by destination pixel `(x, y)`.
    ///
    /// Nearest neighbour: the destination pixel center is mapped back and
    /// the source pixel containing it is returned. A center landing exactly
    /// on a pixel edge picks the pixel to its right / below. The result may
    /// lie outside the source.
    #[inline]
    pub const fn sample_source(&self, x: u32, y: u32) -> (i64, i64) {
        let (sx, sy) = self.inverse_transform_point(2 * x as i64 + 1, 2 * y as i64 + 1);
        (sx.div_euclid(2), sy.div_euclid(2))
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

/// Whole-layer geometric transforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometricTransform {
    /// Mirror left-right: `x' = width - x`.
    FlipHorizontal,
    /// Mirror top-bottom: `y' = height - y`.
    FlipVertical,
    /// Point reflection through the center.
    Rotate180,
    /// Quarter turn clockwise about the canvas center.
    Rotate90Cw,
    /// Quarter turn counter-clockwise about the canvas center.
    Rotate90Ccw,
}

impl GeometricTransform {
    /// All variants.
    pub const ALL: [GeometricTransform; 5] = [
        Self::FlipHorizontal,
        Self::FlipVertical,
        Self::Rotate180,
        Self::Rotate90Cw,
        Self::Rotate90Ccw,
    ];

    /// Whether the destination exchanges width and height.
    pub const fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Rotate90Cw | Self::Rotate90Ccw)
    }

    /// The transform that undoes this one.
    pub const fn inverse(self) -> Self {
        match self {
            Self::Rotate90Cw => Self::Rotate90Ccw,
            Self::Rotate90Ccw => Self::Rotate90Cw,
            other => other,
        }
    }

    /// Size of the buffer this transform paints into.
    ///
    /// Flips and the half turn keep the source size. Quarter turns use the
    /// canvas size with width and height exchanged, whatever the source
    /// size is.
    pub const fn destination_size(self, source: Size, canvas: Size) -> Size {
        if self.swaps_dimensions() {
            canvas.transposed()
        } else {
            source
        }
    }

    /// Mapping from source coordinates to destination coordinates.
    pub const fn matrix(self, source: Size, canvas: Size) -> Affine {
        let sw = source.width as i64;
        let sh = source.height as i64;
        let cw = canvas.width as i64;
        let ch = canvas.height as i64;
        match self {
            Self::FlipHorizontal => Affine::mirror(true, false).then_translate(2 * sw, 0),
            Self::FlipVertical => Affine::mirror(false, true).then_translate(0, 2 * sh),
            Self::Rotate180 => Affine::mirror(true, true).then_translate(2 * sw, 2 * sh),
            // In half pixels, a translation by w/2 pixels is w.
            Self::Rotate90Cw => Affine::translation(ch, cw)
                .rotate(QuarterTurn::Clockwise)
                .translate(-cw, -ch),
            Self::Rotate90Ccw => Affine::translation(ch, cw)
                .rotate(QuarterTurn::CounterClockwise)
                .translate(-cw, -ch),
        }
    }
}

impl fmt::Display for GeometricTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FlipHorizontal => "flip horizontal",
            Self::FlipVertical => "flip vertical",
            Self::Rotate180 => "rotate 180",
            Self::Rotate90Cw => "rotate 90 clockwise",
            Self::Rotate90Ccw => "rotate 90 counter-clockwise",
        })
    }
}
