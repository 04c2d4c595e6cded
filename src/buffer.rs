//! Owned pixel storage for layers.
//!
//! A [`PixelBuffer`] is a contiguous, row-major grid of 4-byte pixels with an
//! explicit byte stride. The channel order and alpha interpretation are
//! carried by a [`PixelDescriptor`]; reads and writes go through [`Color`]
//! so callers never touch channel order directly.

use alloc::vec::Vec;
use core::fmt;

use imgref::{ImgRef, ImgVec};

use crate::color::{Color, premultiply, unpremultiply};

/// Bytes occupied by one pixel in every supported layout.
pub const BYTES_PER_PIXEL: usize = 4;

// ---------------------------------------------------------------------------
// Descriptor enums
// ---------------------------------------------------------------------------

/// Byte order of the four channels within a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelLayout {
    /// Red, green, blue, alpha.
    Rgba = 1,
    /// Blue, green, red, alpha (cairo ARGB32 on little-endian hosts).
    Bgra = 2,
}

/// Alpha channel interpretation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlphaMode {
    /// Straight (unassociated) alpha.
    Straight = 1,
    /// Premultiplied (associated) alpha.
    Premultiplied = 2,
}

/// Format of the pixels held by a [`PixelBuffer`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PixelDescriptor {
    /// Channel byte order.
    pub layout: ChannelLayout,
    /// Alpha interpretation.
    pub alpha: AlphaMode,
}

impl PixelDescriptor {
    /// Create a pixel format descriptor.
    pub const fn new(layout: ChannelLayout, alpha: AlphaMode) -> Self {
        Self { layout, alpha }
    }

    /// 8-bit RGBA, premultiplied.
    pub const RGBA8_PREMULTIPLIED: Self = Self::new(ChannelLayout::Rgba, AlphaMode::Premultiplied);

    /// 8-bit RGBA, straight alpha.
    pub const RGBA8_STRAIGHT: Self = Self::new(ChannelLayout::Rgba, AlphaMode::Straight);

    /// 8-bit BGRA, premultiplied. The default layer surface format.
    pub const BGRA8_PREMULTIPLIED: Self = Self::new(ChannelLayout::Bgra, AlphaMode::Premultiplied);

    /// Bytes per pixel.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        BYTES_PER_PIXEL
    }

    /// Whether stored color channels are already scaled by alpha.
    #[inline]
    pub const fn is_premultiplied(self) -> bool {
        matches!(self.alpha, AlphaMode::Premultiplied)
    }

    /// Tightly packed stride for `width` pixels, or `None` on overflow.
    #[inline]
    pub const fn min_stride(self, width: u32) -> Option<usize> {
        (width as usize).checked_mul(BYTES_PER_PIXEL)
    }

    /// Read one pixel from its four stored bytes.
    #[inline]
    pub fn decode(self, px: &[u8]) -> Color {
        match self.layout {
            ChannelLayout::Rgba => Color::new(px[0], px[1], px[2], px[3]),
            ChannelLayout::Bgra => Color::new(px[2], px[1], px[0], px[3]),
        }
    }

    /// Write one pixel into its four stored bytes.
    #[inline]
    pub fn encode(self, color: Color, px: &mut [u8]) {
        let bytes = match self.layout {
            ChannelLayout::Rgba => [color.r, color.g, color.b, color.a],
            ChannelLayout::Bgra => [color.b, color.g, color.r, color.a],
        };
        px[..BYTES_PER_PIXEL].copy_from_slice(&bytes);
    }

    /// Re-encode one pixel stored as `self` into `target`'s format.
    ///
    /// Channel order is swapped as needed, and straight alpha is
    /// premultiplied (or the reverse) when the alpha modes differ.
    #[inline]
    pub fn convert_to(self, target: PixelDescriptor, from: &[u8], to: &mut [u8]) {
        let color = self.decode(from);
        let color = match (self.is_premultiplied(), target.is_premultiplied()) {
            (false, true) => premultiply(color),
            (true, false) => unpremultiply(color),
            _ => color,
        };
        target.encode(color, to);
    }
}

impl Default for PixelDescriptor {
    fn default() -> Self {
        Self::BGRA8_PREMULTIPLIED
    }
}

// ---------------------------------------------------------------------------
// BufferError
// ---------------------------------------------------------------------------

/// Errors from pixel buffer construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum BufferError {
    /// Width or height is zero or the byte size overflows.
    InvalidDimensions,
    /// Stride is smaller than `width * 4`.
    StrideTooSmall,
    /// Supplied data is shorter than `stride * height`.
    InsufficientData,
    /// The allocator could not provide the requested bytes.
    AllocationFailed {
        /// Requested size in bytes.
        bytes: usize,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions => write!(f, "width or height is zero or causes overflow"),
            Self::StrideTooSmall => write!(f, "stride is smaller than width * bytes_per_pixel"),
            Self::InsufficientData => {
                write!(f, "data slice is too small for the given dimensions")
            }
            Self::AllocationFailed { bytes } => {
                write!(f, "failed to allocate {bytes} bytes of pixel storage")
            }
        }
    }
}

impl core::error::Error for BufferError {}

// ---------------------------------------------------------------------------
// PixelBuffer
// ---------------------------------------------------------------------------

/// Owned pixel grid backing a layer.
///
/// Rows are stored top to bottom; pixel `(x, y)` starts at byte
/// `y * stride + x * 4`. The byte length is always exactly
/// `stride * height`, and both dimensions are at least one.
#[derive(Clone)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
    descriptor: PixelDescriptor,
}

impl PixelBuffer {
    /// Allocate a transparent, tightly packed buffer.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidDimensions`] for a zero or overflowing size,
    /// [`BufferError::AllocationFailed`] if the allocator refuses.
    pub fn new(width: u32, height: u32, descriptor: PixelDescriptor) -> Result<Self, BufferError> {
        let stride = descriptor
            .min_stride(width)
            .ok_or(BufferError::InvalidDimensions)?;
        Self::with_stride(width, height, stride, descriptor)
    }

    /// Allocate a transparent buffer whose rows are `stride` bytes apart.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new), plus [`BufferError::StrideTooSmall`].
    pub fn with_stride(
        width: u32,
        height: u32,
        stride: usize,
        descriptor: PixelDescriptor,
    ) -> Result<Self, BufferError> {
        let total = checked_len(width, height, stride, descriptor)?;
        let data = alloc_zeroed(total)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
            descriptor,
        })
    }

    /// Wrap existing bytes as a pixel buffer.
    ///
    /// Extra bytes past `stride * height` are truncated.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InsufficientData`] if the vec is too small.
    pub fn from_vec(
        mut data: Vec<u8>,
        width: u32,
        height: u32,
        stride: usize,
        descriptor: PixelDescriptor,
    ) -> Result<Self, BufferError> {
        let total = checked_len(width, height, stride, descriptor)?;
        if data.len() < total {
            return Err(BufferError::InsufficientData);
        }
        data.truncate(total);
        Ok(Self {
            data,
            width,
            height,
            stride,
            descriptor,
        })
    }

    /// Copy a typed RGBA image into a new buffer of the given format.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn from_imgref(
        img: ImgRef<'_, Color>,
        descriptor: PixelDescriptor,
    ) -> Result<Self, BufferError> {
        let width = u32::try_from(img.width()).map_err(|_| BufferError::InvalidDimensions)?;
        let height = u32::try_from(img.height()).map_err(|_| BufferError::InvalidDimensions)?;
        let mut buf = Self::new(width, height, descriptor)?;
        for (y, src_row) in img.rows().enumerate() {
            let dst_row = buf.row_mut(y as u32);
            for (px, &color) in dst_row.chunks_exact_mut(BYTES_PER_PIXEL).zip(src_row) {
                descriptor.encode(color, px);
            }
        }
        Ok(buf)
    }

    /// Copy the pixels out as a tightly packed typed RGBA image.
    pub fn to_img_vec(&self) -> ImgVec<Color> {
        let pixels: Vec<Color> = self.pixels().collect();
        ImgVec::new(pixels, self.width as usize, self.height as usize)
    }

    /// Scratch copy with identical geometry and format.
    ///
    /// # Errors
    ///
    /// [`BufferError::AllocationFailed`] if the allocator refuses.
    pub fn try_clone(&self) -> Result<Self, BufferError> {
        let mut data = Vec::new();
        data.try_reserve_exact(self.data.len())
            .map_err(|_| BufferError::AllocationFailed {
                bytes: self.data.len(),
            })?;
        data.extend_from_slice(&self.data);
        Ok(Self {
            data,
            width: self.width,
            height: self.height,
            stride: self.stride,
            descriptor: self.descriptor,
        })
    }

    /// Consume the buffer and return the backing bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Total byte length, `stride * height`.
    #[inline]
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Pixel format descriptor.
    #[inline]
    pub fn descriptor(&self) -> PixelDescriptor {
        self.descriptor
    }

    /// Raw bytes including row padding.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel bytes for row `y` (no padding, exactly `width * 4` bytes).
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(
            y < self.height,
            "row index {y} out of bounds (height: {})",
            self.height
        );
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * BYTES_PER_PIXEL]
    }

    /// Mutable pixel bytes for row `y` (no padding).
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(
            y < self.height,
            "row index {y} out of bounds (height: {})",
            self.height
        );
        let start = y as usize * self.stride;
        let len = self.width as usize * BYTES_PER_PIXEL;
        &mut self.data[start..start + len]
    }

    /// Stored bytes of pixel `(x, y)`, or `None` outside the buffer.
    #[inline]
    pub fn pixel_bytes(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = self.offset_of(x, y);
        Some(&self.data[start..start + BYTES_PER_PIXEL])
    }

    /// Color at `(x, y)`, or `None` outside the buffer.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixel_bytes(x, y).map(|px| self.descriptor.decode(px))
    }

    /// Color at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        match self.get_pixel(x, y) {
            Some(c) => c,
            None => panic!(
                "pixel ({x}, {y}) out of bounds ({}x{})",
                self.width, self.height
            ),
        }
    }

    /// Overwrite the color at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds ({}x{})",
            self.width,
            self.height
        );
        let start = self.offset_of(x, y);
        self.descriptor
            .encode(color, &mut self.data[start..start + BYTES_PER_PIXEL]);
    }

    /// All pixels in raster order.
    pub fn pixels(&self) -> impl Iterator<Item = Color> + '_ {
        let descriptor = self.descriptor;
        (0..self.height).flat_map(move |y| {
            self.row(y)
                .chunks_exact(BYTES_PER_PIXEL)
                .map(move |px| descriptor.decode(px))
        })
    }

    /// Replace every pixel with `f(pixel)`, in raster order.
    pub fn for_each_pixel_mut(&mut self, mut f: impl FnMut(Color) -> Color) {
        let descriptor = self.descriptor;
        for y in 0..self.height {
            for px in self.row_mut(y).chunks_exact_mut(BYTES_PER_PIXEL) {
                let color = f(descriptor.decode(px));
                descriptor.encode(color, px);
            }
        }
    }

    /// Set every pixel to `color`. Row padding is left untouched.
    pub fn fill(&mut self, color: Color) {
        let mut bytes = [0u8; BYTES_PER_PIXEL];
        self.descriptor.encode(color, &mut bytes);
        for y in 0..self.height {
            for px in self.row_mut(y).chunks_exact_mut(BYTES_PER_PIXEL) {
                px.copy_from_slice(&bytes);
            }
        }
    }

    #[inline]
    fn offset_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride + x as usize * BYTES_PER_PIXEL
    }
}

impl PartialEq for PixelBuffer {
    /// Equal when size, format and every visible pixel match. Row padding
    /// and stride are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size()
            && self.descriptor == other.descriptor
            && (0..self.height).all(|y| self.row(y) == other.row(y))
    }
}

impl Eq for PixelBuffer {}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelBuffer({}x{}, {:?} {:?})",
            self.width, self.height, self.descriptor.layout, self.descriptor.alpha
        )
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Validate geometry and return `stride * height`.
fn checked_len(
    width: u32,
    height: u32,
    stride: usize,
    descriptor: PixelDescriptor,
) -> Result<usize, BufferError> {
    if width == 0 || height == 0 {
        return Err(BufferError::InvalidDimensions);
    }
    let min_stride = descriptor
        .min_stride(width)
        .ok_or(BufferError::InvalidDimensions)?;
    if stride < min_stride {
        return Err(BufferError::StrideTooSmall);
    }
    stride
        .checked_mul(height as usize)
        .ok_or(BufferError::InvalidDimensions)
}

fn alloc_zeroed(len: usize) -> Result<Vec<u8>, BufferError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| BufferError::AllocationFailed { bytes: len })?;
    data.resize(len, 0);
    Ok(data)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;

    #[test]
    fn new_is_transparent_and_packed() {
        let buf = PixelBuffer::new(10, 5, PixelDescriptor::RGBA8_PREMULTIPLIED).unwrap();
        assert_eq!(buf.size(), (10, 5));
        assert_eq!(buf.stride(), 40);
        assert_eq!(buf.data_len(), 200);
        assert!(buf.pixels().all(|c| c == Color::new(0, 0, 0, 0)));
    }

    #[test]
    fn zero_size_rejected() {
        let desc = PixelDescriptor::default();
        assert_eq!(
            PixelBuffer::new(0, 4, desc).unwrap_err(),
            BufferError::InvalidDimensions
        );
        assert_eq!(
            PixelBuffer::new(4, 0, desc).unwrap_err(),
            BufferError::InvalidDimensions
        );
    }

    #[test]
    fn padded_stride_keeps_length_invariant() {
        let buf = PixelBuffer::with_stride(3, 4, 16, PixelDescriptor::default()).unwrap();
        assert_eq!(buf.stride(), 16);
        assert_eq!(buf.data_len(), buf.stride() * buf.height() as usize);
        assert_eq!(buf.row(3).len(), 12);
    }

    #[test]
    fn stride_too_small() {
        let err = PixelBuffer::with_stride(4, 4, 15, PixelDescriptor::default()).unwrap_err();
        assert_eq!(err, BufferError::StrideTooSmall);
    }

    #[test]
    fn from_vec_too_small() {
        let err = PixelBuffer::from_vec(vec![0u8; 10], 2, 2, 8, PixelDescriptor::default());
        assert_eq!(err.unwrap_err(), BufferError::InsufficientData);
    }

    #[test]
    fn from_vec_truncates_extra() {
        let buf =
            PixelBuffer::from_vec(vec![7u8; 40], 2, 2, 8, PixelDescriptor::default()).unwrap();
        assert_eq!(buf.data_len(), 16);
        assert_eq!(buf.into_vec().len(), 16);
    }

    #[test]
    fn convert_to_handles_order_and_alpha() {
        let straight = [200, 100, 50, 128];
        let mut out = [0u8; 4];

        PixelDescriptor::RGBA8_STRAIGHT.convert_to(
            PixelDescriptor::BGRA8_PREMULTIPLIED,
            &straight,
            &mut out,
        );
        assert_eq!(out, [25, 50, 100, 128]);

        let premul = out;
        PixelDescriptor::BGRA8_PREMULTIPLIED.convert_to(
            PixelDescriptor::RGBA8_PREMULTIPLIED,
            &premul,
            &mut out,
        );
        assert_eq!(out, [100, 50, 25, 128]);

        PixelDescriptor::BGRA8_PREMULTIPLIED.convert_to(
            PixelDescriptor::RGBA8_STRAIGHT,
            &premul,
            &mut out,
        );
        assert_eq!(out, [199, 100, 50, 128]);
    }

    #[test]
    fn bgra_byte_order() {
        let mut buf = PixelBuffer::new(1, 1, PixelDescriptor::BGRA8_PREMULTIPLIED).unwrap();
        buf.set_pixel(0, 0, Color::new(1, 2, 3, 4));
        assert_eq!(buf.as_bytes(), &[3, 2, 1, 4]);
        assert_eq!(buf.pixel(0, 0), Color::new(1, 2, 3, 4));

        let mut buf = PixelBuffer::new(1, 1, PixelDescriptor::RGBA8_PREMULTIPLIED).unwrap();
        buf.set_pixel(0, 0, Color::new(1, 2, 3, 4));
        assert_eq!(buf.as_bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn addressing_with_padding() {
        let mut buf = PixelBuffer::with_stride(2, 2, 12, PixelDescriptor::RGBA8_STRAIGHT).unwrap();
        buf.set_pixel(1, 1, Color::new(9, 8, 7, 6));
        // offset = 1 * 12 + 1 * 4 = 16
        assert_eq!(&buf.as_bytes()[16..20], &[9, 8, 7, 6]);
        assert_eq!(buf.get_pixel(2, 0), None);
        assert_eq!(buf.get_pixel(0, 2), None);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn set_pixel_out_of_bounds_panics() {
        let mut buf = PixelBuffer::new(2, 2, PixelDescriptor::default()).unwrap();
        buf.set_pixel(2, 0, Color::new(0, 0, 0, 0));
    }

    #[test]
    fn for_each_pixel_mut_visits_raster_order() {
        let mut buf = PixelBuffer::with_stride(3, 2, 16, PixelDescriptor::default()).unwrap();
        let mut n = 0u8;
        buf.for_each_pixel_mut(|_| {
            n += 1;
            Color::new(n, 0, 0, 255)
        });
        let reds: Vec<u8> = buf.pixels().map(|c| c.r).collect();
        assert_eq!(reds, vec![1, 2, 3, 4, 5, 6]);
        // padding bytes untouched
        assert_eq!(&buf.as_bytes()[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn fill_and_try_clone() {
        let mut buf = PixelBuffer::new(4, 3, PixelDescriptor::default()).unwrap();
        buf.fill(Color::new(10, 20, 30, 255));
        let copy = buf.try_clone().unwrap();
        assert_eq!(copy, buf);
        assert!(copy.pixels().all(|c| c == Color::new(10, 20, 30, 255)));
    }

    #[test]
    fn equality_ignores_padding() {
        let mut a = PixelBuffer::new(2, 2, PixelDescriptor::default()).unwrap();
        let mut b = PixelBuffer::with_stride(2, 2, 32, PixelDescriptor::default()).unwrap();
        a.set_pixel(1, 0, Color::new(5, 5, 5, 5));
        b.set_pixel(1, 0, Color::new(5, 5, 5, 5));
        assert_eq!(a, b);
        b.set_pixel(0, 1, Color::new(1, 0, 0, 1));
        assert_ne!(a, b);
    }

    #[test]
    fn imgref_interop() {
        let pixels = vec![
            Color::new(1, 2, 3, 4),
            Color::new(5, 6, 7, 8),
            Color::new(9, 10, 11, 12),
            Color::new(13, 14, 15, 16),
        ];
        let img = imgref::Img::new(pixels.as_slice(), 2, 2);
        let buf = PixelBuffer::from_imgref(img, PixelDescriptor::BGRA8_PREMULTIPLIED).unwrap();
        assert_eq!(buf.pixel(1, 1), Color::new(13, 14, 15, 16));
        assert_eq!(&buf.row(0)[..4], &[3, 2, 1, 4]);

        let back = buf.to_img_vec();
        assert_eq!(back.width(), 2);
        assert_eq!(back.height(), 2);
        assert_eq!(back.buf().as_slice(), pixels.as_slice());
    }

    #[test]
    fn debug_format() {
        let buf = PixelBuffer::new(10, 5, PixelDescriptor::BGRA8_PREMULTIPLIED).unwrap();
        assert_eq!(format!("{buf:?}"), "PixelBuffer(10x5, Bgra Premultiplied)");
    }

    #[test]
    fn buffer_error_display() {
        let msg = format!("{}", BufferError::AllocationFailed { bytes: 64 });
        assert!(msg.contains("64 bytes"));
        let msg = format!("{}", BufferError::StrideTooSmall);
        assert!(msg.contains("stride"));
    }
}
