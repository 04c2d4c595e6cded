//! Scoped drawing onto a pixel buffer.
//!
//! A [`Painter`] holds the exclusive borrow of its target for as long as it
//! lives. Dropping it, on any path out of the caller, ends the paint.

use crate::buffer::{BYTES_PER_PIXEL, PixelBuffer};
use crate::color::TRANSPARENT;
use crate::region::ClipRegion;
use crate::transform::Affine;

/// Drawing context over one [`PixelBuffer`].
#[derive(Debug)]
pub struct Painter<'a> {
    target: &'a mut PixelBuffer,
}

impl<'a> Painter<'a> {
    /// Start painting onto `target`.
    pub fn new(target: &'a mut PixelBuffer) -> Self {
        Self { target }
    }

    /// The buffer being painted.
    pub fn target(&self) -> &PixelBuffer {
        self.target
    }

    /// Reset every pixel to fully transparent.
    pub fn clear(&mut self) {
        self.target.fill(TRANSPARENT);
    }

    /// Copy `src` onto the target, restricted to `clip`.
    ///
    /// Pixels inside the clip are replaced by the source pixel (no blending),
    /// pixels outside keep their bytes. A source in another format is
    /// converted, alpha mode included.
    ///
    /// # Panics
    ///
    /// Panics if `src` and the target differ in size.
    pub fn paint_clipped(&mut self, src: &PixelBuffer, clip: &dyn ClipRegion) {
        assert_eq!(
            src.size(),
            self.target.size(),
            "clipped paint needs equal sizes"
        );
        let bounds = clip.bounds(src.width(), src.height());
        if bounds.is_empty() {
            return;
        }
        let same_format = src.descriptor() == self.target.descriptor();
        let src_desc = src.descriptor();
        let dst_desc = self.target.descriptor();

        for y in bounds.y..bounds.bottom() {
            let src_row = src.row(y);
            let dst_row = self.target.row_mut(y);
            for x in bounds.x..bounds.right() {
                if !clip.contains(x, y) {
                    continue;
                }
                let i = x as usize * BYTES_PER_PIXEL;
                let from = &src_row[i..i + BYTES_PER_PIXEL];
                let to = &mut dst_row[i..i + BYTES_PER_PIXEL];
                if same_format {
                    to.copy_from_slice(from);
                } else {
                    src_desc.convert_to(dst_desc, from, to);
                }
            }
        }
    }

    /// Paint `src` through `matrix` (source to target coordinates).
    ///
    /// Every target pixel whose center maps back inside `src` takes the
    /// nearest source pixel; the rest keep their bytes. On a freshly
    /// allocated target those stay transparent.
    pub fn paint_transformed(&mut self, src: &PixelBuffer, matrix: &Affine) {
        let (sw, sh) = (src.width() as i64, src.height() as i64);
        let src_desc = src.descriptor();
        let dst_desc = self.target.descriptor();
        let same_format = src_desc == dst_desc;

        for y in 0..self.target.height() {
            let dst_row = self.target.row_mut(y);
            for (x, to) in dst_row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                let (sx, sy) = matrix.sample_source(x as u32, y);
                if sx < 0 || sy < 0 || sx >= sw || sy >= sh {
                    continue;
                }
                let Some(from) = src.pixel_bytes(sx as u32, sy as u32) else {
                    continue;
                };
                if same_format {
                    to.copy_from_slice(from);
                } else {
                    src_desc.convert_to(dst_desc, from, to);
                }
            }
        }
    }
}
