//! Pixel layers for a raster image editor.
//!
//! This crate owns the pixel side of a layer and nothing else:
//!
//! - [`PixelBuffer`]: strided, row-major 4-byte pixel storage
//! - [`Color`] / [`Intensity`]: 8-bit RGBA values and their luma
//! - [`UnaryPixelOp`]: per-pixel color ops ([`Invert`], [`Desaturate`],
//!   [`Level`], [`Sepia`]) and [`apply_pixel_op`] to run one through a clip
//! - [`GeometricTransform`] / [`Affine`]: exact flips and quarter turns
//! - [`Layer`]: a buffer plus opacity, visibility, name, tiling and offset
//! - [`Workspace`]: canvas size, allocation limits and selection
//!
//! Compositing layers together, drawing tools, and selection geometry live
//! elsewhere. A layer sees the selection only through [`ClipRegion`].
//!
//! ```
//! use rasterlayer::{Color, Layer, LayerFactory, RectRegion, Workspace};
//!
//! let mut ws = Workspace::new(4, 2);
//! let mut layer = ws.create_layer().unwrap();
//! layer.surface_mut().fill(Color::new(200, 40, 40, 255));
//!
//! ws.set_selection(RectRegion::new(0, 0, 2, 2));
//! layer.invert(&ws).unwrap();
//! assert_eq!(layer.surface().pixel(0, 0), Color::new(55, 215, 215, 255));
//! assert_eq!(layer.surface().pixel(3, 0), Color::new(200, 40, 40, 255));
//!
//! layer.rotate_90_cw(&ws, &ws).unwrap();
//! assert_eq!((layer.surface().width(), layer.surface().height()), (2, 4));
//! ```

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

mod buffer;
mod color;
mod layer;
mod limits;
mod paint;
mod pixel_op;
mod region;
mod transform;
mod workspace;

pub use buffer::{
    AlphaMode, BYTES_PER_PIXEL, BufferError, ChannelLayout, PixelBuffer, PixelDescriptor,
};
pub use color::{
    BLACK, Color, Intensity, TRANSPARENT, WHITE, intensity, premultiply, unpremultiply,
};
pub use layer::{
    Layer, LayerError, LayerFactory, LayerProperties, Point, SelectionSource, WorkspaceSize,
};
pub use limits::{LimitExceeded, ResourceLimits};
pub use paint::Painter;
pub use pixel_op::{Chain, Desaturate, Invert, Level, Sepia, UnaryPixelOp, apply_pixel_op};
pub use region::{ClipRegion, Everything, Inverted, MaskRegion, PixelRect, RectRegion};
pub use transform::{Affine, GeometricTransform, QuarterTurn, Size};
pub use workspace::Workspace;

// Re-exports for callers building images to load into layers.
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb;
pub use rgb::Rgba;
