//! Editable raster layers.
//!
//! A [`Layer`] owns exactly one [`PixelBuffer`] plus the presentation fields
//! the compositor reads on every redraw. Color operations rewrite the buffer
//! in place through the active selection; geometric operations paint into a
//! fresh buffer from a [`LayerFactory`] and swap it in.
//!
//! Collaborators are passed in explicitly: the factory that allocates
//! surfaces, the canvas size, and the selection. [`Workspace`] implements
//! all three.
//!
//! [`Workspace`]: crate::Workspace

use alloc::string::String;
use core::fmt;

use log::{debug, trace, warn};

use crate::buffer::{BufferError, PixelBuffer};
use crate::limits::LimitExceeded;
use crate::paint::Painter;
use crate::pixel_op::{Desaturate, Invert, Sepia, UnaryPixelOp, apply_pixel_op};
use crate::region::ClipRegion;
use crate::transform::{GeometricTransform, Size};

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Allocates new, fully transparent layers.
pub trait LayerFactory {
    /// A layer of the default (canvas) size.
    fn create_layer(&self) -> Result<Layer, LayerError>;

    /// A named layer of an explicit size.
    fn create_layer_sized(&self, name: &str, width: u32, height: u32)
    -> Result<Layer, LayerError>;
}

/// Current canvas size.
pub trait WorkspaceSize {
    /// Canvas width and height in pixels.
    fn image_size(&self) -> Size;
}

/// Current selection.
pub trait SelectionSource {
    /// The clip region for color operations. When nothing is selected this
    /// is [`Everything`](crate::region::Everything).
    fn selection(&self) -> &dyn ClipRegion;
}

// ---------------------------------------------------------------------------
// LayerError
// ---------------------------------------------------------------------------

/// Failure to allocate a scratch or destination surface.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum LayerError {
    /// Buffer construction or allocation failed.
    Buffer(BufferError),
    /// The requested surface is larger than the configured limits.
    Limit(LimitExceeded),
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffer(e) => write!(f, "layer surface: {e}"),
            Self::Limit(e) => write!(f, "layer surface limit: {e}"),
        }
    }
}

impl core::error::Error for LayerError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Buffer(e) => Some(e),
            Self::Limit(e) => Some(e),
        }
    }
}

impl From<BufferError> for LayerError {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}

impl From<LimitExceeded> for LayerError {
    fn from(e: LimitExceeded) -> Self {
        Self::Limit(e)
    }
}

// ---------------------------------------------------------------------------
// Point / LayerProperties
// ---------------------------------------------------------------------------

/// Layer position relative to the canvas origin, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

impl Point {
    /// The canvas origin.
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Presentation fields of a layer, without its pixels.
///
/// ```
/// use rasterlayer::LayerProperties;
///
/// let props = LayerProperties::new().with_name("Shadow").with_opacity(0.5);
/// assert!(!props.hidden);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct LayerProperties {
    /// Display name.
    pub name: String,
    /// Hidden layers are skipped by the compositor.
    pub hidden: bool,
    /// Blend opacity, expected in `[0, 1]`.
    pub opacity: f64,
    /// Whether the compositor repeats the layer to fill the canvas.
    pub tiled: bool,
    /// Position of the layer's top-left corner.
    pub offset: Point,
}

impl LayerProperties {
    /// Visible, fully opaque, untiled, unnamed, at the origin.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            hidden: false,
            opacity: 1.0,
            tiled: false,
            offset: Point::ORIGIN,
        }
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the hidden flag.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Set the opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the tiling flag.
    pub fn with_tiled(mut self, tiled: bool) -> Self {
        self.tiled = tiled;
        self
    }

    /// Set the offset.
    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }
}

impl Default for LayerProperties {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Layer
// ---------------------------------------------------------------------------

/// A named, positioned pixel buffer.
///
/// Every mutating operation takes `&mut self`, so a layer cannot be read
/// while its surface is being replaced.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    surface: PixelBuffer,
    props: LayerProperties,
}

impl Layer {
    /// Wrap a surface with default properties.
    pub fn new(surface: PixelBuffer) -> Self {
        Self::with_properties_struct(surface, LayerProperties::new())
    }

    /// Wrap a surface with the given visibility, opacity and name.
    pub fn with_properties(
        surface: PixelBuffer,
        hidden: bool,
        opacity: f64,
        name: impl Into<String>,
    ) -> Self {
        let props = LayerProperties::new()
            .with_hidden(hidden)
            .with_opacity(opacity)
            .with_name(name);
        Self::with_properties_struct(surface, props)
    }

    /// Wrap a surface with a full property set.
    pub fn with_properties_struct(surface: PixelBuffer, props: LayerProperties) -> Self {
        Self { surface, props }
    }

    // --- presentation ---

    /// Presentation fields.
    pub fn properties(&self) -> &LayerProperties {
        &self.props
    }

    /// Replace all presentation fields at once.
    pub fn set_properties(&mut self, props: LayerProperties) {
        self.props = props;
    }

    /// Blend opacity.
    pub fn opacity(&self) -> f64 {
        self.props.opacity
    }

    /// Stored as given; callers keep it in `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.props.opacity = opacity;
    }

    /// Whether the compositor skips this layer.
    pub fn hidden(&self) -> bool {
        self.props.hidden
    }

    /// Show or hide the layer.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.props.hidden = hidden;
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.props.name
    }

    /// Rename the layer.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.props.name = name.into();
    }

    /// Whether the layer repeats to fill the canvas.
    pub fn tiled(&self) -> bool {
        self.props.tiled
    }

    /// Turn tiling on or off.
    pub fn set_tiled(&mut self, tiled: bool) {
        self.props.tiled = tiled;
    }

    /// Position of the top-left corner on the canvas.
    pub fn offset(&self) -> Point {
        self.props.offset
    }

    /// Move the layer.
    pub fn set_offset(&mut self, offset: Point) {
        self.props.offset = offset;
    }

    // --- surface ---

    /// The current pixels.
    pub fn surface(&self) -> &PixelBuffer {
        &self.surface
    }

    /// Mutable access to the current pixels.
    pub fn surface_mut(&mut self) -> &mut PixelBuffer {
        &mut self.surface
    }

    /// Put `surface` in place and hand back the previous one.
    pub fn replace_surface(&mut self, surface: PixelBuffer) -> PixelBuffer {
        core::mem::replace(&mut self.surface, surface)
    }

    /// Take the pixels, dropping the presentation fields.
    pub fn into_surface(self) -> PixelBuffer {
        self.surface
    }

    /// Surface size.
    pub fn size(&self) -> Size {
        Size::new(self.surface.width(), self.surface.height())
    }

    // --- pixel operations ---

    /// Make every pixel fully transparent. Ignores the selection.
    pub fn clear(&mut self) {
        Painter::new(&mut self.surface).clear();
    }

    /// Invert the colors of the selected, non-transparent pixels.
    pub fn invert(&mut self, selection: &dyn SelectionSource) -> Result<(), LayerError> {
        self.apply_op(&Invert, selection)
    }

    /// Replace the selected pixels by their gray intensity.
    pub fn desaturate(&mut self, selection: &dyn SelectionSource) -> Result<(), LayerError> {
        self.apply_op(&Desaturate, selection)
    }

    /// Desaturate and warm-tint the selected pixels.
    pub fn sepia(&mut self, selection: &dyn SelectionSource) -> Result<(), LayerError> {
        self.apply_op(&Sepia::new(), selection)
    }

    /// Run any pixel op over the selected pixels.
    pub fn apply_op<O: UnaryPixelOp + ?Sized>(
        &mut self,
        op: &O,
        selection: &dyn SelectionSource,
    ) -> Result<(), LayerError> {
        apply_pixel_op(op, &mut self.surface, Some(selection.selection()))?;
        Ok(())
    }

    // --- geometric operations ---

    /// Mirror left-right.
    pub fn flip_horizontal(&mut self, factory: &dyn LayerFactory) -> Result<(), LayerError> {
        self.transform_into_new(GeometricTransform::FlipHorizontal, factory, self.size())
    }

    /// Mirror top-bottom.
    pub fn flip_vertical(&mut self, factory: &dyn LayerFactory) -> Result<(), LayerError> {
        self.transform_into_new(GeometricTransform::FlipVertical, factory, self.size())
    }

    /// Turn half way round.
    pub fn rotate_180(&mut self, factory: &dyn LayerFactory) -> Result<(), LayerError> {
        self.transform_into_new(GeometricTransform::Rotate180, factory, self.size())
    }

    /// Quarter turn clockwise about the canvas center.
    ///
    /// The new surface is the canvas size transposed, not this layer's.
    pub fn rotate_90_cw(
        &mut self,
        factory: &dyn LayerFactory,
        workspace: &dyn WorkspaceSize,
    ) -> Result<(), LayerError> {
        self.apply_transform(GeometricTransform::Rotate90Cw, factory, workspace)
    }

    /// Quarter turn counter-clockwise about the canvas center.
    ///
    /// The new surface is the canvas size transposed, not this layer's.
    pub fn rotate_90_ccw(
        &mut self,
        factory: &dyn LayerFactory,
        workspace: &dyn WorkspaceSize,
    ) -> Result<(), LayerError> {
        self.apply_transform(GeometricTransform::Rotate90Ccw, factory, workspace)
    }

    /// Apply any geometric transform. The selection does not apply.
    pub fn apply_transform(
        &mut self,
        transform: GeometricTransform,
        factory: &dyn LayerFactory,
        workspace: &dyn WorkspaceSize,
    ) -> Result<(), LayerError> {
        let canvas = if transform.swaps_dimensions() {
            let canvas = workspace.image_size();
            if canvas != self.size() {
                warn!(
                    "{transform}: layer {:?} is {} but canvas is {}; sizing result from canvas",
                    self.props.name,
                    self.size(),
                    canvas
                );
            }
            canvas
        } else {
            self.size()
        };
        self.transform_into_new(transform, factory, canvas)
    }

    fn transform_into_new(
        &mut self,
        transform: GeometricTransform,
        factory: &dyn LayerFactory,
        canvas: Size,
    ) -> Result<(), LayerError> {
        let source = self.size();
        let dest_size = transform.destination_size(source, canvas);
        debug!("{transform}: {source} -> {dest_size}");

        let mut dest = factory
            .create_layer_sized("", dest_size.width, dest_size.height)?
            .into_surface();
        let matrix = transform.matrix(source, canvas);
        Painter::new(&mut dest).paint_transformed(&self.surface, &matrix);

        let old = self.replace_surface(dest);
        trace!("{transform}: released {old:?}");
        drop(old);
        Ok(())
    }
}
