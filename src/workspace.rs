//! A canvas that hands out layers.
//!
//! [`Workspace`] is the reference implementation of the three layer
//! collaborators: it allocates surfaces within [`ResourceLimits`], reports
//! the canvas size, and holds the active selection.

use alloc::boxed::Box;
use core::fmt;

use log::debug;

use crate::buffer::{PixelBuffer, PixelDescriptor};
use crate::layer::{
    Layer, LayerError, LayerFactory, LayerProperties, SelectionSource, WorkspaceSize,
};
use crate::limits::ResourceLimits;
use crate::region::{ClipRegion, Everything};
use crate::transform::Size;

/// Canvas size, allocation policy and selection for a document.
pub struct Workspace {
    size: Size,
    limits: ResourceLimits,
    descriptor: PixelDescriptor,
    selection: Option<Box<dyn ClipRegion>>,
}

impl Workspace {
    /// A canvas of `width`×`height` with no limits and no selection.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            limits: ResourceLimits::none(),
            descriptor: PixelDescriptor::default(),
            selection: None,
        }
    }

    /// Cap the size of surfaces this workspace allocates.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Pixel format of newly allocated surfaces.
    pub fn with_descriptor(mut self, descriptor: PixelDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Limits applied to every surface allocation.
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Format given to new surfaces.
    pub fn descriptor(&self) -> PixelDescriptor {
        self.descriptor
    }

    /// Change the canvas size. Existing layers are not touched.
    pub fn resize_canvas(&mut self, width: u32, height: u32) {
        self.size = Size::new(width, height);
    }

    /// Make `region` the active selection.
    pub fn set_selection(&mut self, region: impl ClipRegion + 'static) {
        self.selection = Some(Box::new(region));
    }

    /// Drop the active selection; color operations then cover everything.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Whether a selection is active.
    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// Allocate a surface after checking the limits.
    fn allocate(&self, width: u32, height: u32) -> Result<PixelBuffer, LayerError> {
        self.limits
            .check_surface(width, height, self.descriptor.bytes_per_pixel())?;
        Ok(PixelBuffer::new(width, height, self.descriptor)?)
    }
}

impl LayerFactory for Workspace {
    fn create_layer(&self) -> Result<Layer, LayerError> {
        self.create_layer_sized("", self.size.width, self.size.height)
    }

    fn create_layer_sized(&self, name: &str, width: u32, height: u32) -> Result<Layer, LayerError> {
        debug!("allocating {width}x{height} layer {name:?}");
        let surface = self.allocate(width, height)?;
        Ok(Layer::with_properties_struct(
            surface,
            LayerProperties::new().with_name(name),
        ))
    }
}

impl WorkspaceSize for Workspace {
    fn image_size(&self) -> Size {
        self.size
    }
}

impl SelectionSource for Workspace {
    fn selection(&self) -> &dyn ClipRegion {
        match &self.selection {
            Some(region) => &**region,
            None => &Everything,
        }
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("size", &self.size)
            .field("limits", &self.limits)
            .field("descriptor", &self.descriptor)
            .field("has_selection", &self.selection.is_some())
            .finish()
    }
}
