//! Allocation limits for layer surfaces.
//!
//! [`ResourceLimits`] caps the size of buffers a layer factory will hand out.
//! [`LimitExceeded`] is returned when a check fails, before any pixel memory
//! is touched.

/// Caps on layer surface allocation.
///
/// All fields are optional; `None` means no limit for that resource.
///
/// # Example
///
/// ```
/// use rasterlayer::ResourceLimits;
///
/// let limits = ResourceLimits::none()
///     .with_max_pixels(100_000_000)
///     .with_max_memory(512 * 1024 * 1024);
/// assert!(limits.check_dimensions(4000, 3000).is_ok());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResourceLimits {
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes for a single surface.
    pub max_memory_bytes: Option<u64>,
    /// Maximum surface width in pixels.
    pub max_width: Option<u32>,
    /// Maximum surface height in pixels.
    pub max_height: Option<u32>,
}

impl ResourceLimits {
    /// No limits (all fields `None`).
    pub fn none() -> Self {
        Self::default()
    }

    /// Set maximum total pixels.
    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    /// Set maximum bytes for a single surface.
    pub fn with_max_memory(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Set maximum surface width in pixels.
    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Set maximum surface height in pixels.
    pub fn with_max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Whether any limits are set.
    pub fn has_any(&self) -> bool {
        self.max_pixels.is_some()
            || self.max_memory_bytes.is_some()
            || self.max_width.is_some()
            || self.max_height.is_some()
    }

    /// Check surface dimensions against `max_width`, `max_height`, and `max_pixels`.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_width
            && width > max
        {
            return Err(LimitExceeded::Width { actual: width, max });
        }
        if let Some(max) = self.max_height
            && height > max
        {
            return Err(LimitExceeded::Height {
                actual: height,
                max,
            });
        }
        if let Some(max) = self.max_pixels {
            let pixels = width as u64 * height as u64;
            if pixels > max {
                return Err(LimitExceeded::Pixels {
                    actual: pixels,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Check a byte count against `max_memory_bytes`.
    pub fn check_memory(&self, bytes: u64) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_memory_bytes
            && bytes > max
        {
            return Err(LimitExceeded::Memory { actual: bytes, max });
        }
        Ok(())
    }

    /// Check everything needed to allocate a `width`×`height` surface with
    /// `bytes_per_pixel` bytes each.
    pub fn check_surface(
        &self,
        width: u32,
        height: u32,
        bytes_per_pixel: usize,
    ) -> Result<(), LimitExceeded> {
        self.check_dimensions(width, height)?;
        let bytes = (width as u64)
            .saturating_mul(height as u64)
            .saturating_mul(bytes_per_pixel as u64);
        self.check_memory(bytes)
    }
}

/// A resource limit was exceeded.
///
/// Each variant carries the actual value and the limit that was exceeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LimitExceeded {
    /// Surface width exceeded `max_width`.
    Width {
        /// Actual width.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Surface height exceeded `max_height`.
    Height {
        /// Actual height.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Pixel count exceeded `max_pixels`.
    Pixels {
        /// Actual pixel count.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
    /// Surface size exceeded `max_memory_bytes`.
    Memory {
        /// Size in bytes.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
}

impl core::fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Width { actual, max } => write!(f, "width {actual} exceeds limit {max}"),
            Self::Height { actual, max } => write!(f, "height {actual} exceeds limit {max}"),
            Self::Pixels { actual, max } => {
                write!(f, "pixel count {actual} exceeds limit {max}")
            }
            Self::Memory { actual, max } => {
                write!(f, "memory {actual} bytes exceeds limit {max}")
            }
        }
    }
}

impl core::error::Error for LimitExceeded {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_limits() {
        let limits = ResourceLimits::none();
        assert!(!limits.has_any());
        assert!(limits.check_surface(100_000, 100_000, 4).is_ok());
    }

    #[test]
    fn builder_sets_limits() {
        let limits = ResourceLimits::none()
            .with_max_pixels(1_000_000)
            .with_max_memory(512 * 1024 * 1024);
        assert!(limits.has_any());
        assert_eq!(limits.max_pixels, Some(1_000_000));
        assert_eq!(limits.max_memory_bytes, Some(512 * 1024 * 1024));
        assert!(limits.max_width.is_none());
    }

    #[test]
    fn check_dimensions_width_exceeded() {
        let limits = ResourceLimits::none().with_max_width(1920);
        assert!(limits.check_dimensions(1920, 1080).is_ok());
        let err = limits.check_dimensions(1921, 1080).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Width {
                actual: 1921,
                max: 1920
            }
        );
    }

    #[test]
    fn check_dimensions_height_exceeded() {
        let limits = ResourceLimits::none().with_max_height(1080);
        let err = limits.check_dimensions(1920, 1081).unwrap_err();
        assert!(matches!(err, LimitExceeded::Height { actual: 1081, .. }));
    }

    #[test]
    fn check_dimensions_pixels_exceeded() {
        let limits = ResourceLimits::none().with_max_pixels(1_000_000);
        // 1001×1000 = 1,001,000 > 1,000,000
        let err = limits.check_dimensions(1001, 1000).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Pixels {
                actual: 1_001_000,
                max: 1_000_000
            }
        );
    }

    #[test]
    fn check_surface_counts_bytes() {
        let limits = ResourceLimits::none().with_max_memory(4 * 100 * 100);
        assert!(limits.check_surface(100, 100, 4).is_ok());
        let err = limits.check_surface(101, 100, 4).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Memory {
                actual: 40_400,
                max: 40_000
            }
        );
    }

    #[test]
    fn limit_exceeded_display() {
        use alloc::format;
        let err = LimitExceeded::Width {
            actual: 5000,
            max: 4096,
        };
        assert_eq!(format!("{err}"), "width 5000 exceeds limit 4096");

        let err = LimitExceeded::Memory {
            actual: 2048,
            max: 1024,
        };
        assert_eq!(format!("{err}"), "memory 2048 bytes exceeds limit 1024");
    }
}
