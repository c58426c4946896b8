//! Pixel-space to scene-space mapping.
//!
//! Everything here is a pure function of the screen size and camera. The only
//! guarded failure is a zero screen dimension, rejected when [`ScreenMetrics`]
//! is built so that [`pixels_to_scene`] never divides by zero.

use serde::Serialize;

use crate::error::GalleryError;

/// Window size in physical pixels. Both extents are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenMetrics {
    width: f64,
    height: f64,
}

impl ScreenMetrics {
    pub fn new(width: u32, height: u32) -> Result<Self, GalleryError> {
        if width == 0 || height == 0 {
            return Err(GalleryError::ZeroScreen { width, height });
        }
        Ok(Self {
            width: f64::from(width),
            height: f64::from(height),
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }
}

/// Visible extent of the media plane (z = 0) in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportMetrics {
    pub width: f64,
    pub height: f64,
}

/// Perspective camera looking down -z from `distance`.
///
/// `near`/`far` only matter to a renderer; the mapping ignores them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    pub fov_degrees: f64,
    pub near: f64,
    pub far: f64,
    pub distance: f64,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            distance: 5.0,
        }
    }
}

impl CameraParams {
    pub fn viewport_for(&self, screen: &ScreenMetrics) -> ViewportMetrics {
        compute_viewport(self.fov_degrees, screen.aspect(), self.distance)
    }
}

/// Scene-space pair (scale or position).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Frustum slice at `distance` for a vertical field of view in degrees.
pub fn compute_viewport(fov_degrees: f64, aspect: f64, distance: f64) -> ViewportMetrics {
    let fov = fov_degrees.to_radians();
    let height = 2.0 * (fov / 2.0).tan() * distance;
    ViewportMetrics {
        width: height * aspect,
        height,
    }
}

/// Linear pixel → scene mapping along one axis.
#[inline]
pub fn pixels_to_scene(pixel_extent: f64, screen_extent: f64, viewport_extent: f64) -> f64 {
    pixel_extent / screen_extent * viewport_extent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_screen_is_rejected() {
        assert!(matches!(
            ScreenMetrics::new(0, 1080),
            Err(GalleryError::ZeroScreen {
                width: 0,
                height: 1080
            })
        ));
        assert!(ScreenMetrics::new(1920, 0).is_err());
    }

    #[test]
    fn viewport_follows_frustum() {
        let vp = compute_viewport(90.0, 2.0, 1.0);
        // tan(45deg) == 1
        assert!((vp.height - 2.0).abs() < 1e-12);
        assert!((vp.width - 4.0).abs() < 1e-12);
    }

    #[test]
    fn mapping_is_linear() {
        assert!((pixels_to_scene(960.0, 1920.0, 8.0) - 4.0).abs() < 1e-12);
        assert_eq!(pixels_to_scene(0.0, 1920.0, 8.0), 0.0);
        assert!((pixels_to_scene(-480.0, 1920.0, 8.0) + 2.0).abs() < 1e-12);
    }
}
