use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, ensure};
use serde::Deserialize;

use crate::error::GalleryError;
use crate::gallery::GallerySettings;
use crate::layout::{ColumnLayout, LayoutSettings};
use crate::scan::MediaLibrary;
use crate::scroll::{ScrollSettings, WheelDirection};
use crate::viewport::CameraParams;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Directory scanned recursively for images. Without it the wall shows placeholders.
    pub media_library_path: Option<PathBuf>,
    /// Number of placeholder planes when no library is configured.
    pub placeholder_count: usize,
    pub window: WindowOptions,
    pub camera: CameraOptions,
    pub scroll: ScrollOptions,
    pub layout: LayoutOptions,
    /// Longest edge, in pixels, a decoded texture is scaled down to.
    pub texture_max_dim: u32,
    /// Step of the headless frame clock.
    #[serde(with = "humantime_serde")]
    pub frame_interval: Duration,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, GalleryError> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        self.window.validate()?;
        self.camera.validate()?;
        self.scroll.validate()?;
        self.layout.validate()?;
        ensure!(
            self.texture_max_dim > 0,
            "texture-max-dim must be greater than zero"
        );
        ensure!(
            !self.frame_interval.is_zero(),
            "frame-interval must be positive"
        );
        Ok(self)
    }

    pub fn gallery_settings(&self) -> GallerySettings {
        GallerySettings {
            camera: self.camera.params(),
            scroll: self.scroll.settings(),
            strength_gain: self.scroll.strength_gain,
        }
    }

    /// Column layout over the scanned library, or placeholders without one.
    pub fn layout_for(&self, library: Option<&MediaLibrary>) -> ColumnLayout {
        let settings = self.layout.settings();
        match library {
            Some(library) => library.layout(settings),
            None => ColumnLayout::placeholders(settings, self.placeholder_count),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            media_library_path: None,
            placeholder_count: 12,
            window: WindowOptions::default(),
            camera: CameraOptions::default(),
            scroll: ScrollOptions::default(),
            layout: LayoutOptions::default(),
            texture_max_dim: 1024,
            frame_interval: Duration::from_millis(16),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WindowOptions {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub fullscreen: bool,
}

impl WindowOptions {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.width > 0 && self.height > 0,
            "window.width and window.height must be greater than zero"
        );
        Ok(())
    }
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Media Wall".to_string(),
            fullscreen: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CameraOptions {
    /// Vertical field of view.
    pub fov_degrees: f64,
    pub near: f64,
    pub far: f64,
    /// Distance from the camera to the media plane.
    pub distance: f64,
}

impl CameraOptions {
    pub fn params(&self) -> CameraParams {
        CameraParams {
            fov_degrees: self.fov_degrees,
            near: self.near,
            far: self.far,
            distance: self.distance,
        }
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.fov_degrees > 0.0 && self.fov_degrees < 180.0,
            "camera.fov-degrees must be within (0, 180)"
        );
        ensure!(self.distance > 0.0, "camera.distance must be positive");
        ensure!(
            self.near > 0.0 && self.near < self.far,
            "camera.near must be positive and below camera.far"
        );
        Ok(())
    }
}

impl Default for CameraOptions {
    fn default() -> Self {
        let params = CameraParams::default();
        Self {
            fov_degrees: params.fov_degrees,
            near: params.near,
            far: params.far,
            distance: params.distance,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ScrollOptions {
    pub ease: f64,
    /// Drift added to the target each frame while not dragging; 0 disables autoplay.
    pub autoplay_speed: f64,
    pub wheel_gain: f64,
    pub wheel_direction: WheelDirection,
    pub drag_gain: f64,
    /// Multiplier for the per-frame distortion signal.
    pub strength_gain: f64,
}

impl ScrollOptions {
    pub fn settings(&self) -> ScrollSettings {
        ScrollSettings {
            ease: self.ease,
            base_speed: self.autoplay_speed,
            wheel_gain: self.wheel_gain,
            wheel_direction: self.wheel_direction,
            drag_gain: self.drag_gain,
        }
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.ease > 0.0 && self.ease < 1.0,
            "scroll.ease must be within (0, 1)"
        );
        ensure!(
            self.autoplay_speed.is_finite() && self.autoplay_speed >= 0.0,
            "scroll.autoplay-speed must be a non-negative number"
        );
        ensure!(
            self.wheel_gain.is_finite() && self.drag_gain.is_finite(),
            "scroll gains must be finite"
        );
        ensure!(
            self.strength_gain.is_finite(),
            "scroll.strength-gain must be finite"
        );
        Ok(())
    }
}

impl Default for ScrollOptions {
    fn default() -> Self {
        let settings = ScrollSettings::default();
        Self {
            ease: settings.ease,
            autoplay_speed: settings.base_speed,
            wheel_gain: settings.wheel_gain,
            wheel_direction: settings.wheel_direction,
            drag_gain: settings.drag_gain,
            strength_gain: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LayoutOptions {
    pub columns: usize,
    pub gap_px: f64,
    pub padding_px: f64,
    /// Height / width for media whose size is unknown.
    pub fallback_aspect: f64,
}

impl LayoutOptions {
    pub fn settings(&self) -> LayoutSettings {
        LayoutSettings {
            columns: self.columns,
            gap_px: self.gap_px,
            padding_px: self.padding_px,
            fallback_aspect: self.fallback_aspect,
        }
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.columns >= 1, "layout.columns must be at least 1");
        ensure!(
            self.gap_px >= 0.0 && self.padding_px >= 0.0,
            "layout.gap-px and layout.padding-px must not be negative"
        );
        ensure!(
            self.fallback_aspect > 0.0,
            "layout.fallback-aspect must be positive"
        );
        Ok(())
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        let settings = LayoutSettings::default();
        Self {
            columns: settings.columns,
            gap_px: settings.gap_px,
            padding_px: settings.padding_px,
            fallback_aspect: settings.fallback_aspect,
        }
    }
}
