use std::path::PathBuf;
use std::time::Duration;

use media_wall::GalleryError;
use media_wall::config::Configuration;
use media_wall::scroll::WheelDirection;

#[test]
fn empty_document_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.media_library_path, None);
    assert_eq!(cfg.placeholder_count, 12);
    assert_eq!((cfg.window.width, cfg.window.height), (1280, 720));
    assert!(!cfg.window.fullscreen);
    assert!((cfg.camera.fov_degrees - 45.0).abs() < f64::EPSILON);
    assert!((cfg.camera.distance - 5.0).abs() < f64::EPSILON);
    assert!((cfg.scroll.ease - 0.05).abs() < f64::EPSILON);
    assert!((cfg.scroll.autoplay_speed - 2.0).abs() < f64::EPSILON);
    assert_eq!(cfg.scroll.wheel_direction, WheelDirection::Inverted);
    assert_eq!(cfg.layout.columns, 3);
    assert_eq!(cfg.texture_max_dim, 1024);
    assert_eq!(cfg.frame_interval, Duration::from_millis(16));
    assert!(cfg.validated().is_ok());
}

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
media-library-path: "/photos"
placeholder-count: 4
window:
  width: 800
  height: 600
  title: "Wall"
  fullscreen: true
camera:
  fov-degrees: 60
  distance: 3.5
scroll:
  ease: 0.1
  autoplay-speed: 0
  wheel-gain: 1.5
  wheel-direction: natural
  drag-gain: 3
  strength-gain: 4
layout:
  columns: 2
  gap-px: 10
  padding-px: 20
  fallback-aspect: 0.75
texture-max-dim: 512
frame-interval: 33ms
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.media_library_path, Some(PathBuf::from("/photos")));
    assert_eq!(cfg.placeholder_count, 4);
    assert_eq!(cfg.window.title, "Wall");
    assert!(cfg.window.fullscreen);
    assert_eq!(cfg.scroll.wheel_direction, WheelDirection::Natural);
    assert_eq!(cfg.frame_interval, Duration::from_millis(33));

    let settings = cfg.gallery_settings();
    assert!((settings.camera.fov_degrees - 60.0).abs() < f64::EPSILON);
    assert!((settings.scroll.base_speed).abs() < f64::EPSILON);
    assert!((settings.scroll.signed_wheel_gain() - 1.5).abs() < f64::EPSILON);
    assert!((settings.strength_gain - 4.0).abs() < f64::EPSILON);

    let layout = cfg.layout.settings();
    assert_eq!(layout.columns, 2);
    assert!((layout.fallback_aspect - 0.75).abs() < f64::EPSILON);
    assert!(cfg.validated().is_ok());
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let cfg: Configuration = serde_yaml::from_str("scroll:\n  ease: 0.2\n").unwrap();
    assert!((cfg.scroll.ease - 0.2).abs() < f64::EPSILON);
    assert!((cfg.scroll.drag_gain - 2.0).abs() < f64::EPSILON);
    assert!((cfg.scroll.wheel_gain - 0.5).abs() < f64::EPSILON);
}

fn rejects(yaml: &str) -> String {
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    format!("{:#}", cfg.validated().unwrap_err())
}

#[test]
fn validation_rejects_out_of_range_values() {
    assert!(rejects("scroll:\n  ease: 1.0\n").contains("scroll.ease"));
    assert!(rejects("scroll:\n  ease: 0\n").contains("scroll.ease"));
    assert!(rejects("camera:\n  fov-degrees: 180\n").contains("fov-degrees"));
    assert!(rejects("camera:\n  distance: 0\n").contains("camera.distance"));
    assert!(rejects("camera:\n  near: 10\n  far: 5\n").contains("camera.near"));
    assert!(rejects("layout:\n  columns: 0\n").contains("layout.columns"));
    assert!(rejects("window:\n  width: 0\n").contains("window.width"));
    assert!(rejects("texture-max-dim: 0\n").contains("texture-max-dim"));
    assert!(rejects("frame-interval: 0s\n").contains("frame-interval"));
    assert!(rejects("scroll:\n  drag-gain: .inf\n").contains("finite"));
}

#[test]
fn unknown_wheel_direction_is_a_parse_error() {
    let parsed: Result<Configuration, _> = serde_yaml::from_str("scroll:\n  wheel-direction: sideways\n");
    assert!(parsed.is_err());
}

#[test]
fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wall.yaml");
    std::fs::write(&path, "placeholder-count: 3\nframe-interval: 1s\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.placeholder_count, 3);
    assert_eq!(cfg.frame_interval, Duration::from_secs(1));
}

#[test]
fn missing_file_and_bad_yaml_map_to_library_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = Configuration::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, GalleryError::Io(_)));

    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "window: [1, 2\n").unwrap();
    let err = Configuration::from_yaml_file(&path).unwrap_err();
    assert!(matches!(err, GalleryError::Config(_)));
}
