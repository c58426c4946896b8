use std::fs;
use std::path::Path;

use image::{Rgba, RgbaImage};
use media_wall::GalleryError;
use media_wall::gallery::{GalleryEngine, GallerySettings};
use media_wall::layout::{LayoutElement, LayoutSettings, LayoutSource};
use media_wall::scan::MediaLibrary;
use media_wall::viewport::ScreenMetrics;

fn png(path: &Path, width: u32, height: u32) {
    RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
        .save(path)
        .unwrap();
}

#[test]
fn scan_finds_images_sorted_and_skips_hidden_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("nested/deeper")).unwrap();
    fs::create_dir_all(root.join(".cache")).unwrap();

    png(&root.join("b.png"), 40, 20);
    png(&root.join("a.PNG"), 10, 30);
    png(&root.join("nested/deeper/c.png"), 8, 8);
    png(&root.join(".cache/hidden.png"), 8, 8);
    fs::write(root.join("notes.txt"), "not an image").unwrap();
    fs::write(root.join("broken.jpg"), b"\xff\xd8garbage").unwrap();

    let library = MediaLibrary::scan(root).unwrap();
    let names: Vec<_> = library
        .entries()
        .iter()
        .map(|e| e.path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["a.PNG", "b.png", "broken.jpg", "nested/deeper/c.png"]);

    let elements: Vec<_> = library.entries().iter().map(|e| e.element).collect();
    assert_eq!(
        elements,
        vec![
            LayoutElement::Image {
                width: 10,
                height: 30
            },
            LayoutElement::Image {
                width: 40,
                height: 20
            },
            LayoutElement::Missing,
            LayoutElement::Image {
                width: 8,
                height: 8
            },
        ]
    );
    assert_eq!(library.path(1), Some(root.join("b.png").as_path()));
}

#[test]
fn scan_rejects_files_and_missing_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("single.png");
    png(&file, 2, 2);
    assert!(matches!(MediaLibrary::scan(&file), Err(GalleryError::BadLibrary(_))));
    assert!(matches!(
        MediaLibrary::scan(dir.path().join("nope")),
        Err(GalleryError::BadLibrary(_))
    ));
}

#[test]
fn empty_library_builds_an_empty_gallery() {
    let dir = tempfile::tempdir().unwrap();
    let library = MediaLibrary::scan(dir.path()).unwrap();
    assert!(library.is_empty());
    let layout = library.layout(LayoutSettings::default());
    let engine = GalleryEngine::init(&layout, 1280, 720, GallerySettings::default()).unwrap();
    assert!(engine.items().is_empty());
}

#[test]
fn scanned_layout_uses_natural_aspect_and_drops_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    png(&dir.path().join("1-tall.png"), 10, 20);
    png(&dir.path().join("2-wide.png"), 20, 10);
    fs::write(dir.path().join("3-bad.png"), b"nope").unwrap();

    let library = MediaLibrary::scan(dir.path()).unwrap();
    assert_eq!(library.len(), 3);

    let settings = LayoutSettings {
        columns: 2,
        gap_px: 0.0,
        padding_px: 0.0,
        fallback_aspect: 1.0,
    };
    let layout = library.layout(settings);
    let screen = ScreenMetrics::new(400, 300).unwrap();
    let m = layout.measure(&screen);
    let tall = m.elements[0].unwrap();
    let wide = m.elements[1].unwrap();
    assert_eq!((tall.width, tall.height), (200.0, 400.0));
    assert_eq!((wide.left, wide.width, wide.height), (200.0, 200.0, 100.0));
    assert_eq!(m.elements[2], None);
    assert_eq!(m.container.height, 400.0);
    assert_eq!(layout.image_size(1), Some([20, 10]));

    let engine = GalleryEngine::init(&layout, 400, 300, GallerySettings::default()).unwrap();
    assert_eq!(engine.items().len(), 2);
    assert_eq!(engine.items()[1].frame().image_size, Some([20, 10]));
}
