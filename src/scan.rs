//! Media library discovery.
//!
//! Walks a directory for image files and reads each file's natural size from
//! its header, so the column layout can be built before anything is decoded.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::GalleryError;
use crate::layout::{ColumnLayout, LayoutElement, LayoutSettings};

const SUPPORTED_EXTS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Return `true` if `path` has an extension the decoder understands.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTS.iter().any(|e| *e == ext)
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryEntry {
    pub path: PathBuf,
    pub element: LayoutElement,
}

/// Ordered image list; entry `i` is layout element `i` and texture `i`.
#[derive(Debug, Clone, Default)]
pub struct MediaLibrary {
    entries: Vec<LibraryEntry>,
}

impl MediaLibrary {
    /// Scan `root` recursively. Files are sorted by path so the wall is stable
    /// between runs.
    ///
    /// # Errors
    /// Returns [`GalleryError::BadLibrary`] if `root` is missing or not a directory.
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn scan(root: impl AsRef<Path>) -> Result<Self, GalleryError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(GalleryError::BadLibrary(root.display().to_string()));
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !should_skip_dir(e))
            .flatten()
            .filter(|e| e.file_type().is_file() && is_supported_image(e.path()))
            .map(DirEntry::into_path)
            .collect();
        paths.sort();

        let entries: Vec<LibraryEntry> = paths
            .into_iter()
            .map(|path| {
                let element = match image::image_dimensions(&path) {
                    Ok((width, height)) => LayoutElement::Image { width, height },
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "unreadable image header");
                        LayoutElement::Missing
                    }
                };
                debug!(path = %path.display(), ?element, "library entry");
                LibraryEntry { path, element }
            })
            .collect();

        let unreadable = entries
            .iter()
            .filter(|e| e.element == LayoutElement::Missing)
            .count();
        info!(images = entries.len(), unreadable, "media library scanned");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self, index: usize) -> Option<&Path> {
        self.entries.get(index).map(|e| e.path.as_path())
    }

    pub fn layout(&self, settings: LayoutSettings) -> ColumnLayout {
        ColumnLayout::new(settings, self.entries.iter().map(|e| e.element).collect())
    }
}

fn should_skip_dir(entry: &DirEntry) -> bool {
    // Never skip the root; tempfile roots can be dot-dirs.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|n| n.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert!(is_supported_image(Path::new("a/b/photo.JPG")));
        assert!(is_supported_image(Path::new("x.webp")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("no_extension")));
    }

    #[test]
    fn missing_root_is_bad_library() {
        let err = MediaLibrary::scan("/definitely/not/here").unwrap_err();
        assert!(matches!(err, GalleryError::BadLibrary(_)));
    }
}
