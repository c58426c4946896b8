use thiserror::Error;

/// Library error type for media-wall operations.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// A screen dimension of zero makes every pixel-to-scene mapping undefined.
    #[error("screen dimensions must be non-zero (got {width}x{height})")]
    ZeroScreen { width: u32, height: u32 },

    /// The configured media library is missing or not a directory.
    #[error("invalid media library: {0}")]
    BadLibrary(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}
