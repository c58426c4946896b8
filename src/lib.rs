pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod gallery;
pub mod input;
pub mod layout;
pub mod media;
pub mod render;
pub mod scan;
pub mod scroll;
pub mod viewport;

pub use error::GalleryError;
pub use gallery::{GalleryEngine, GallerySettings, PlaneSink};
