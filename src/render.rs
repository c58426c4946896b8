pub mod loader;
pub mod planes;
pub mod viewer;

pub use viewer::run_windowed;
