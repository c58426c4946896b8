//! Request-driven background texture loader.
//! Receives decode jobs (plane index + path), decodes and downscales off-thread,
//! and returns RGBA8 frames without blocking the render loop.
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use image::imageops::FilterType;
use tracing::{debug, warn};

/// Message sent to the background loader thread.
#[derive(Debug)]
pub enum LoaderMsg {
    /// Decode the image for plane `index`.
    Decode { index: usize, path: PathBuf },
    /// Stop the loader.
    Quit,
}

/// An image resized on CPU and ready for GPU upload.
pub struct PreparedPlaneImage {
    pub index: usize,
    /// Natural size of the source before downscaling.
    pub natural: [u32; 2],
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixel buffer.
    pub pixels: Vec<u8>,
}

impl std::fmt::Debug for PreparedPlaneImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedPlaneImage")
            .field("index", &self.index)
            .field("natural", &self.natural)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Largest size with the same aspect that fits in `max_dim` on both axes.
/// Images already inside the bound are left alone.
pub fn fit_within(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_dim || longest == 0 {
        return (width, height);
    }
    let ratio = f64::from(max_dim) / f64::from(longest);
    let scaled = |v: u32| ((f64::from(v) * ratio).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Decode `path` and downscale it to `max_dim`.
pub fn prepare(
    index: usize,
    path: &Path,
    max_dim: u32,
) -> Result<PreparedPlaneImage, image::ImageError> {
    let img = image::open(path)?;
    let natural = [img.width(), img.height()];
    let (w, h) = fit_within(natural[0], natural[1], max_dim);
    let img = if (w, h) == (natural[0], natural[1]) {
        img
    } else {
        img.resize_exact(w, h, FilterType::Triangle)
    };
    Ok(PreparedPlaneImage {
        index,
        natural,
        width: w,
        height: h,
        pixels: img.to_rgba8().into_vec(),
    })
}

/// Spawn the request-driven loader. It exits on `Quit` or when either
/// channel end is dropped.
pub fn spawn_loader(
    rx: Receiver<LoaderMsg>,
    tx: Sender<PreparedPlaneImage>,
    max_dim: u32,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            match msg {
                LoaderMsg::Quit => break,
                LoaderMsg::Decode { index, path } => match prepare(index, &path, max_dim) {
                    Ok(prepared) => {
                        debug!(index, width = prepared.width, height = prepared.height, "texture decoded");
                        if tx.send(prepared).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(index, path = %path.display(), error = %err, "failed to decode image");
                    }
                },
            }
        }
        debug!("loader thread stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_within_keeps_aspect() {
        assert_eq!(fit_within(4000, 2000, 1000), (1000, 500));
        assert_eq!(fit_within(300, 900, 300), (100, 300));
        assert_eq!(fit_within(640, 480, 1024), (640, 480));
        assert_eq!(fit_within(5000, 1, 100), (100, 1));
    }

    #[test]
    fn loader_decodes_and_reports_failures_silently() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        image::RgbaImage::from_pixel(64, 32, image::Rgba([255, 0, 0, 255]))
            .save(&good)
            .unwrap();
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not a png").unwrap();

        let (tx_req, rx_req) = crossbeam_channel::unbounded();
        let (tx_res, rx_res) = crossbeam_channel::unbounded();
        let handle = spawn_loader(rx_req, tx_res, 16);
        tx_req.send(LoaderMsg::Decode { index: 1, path: bad }).unwrap();
        tx_req.send(LoaderMsg::Decode { index: 0, path: good }).unwrap();
        tx_req.send(LoaderMsg::Quit).unwrap();
        handle.join().unwrap();

        let out: Vec<_> = rx_res.try_iter().collect();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].index, 0);
        assert_eq!(out[0].natural, [64, 32]);
        assert_eq!((out[0].width, out[0].height), (16, 8));
        assert_eq!(out[0].pixels.len(), 16 * 8 * 4);
    }
}
