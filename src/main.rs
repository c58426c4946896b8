use std::io::{self, BufWriter, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use media_wall::clock::{FixedStepClock, FrameReport, drive};
use media_wall::config::Configuration;
use media_wall::gallery::GalleryEngine;
use media_wall::input::NoInput;
use media_wall::render;
use media_wall::scan::MediaLibrary;

#[derive(Debug, Parser)]
#[command(
    name = "media-wall",
    version,
    about = "Scroll-driven, endlessly looping wall of media planes"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Run N frames without a window and print one JSON object per frame
    #[arg(long = "frames", value_name = "N")]
    frames: Option<u64>,
    /// Increase log verbosity when RUST_LOG is unset (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "info",
        1 => "debug,wgpu=warn,winit=warn",
        _ => "trace,wgpu=warn,winit=warn",
    };
    // logs go to stderr; stdout carries headless frames
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn run_headless(cfg: &Configuration, library: Option<&MediaLibrary>, frames: u64) -> Result<()> {
    let layout = cfg.layout_for(library);
    let mut engine = GalleryEngine::init(
        &layout,
        cfg.window.width,
        cfg.window.height,
        cfg.gallery_settings(),
    )
    .context("failed to initialize gallery")?;
    let mut clock = FixedStepClock::new(cfg.frame_interval, frames);

    let mut out = BufWriter::new(io::stdout().lock());
    let mut write_err: Option<io::Error> = None;
    let ran = drive(&mut engine, &mut clock, &mut NoInput, |tick, scroll, planes| {
        let report = FrameReport::new(tick, scroll, planes);
        let written = serde_json::to_writer(&mut out, &report)
            .map_err(io::Error::from)
            .and_then(|()| out.write_all(b"\n"));
        match written {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => {
                write_err = Some(err);
                ControlFlow::Break(())
            }
        }
    });
    if let Some(err) = write_err {
        return Err(err).context("failed to write frame report");
    }
    out.flush().context("failed to flush frame reports")?;
    info!(frames = ran, "headless run finished");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        frames,
        verbose,
    } = Args::parse();
    init_tracing(verbose);

    let cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    tracing::debug!("Loaded configuration from {}:\n{:#?}", config.display(), cfg);

    let library = match cfg.media_library_path.as_ref() {
        Some(path) => Some(
            MediaLibrary::scan(path)
                .with_context(|| format!("failed to scan media library {}", path.display()))?,
        ),
        None => {
            info!(count = cfg.placeholder_count, "no media library configured; using placeholders");
            None
        }
    };

    if let Some(frames) = frames {
        return run_headless(&cfg, library.as_ref(), frames);
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    // winit needs the main thread; this blocks until the window closes or cancellation
    render::run_windowed(cfg, library, cancel.clone()).context("viewer failed")?;
    cancel.cancel();
    Ok(())
}
