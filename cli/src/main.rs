//! Demo binary: animate a progress bar and optionally dump PNG frames.
//!
//! Runs the widget against the tokio scheduler with the same cadence the
//! auto-fill timer uses, rendering one frame per tick until the bar is
//! full.

mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use fillbar_core::{
    BarConfig, Color, Drawable, ProgressBar, SharedProgressBar, Surface, TextureAtlas,
    TokioScheduler,
};
use tracing::{info, warn};

/// Padding between the bar and the surface edge
const PADDING: f32 = 8.0;

#[derive(Debug, Parser)]
#[command(name = "fillbar", about = "Animate a textured progress bar")]
struct Args {
    /// Bar width in pixels
    #[arg(long, default_value_t = 200.0)]
    width: f32,

    /// Bar height in pixels
    #[arg(long, default_value_t = 20.0)]
    height: f32,

    /// Tick interval in milliseconds
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,

    /// Progress added per tick
    #[arg(long, default_value_t = 0.05)]
    step: f32,

    /// ZIP archive of named PNG textures (expects `track.png` / `fill.png`)
    #[arg(long)]
    atlas: Option<PathBuf>,

    /// TOML file overriding the bar size
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory to write numbered PNG frames into
    #[arg(long)]
    frames: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    logging::init();
    let args = Args::parse();

    if args.step <= 0.0 {
        warn!(step = args.step, "step must be positive; nothing to animate");
        return;
    }

    let config = match &args.config {
        Some(path) => match BarConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "falling back to default bar config");
                BarConfig::default()
            }
        },
        None => BarConfig {
            width: args.width,
            height: args.height,
        },
    };

    let atlas = args.atlas.as_deref().map(|path| match TextureAtlas::load_zip(path) {
        Ok(atlas) => atlas,
        Err(err) => {
            warn!(error = %err, "falling back to built-in textures");
            TextureAtlas::new()
        }
    });

    let scheduler = Arc::new(TokioScheduler::new(tokio::runtime::Handle::current()));
    let bar = ProgressBar::from_config(scheduler, atlas.as_ref(), &config)
        .with_position(PADDING, PADDING);
    let bar = SharedProgressBar::new(bar);

    let interval = Duration::from_millis(args.interval_ms.max(1));
    if let Err(err) = bar.start_auto_fill(interval, args.step) {
        warn!(error = %err, "could not start auto-fill");
        return;
    }

    if let Some(dir) = &args.frames {
        if let Err(err) = std::fs::create_dir_all(dir) {
            warn!(error = %err, dir = %dir.display(), "could not create frame directory");
        }
    }

    let surface_width = (config.width + PADDING * 2.0).ceil() as u32;
    let surface_height = (config.height + PADDING * 2.0).ceil() as u32;
    let mut surface = Surface::new(surface_width, surface_height);
    let mut frame_index = 0u32;

    info!(
        width = config.width,
        height = config.height,
        interval_ms = args.interval_ms,
        step = args.step,
        "animating"
    );

    loop {
        tokio::time::sleep(interval).await;

        let fraction = {
            let bar = bar.lock();
            surface.clear(Color::from_rgba8(18, 18, 22, 255));
            surface.fill_rounded_rect(
                2.0,
                2.0,
                surface_width as f32 - 4.0,
                surface_height as f32 - 4.0,
                6.0,
                Color::from_rgba8(30, 30, 30, 180),
            );
            bar.draw(&mut surface);
            bar.fraction()
        };

        info!(fraction, frame = frame_index, "tick");

        if let Some(dir) = &args.frames {
            if let Err(err) = write_frame(dir, frame_index, &surface) {
                warn!(error = %err, frame = frame_index, "failed to write frame");
            }
        }
        frame_index += 1;

        if fraction >= 1.0 {
            break;
        }
    }

    info!(frames = frame_index, "bar filled");
}

/// Encode the surface as a numbered PNG frame
fn write_frame(dir: &Path, index: u32, surface: &Surface) -> Result<(), png::EncodingError> {
    let path = dir.join(format!("frame-{index:04}.png"));
    let file = std::fs::File::create(&path)?;
    let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), surface.width(), surface.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(surface.data())?;
    writer.finish()?;
    Ok(())
}
