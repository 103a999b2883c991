//! Example: build a scale-space pyramid from an image file and dump it.
//!
//! Every scale image is written as `o{octave}_s{level}.png` and every DoG
//! image as `o{octave}_dog{index}.png` into the output directory. DoG values
//! are signed and small, so they are remapped to `0.5 + gain * v` before
//! encoding. A JSON summary with octave sizes and effective blur is written
//! alongside.
//!
//! Run from the workspace root:
//!   cargo run -p scale-space --features io --example pyramid_dump -- --help
//!   cargo run -p scale-space --features io --example pyramid_dump -- --input photo.png

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use scale_space::io::{load_image, load_luma, save_image};
use scale_space::{DEFAULT_SIGMA, OctaveCount, PixelBuffer, ScaleSpaceConfig, ScaleSpacePyramid};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Build a Gaussian/DoG pyramid and write every level as PNG")]
struct Args {
    /// Input image (any format the `image` crate decodes)
    #[arg(long)]
    input: PathBuf,

    /// Output directory (default: <input stem>_pyramid next to input)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Number of octaves; derived from the image size when omitted
    #[arg(long)]
    octaves: Option<usize>,

    /// Blur applied between consecutive levels
    #[arg(long, default_value_t = DEFAULT_SIGMA)]
    sigma: f32,

    /// Keep colour channels instead of reducing to luma
    #[arg(long)]
    color: bool,

    /// Gain applied to DoG values before encoding
    #[arg(long, default_value_t = 8.0)]
    dog_gain: f32,
}

#[derive(Serialize)]
struct LevelDto {
    level: usize,
    effective_sigma: f32,
}

#[derive(Serialize)]
struct OctaveDto {
    octave: usize,
    width: usize,
    height: usize,
    scale_factor: f32,
    levels: Vec<LevelDto>,
}

#[derive(Serialize)]
struct Summary {
    input: String,
    sigma: f32,
    elapsed_ms: f64,
    octaves: Vec<OctaveDto>,
}

fn default_out_dir(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let dir = input.parent().unwrap_or(Path::new("."));
    dir.join(format!("{stem}_pyramid"))
}

fn remap_dog(dog: &PixelBuffer, gain: f32) -> Result<PixelBuffer> {
    let (w, h, c) = dog.shape();
    let data = dog.data().iter().map(|&v| 0.5 + gain * v).collect();
    PixelBuffer::from_vec(w, h, c, data).context("remapping DoG image")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let out_dir = args
        .out
        .clone()
        .unwrap_or_else(|| default_out_dir(&args.input));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let img = if args.color {
        load_image(&args.input)
    } else {
        load_luma(&args.input)
    }
    .with_context(|| format!("loading {}", args.input.display()))?;
    info!(
        width = img.width(),
        height = img.height(),
        channels = img.channels(),
        "loaded input"
    );

    let config = ScaleSpaceConfig::new()
        .with_octaves(args.octaves.map_or(OctaveCount::Auto, OctaveCount::Fixed))
        .with_sigma(args.sigma);

    let t0 = Instant::now();
    let pyr = ScaleSpacePyramid::build_with_config(&img, &config).context("building pyramid")?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;
    info!(octaves = pyr.octave_count(), elapsed_ms, "pyramid built");

    let mut octaves = Vec::with_capacity(pyr.octave_count());
    for octave in pyr.octaves() {
        let o = octave.index();
        for (level, scale) in octave.scale_images().iter().enumerate() {
            let path = out_dir.join(format!("o{o}_s{level}.png"));
            save_image(&path, scale).with_context(|| format!("writing {}", path.display()))?;
        }
        for (i, dog) in octave.dog_images().iter().enumerate() {
            let path = out_dir.join(format!("o{o}_dog{i}.png"));
            save_image(&path, &remap_dog(dog, args.dog_gain)?)
                .with_context(|| format!("writing {}", path.display()))?;
        }

        let (width, height) = octave.dimensions();
        let levels = (0..octave.scale_images().len())
            .filter_map(|level| {
                pyr.effective_sigma(o, level).map(|effective_sigma| LevelDto {
                    level,
                    effective_sigma,
                })
            })
            .collect();
        octaves.push(OctaveDto {
            octave: o,
            width,
            height,
            scale_factor: octave.scale_factor(),
            levels,
        });
    }

    let summary = Summary {
        input: args.input.display().to_string(),
        sigma: pyr.base_sigma(),
        elapsed_ms,
        octaves,
    };
    let summary_path = out_dir.join("summary.json");
    let file = std::fs::File::create(&summary_path)
        .with_context(|| format!("creating {}", summary_path.display()))?;
    serde_json::to_writer_pretty(file, &summary)
        .with_context(|| format!("writing JSON to {}", summary_path.display()))?;

    println!(
        "{} octaves written to {} ({elapsed_ms:.2} ms)",
        pyr.octave_count(),
        out_dir.display()
    );
    Ok(())
}
