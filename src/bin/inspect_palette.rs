use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colourscale::colourmaps::{ColourMap, DEFAULT_SAMPLES};

/// Print a calibrated colour map: its stops, a few sampled values and the
/// colour bar ticks
#[derive(Parser, Debug)]
#[command(name = "inspect_palette", version)]
struct Args {
    /// Palette text or preset name
    palette: String,

    /// Data range minimum
    #[arg(long, requires = "max", allow_negative_numbers = true)]
    min: Option<f32>,

    /// Data range maximum
    #[arg(long, requires = "min", allow_negative_numbers = true)]
    max: Option<f32>,

    /// Logarithmic scale
    #[arg(long)]
    log: bool,

    /// Discrete scale
    #[arg(long)]
    discrete: bool,

    /// Print the map as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write the palette texture to this PNG file
    #[arg(long)]
    png: Option<PathBuf>,

    /// Sample table size
    #[arg(short, long, default_value_t = DEFAULT_SAMPLES)]
    samples: usize,

    /// Number of interior colour bar ticks
    #[arg(long, default_value_t = 3)]
    ticks: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.samples < 2 {
        bail!("--samples must be at least 2, got {}", args.samples);
    }

    let mut map = ColourMap::with_samples("inspect", args.samples);
    if !map.load_palette(&args.palette) {
        eprintln!("warning: palette has fewer than two usable colours");
    }
    if args.log {
        map.set_log_scale(true);
    }
    if args.discrete {
        map.set_discrete(true);
    }
    match (args.min, args.max) {
        (Some(min), Some(max)) => map.calibrate(min, max),
        _ => map.calibrate_with(None),
    }

    if args.json {
        let doc = map.to_json();
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("=== COLOUR MAP ===");
        println!("Range: {} to {}", map.minimum(), map.maximum());
        println!(
            "Scale: {}{}",
            if map.is_log() { "log" } else { "linear" },
            if map.is_discrete() { ", discrete" } else { "" }
        );
        println!("Background: {}", map.background);
        println!("\nStops:");
        print!("{}", map.to_text());

        println!("\nSamples:");
        for i in 0..=4 {
            let value = map.minimum() + (map.maximum() - map.minimum()) * i as f32 / 4.0;
            println!("  {:>12} -> {}", value, map.get(value));
        }
    }

    let mut options = map.properties().colourbar.clone();
    options.ticks = args.ticks;
    println!("\nTicks:");
    for tick in map.ticks(&options) {
        println!(
            "  {:>8.4}  {}",
            tick.position,
            tick.label.unwrap_or_else(|| tick.value.to_string())
        );
    }

    if let Some(path) = &args.png {
        let png = map.to_image(false)?.encode_png()?;
        std::fs::write(path, &png)
            .with_context(|| format!("Failed to write palette texture to {}", path.display()))?;
        println!("\nWrote {} byte palette texture to {}", png.len(), path.display());
    }

    Ok(())
}
