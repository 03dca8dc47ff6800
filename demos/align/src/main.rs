use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use stardrift::{parse_stars, rasterize};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Find the instant a drifting star list lines up, and print what it spells.
#[derive(Parser, Debug)]
struct Args {
    /// Star list, one `position=<x, y> velocity=<vx, vy>` line per star.
    input: PathBuf,
    /// Give up if the field is still shrinking after this many seconds.
    #[arg(long, default_value_t = 100_000)]
    max_seconds: u64,
    /// Save the aligned plate as a PNG.
    #[arg(long)]
    png: Option<PathBuf>,
    /// Pixels per plate cell in the PNG.
    #[arg(long, default_value_t = 8)]
    scale: u32,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let mut sky = parse_stars(&text)?;
    info!(stars = sky.len(), "parsed star list");

    let outcome = sky.align(args.max_seconds, |seconds, spread| {
        eprint!("\r {:>7}s  spread {:12.3}", seconds, spread);
    });
    eprintln!();
    let alignment = outcome?;
    info!(
        seconds = alignment.seconds,
        spread = alignment.spread,
        "field aligned"
    );

    let plate = rasterize(&sky);
    print!("{}", plate);
    println!("Waited {}s", alignment.seconds);

    if let Some(png) = &args.png {
        image_util::save_plate(png, plate.cells(), args.scale)?;
        info!(path = %png.display(), "plate saved");
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
