use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info, LevelFilter};
use odometer::{Easing, Odometer, OdometerConfig};

#[derive(Parser)]
#[command(name = "odometer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rolling odometer counter", long_about = None)]
struct Cli {
    /// TrueType/OpenType font used for the reels and readout
    #[arg(short, long)]
    font: PathBuf,

    /// Number of digit reels
    #[arg(short, long, default_value_t = 5)]
    reels: usize,

    /// Digits after the decimal point
    #[arg(short, long, default_value_t = 2)]
    decimals: u32,

    /// Seconds per carry step
    #[arg(long, default_value_t = 2.0)]
    duration: f32,

    /// Amount added to the random start value each round
    #[arg(short, long, default_value_t = 2.0)]
    increment: f64,

    /// Ease reels in and out instead of scrolling linearly
    #[arg(long)]
    smooth: bool,

    /// Window title
    #[arg(long, default_value = "Odometer")]
    title: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let config = OdometerConfig::builder()
        .title(cli.title)
        .reel_count(cli.reels)
        .decimal_digits(cli.decimals)
        .scroll_duration(cli.duration)
        .increment(cli.increment)
        .easing(if cli.smooth {
            Easing::Smooth
        } else {
            Easing::Linear
        })
        .font_path(cli.font)
        .build();

    info!("Starting odometer with {} reels", config.reel_count);
    let mut odometer = Odometer::new(config);
    if let Err(err) = odometer.show() {
        error!("Odometer failed: {err}");
        return Err(err);
    }
    Ok(())
}
