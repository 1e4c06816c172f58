use clap::Parser;
use odometer::{Odometer, OdometerCommand, OdometerConfig};
use rand::Rng;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[derive(Parser)]
struct Args {
    /// Font file for the reels
    font: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    // Fast steps so a whole round fits in a few seconds
    let config = OdometerConfig::builder()
        .scroll_duration(0.02)
        .increment(1.5)
        .font_path(args.font)
        .build();

    let mut odometer = Odometer::new(config);

    // Create a channel for scripted rounds
    let (sender, receiver) = mpsc::channel();

    thread::spawn(move || {
        let mut rng = rand::rng();
        loop {
            let commands = [OdometerCommand::NewRound, OdometerCommand::StartScroll];
            if commands.iter().any(|cmd| sender.send(cmd.clone()).is_err()) {
                break;
            }

            // Occasionally restart mid-round to exercise cancellation
            thread::sleep(Duration::from_millis(rng.random_range(1500..4500)));
            if rng.random_range(0.0..1.0) < 0.3 && sender.send(OdometerCommand::StartScroll).is_err()
            {
                break;
            }
            thread::sleep(Duration::from_millis(1500));
        }
    });

    println!("Displaying odometer with scripted rounds:");
    println!("- a new random round every few seconds");
    println!("- Space / A still work for manual rounds");
    println!("Press Esc to exit");

    odometer.show_with_commands(receiver)
}
