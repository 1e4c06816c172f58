//! Error types for the odometer

use thiserror::Error;

/// Errors that can occur while driving the reels
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OdometerError {
    /// A value does not fit on the reels
    #[error("value {value} does not fit on {reel_count} reels")]
    Range { value: f64, reel_count: usize },

    /// The scroll target cannot be shown on the reels
    #[error("target {target} is out of range for {reel_count} reels")]
    TargetOutOfRange { target: f64, reel_count: usize },

    /// Increment has more fractional digits than the display
    #[error("increment {increment} is not representable with {decimal_digits} decimal digits")]
    InvalidIncrement { increment: f64, decimal_digits: u32 },

    /// Reel layout is unusable
    #[error("invalid reel layout: {0}")]
    InvalidLayout(String),

    /// Failed to load font
    #[error("Font loading failed: {0}")]
    FontLoad(String),
}

/// Result type for odometer operations
pub type Result<T> = std::result::Result<T, OdometerError>;
