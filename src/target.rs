//! Random round selection.

use rand::Rng;

/// Start and end of one counting round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Round {
    pub min_number: f64,
    pub target_number: f64,
}

/// Upper bound (exclusive) of the random start value: `10^(N - d) - 1`.
pub fn min_range(reel_count: usize, decimal_digits: u32) -> f64 {
    let whole_digits = reel_count.saturating_sub(decimal_digits as usize) as i32;
    10f64.powi(whole_digits) - 1.0
}

/// Draws a start value in `[0, min_range)` rounded to the display precision and
/// offsets it by `increment`.
pub fn set_random_target<R: Rng + ?Sized>(
    rng: &mut R,
    min_range: f64,
    increment: f64,
    decimal_digits: u32,
) -> Round {
    let scale = 10f64.powi(decimal_digits as i32);
    let min_number = if min_range > 0.0 {
        let drawn = rng.random_range(0.0..min_range);
        let mut rounded = (drawn * scale).round() / scale;
        // rounding up must not reach the exclusive bound
        if rounded >= min_range {
            rounded = ((min_range * scale).ceil() - 1.0) / scale;
        }
        rounded
    } else {
        0.0
    };

    Round {
        min_number,
        target_number: min_number + increment,
    }
}
