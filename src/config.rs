use std::path::PathBuf;

use bon::Builder;

use crate::error::{OdometerError, Result};
use crate::scheduler::Easing;

/// Color representation for reel elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

/// Reel, animation and window settings for the odometer.
#[derive(Debug, Clone, Builder)]
pub struct OdometerConfig {
    // Reel model
    #[builder(default = 5)]
    pub reel_count: usize,
    #[builder(default = 2)]
    pub decimal_digits: u32,
    #[builder(default = 2.0)]
    pub increment: f64,
    #[builder(default = 1e-4)]
    pub epsilon: f64,

    // Scroll animation
    #[builder(default = 2.0)]
    pub scroll_duration: f32,
    #[builder(default = Easing::Linear)]
    pub easing: Easing,

    // Window configuration
    #[builder(default = "Odometer".to_string())]
    pub title: String,
    #[builder(default = 460)]
    pub window_width: usize,
    #[builder(default = 240)]
    pub window_height: usize,
    #[builder(default = 60.0)]
    pub max_framerate: f64,

    // Reel cell geometry
    #[builder(default = 64)]
    pub glyph_width: i32,
    #[builder(default = 88)]
    pub glyph_height: i32,
    #[builder(default = 10)]
    pub reel_gap: i32,
    #[builder(default = 3)]
    pub strip_slots: usize,
    #[builder(default = 3.0)]
    pub reel_frame_thickness: f32,
    #[builder(default = 72.0)]
    pub digit_font_size: f32,

    // Readout and overlays
    #[builder(default = 0.82)]
    pub readout_y_factor: f64,
    #[builder(default = 32.0)]
    pub readout_font_size: f32,
    #[builder(default = 2)]
    pub overlay_count: usize,
    #[builder(default = 4)]
    pub overlay_padding: i32,
    #[builder(default = 2.0)]
    pub overlay_thickness: f32,

    // Colors
    #[builder(default = Color::new(0xff, 0xff, 0xff))]
    pub background_color: Color,
    #[builder(default = Color::new(0x00, 0x00, 0x00))]
    pub digit_color: Color,
    #[builder(default = Color::new(0x40, 0x40, 0x40))]
    pub frame_color: Color,
    #[builder(default = Color::new(0xff, 0x80, 0x00))]
    pub overlay_color: Color,

    // Font configuration
    pub font_path: Option<PathBuf>,
}

impl Default for OdometerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl OdometerConfig {
    /// Number of integer units per whole number on the display.
    pub fn unit_scale(&self) -> f64 {
        10f64.powi(self.decimal_digits as i32)
    }

    pub fn validate_layout(&self) -> Result<()> {
        if self.reel_count == 0 {
            return Err(OdometerError::InvalidLayout(
                "at least one reel is required".to_string(),
            ));
        }
        // 10^N units must fit in a u64
        if self.reel_count > 19 {
            return Err(OdometerError::InvalidLayout(format!(
                "{} reels exceed the supported maximum of 19",
                self.reel_count
            )));
        }
        if self.decimal_digits as usize > self.reel_count {
            return Err(OdometerError::InvalidLayout(format!(
                "{} decimal digits on {} reels",
                self.decimal_digits, self.reel_count
            )));
        }
        Ok(())
    }
}

/// Checks that `increment` is a whole number of display units.
pub fn validate_increment(increment: f64, decimal_digits: u32, epsilon: f64) -> Result<()> {
    let scaled = increment * 10f64.powi(decimal_digits as i32);
    if scaled.is_finite() && (scaled - scaled.round()).abs() < epsilon {
        Ok(())
    } else {
        Err(OdometerError::InvalidIncrement {
            increment,
            decimal_digits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_five_reel_fixed_point_display() {
        let config = OdometerConfig::default();
        assert_eq!(config.reel_count, 5);
        assert_eq!(config.decimal_digits, 2);
        assert_eq!(config.increment, 2.0);
        assert_eq!(config.unit_scale(), 100.0);
        assert!(config.validate_layout().is_ok());
    }

    #[test]
    fn increment_precision() {
        assert!(validate_increment(2.0, 2, 1e-4).is_ok());
        assert!(validate_increment(0.25, 2, 1e-4).is_ok());
        assert!(validate_increment(1.1, 2, 1e-4).is_ok());
        assert!(validate_increment(0.125, 2, 1e-4).is_err());
        assert!(validate_increment(0.5, 0, 1e-4).is_err());
        assert!(validate_increment(f64::NAN, 2, 1e-4).is_err());
    }

    #[test]
    fn rejects_degenerate_layouts() {
        let no_reels = OdometerConfig::builder().reel_count(0).build();
        assert!(no_reels.validate_layout().is_err());

        let too_many_decimals = OdometerConfig::builder()
            .reel_count(2)
            .decimal_digits(3)
            .build();
        assert!(too_many_decimals.validate_layout().is_err());
    }
}
