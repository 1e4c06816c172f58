// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

//! Slot-machine style odometer counter.
//!
//! A row of digit reels counts from a start value to a target one carry step
//! at a time, scrolling every reel in a step together. The reel model and
//! the step controller are independent of any window; rendering and timing
//! come in through [`DigitRenderer`] and [`AnimationScheduler`]. The
//! [`Odometer`] window provides both on top of winit, pixels and rusttype.

pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod overlay;
pub mod reels;
pub mod scheduler;
pub mod strip;
pub mod target;

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

pub use config::{validate_increment, Color, OdometerConfig};
pub use controller::{DigitRenderer, OdometerController, ScrollStatus};
pub use display::{load_font, Odometer, OdometerCommand, ReelFaces};
pub use error::{OdometerError, Result};
pub use overlay::{align_overlays, FontGlyphMetrics, GlyphMetrics, GlyphRect, OverlayPlacement};
pub use reels::ReelSequence;
pub use scheduler::{AnimationScheduler, BatchId, Easing, FrameScheduler, ScrollTween};
pub use strip::ReelStrip;
pub use target::{min_range, set_random_target, Round};
