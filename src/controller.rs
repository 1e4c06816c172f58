//! Odometer reel controller.
//!
//! Drives a [`ReelSequence`] toward a target one carry step at a time. Each
//! step selects the reels that move together, hands their scroll tweens to an
//! [`AnimationScheduler`] as one batch and commits the new digits only after
//! the batch completes. The host calls [`OdometerController::poll`] once per
//! frame; nothing here blocks or keeps time.

use std::collections::BTreeMap;

use rand::Rng;

use crate::config::{validate_increment, OdometerConfig};
use crate::error::{OdometerError, Result};
use crate::reels::ReelSequence;
use crate::scheduler::{AnimationScheduler, BatchId, ScrollTween};
use crate::target::{min_range, set_random_target, Round};

/// Draws the resting glyph of a reel.
pub trait DigitRenderer {
    fn render(&mut self, reel: usize, digit: u8);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollStatus {
    /// Nothing scheduled.
    Idle,
    /// A step is animating or about to be scheduled.
    InProgress,
    /// The target was reached since the last poll.
    Completed,
}

/// The in-flight carry step. Owns the digits its reels will land on.
#[derive(Debug)]
struct ScrollStep {
    batch: BatchId,
    pending: BTreeMap<usize, u8>,
}

pub struct OdometerController<R: DigitRenderer, S: AnimationScheduler> {
    config: OdometerConfig,
    reels: ReelSequence,
    renderer: R,
    scheduler: S,
    min_number: f64,
    target_number: f64,
    /// Target in least-significant steps, fixed when a scroll starts.
    target_units: u64,
    config_error: Option<OdometerError>,
    step: Option<ScrollStep>,
    steps_taken: u64,
    completed: bool,
}

impl<R: DigitRenderer, S: AnimationScheduler> OdometerController<R, S> {
    /// Builds reels with random digits and renders them. The first target is
    /// the starting value, so scrolling before a round does nothing.
    pub fn new<G: Rng + ?Sized>(
        config: OdometerConfig,
        renderer: R,
        scheduler: S,
        rng: &mut G,
    ) -> Result<Self> {
        config.validate_layout()?;

        let config_error =
            validate_increment(config.increment, config.decimal_digits, config.epsilon).err();
        if let Some(ref err) = config_error {
            log::error!("configuration error: {err}");
        }

        let reels = ReelSequence::random(config.reel_count, config.decimal_digits, rng);
        let start = reels.current_value();
        let start_units = reels.units();
        let mut controller = Self {
            config,
            reels,
            renderer,
            scheduler,
            min_number: start,
            target_number: start,
            target_units: start_units,
            config_error,
            step: None,
            steps_taken: 0,
            completed: false,
        };
        controller.render_all();
        log::info!("odometer ready at {}", controller.reels);
        Ok(controller)
    }

    pub fn config(&self) -> &OdometerConfig {
        &self.config
    }

    pub fn reels(&self) -> &ReelSequence {
        &self.reels
    }

    pub fn current_value(&self) -> f64 {
        self.reels.current_value()
    }

    pub fn target(&self) -> f64 {
        self.target_number
    }

    pub fn min_number(&self) -> f64 {
        self.min_number
    }

    /// Startup configuration problem, if any. Reported once and otherwise ignored.
    pub fn config_error(&self) -> Option<&OdometerError> {
        self.config_error.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn is_scrolling(&self) -> bool {
        self.step.is_some()
    }

    /// Steps committed by the current (or last) scroll sequence.
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// Reels moving in the in-flight step, least-significant first.
    pub fn scrolling_reels(&self) -> Vec<usize> {
        self.step
            .as_ref()
            .map(|step| step.pending.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Picks a new random round and shows its starting value.
    pub fn new_round<G: Rng + ?Sized>(&mut self, rng: &mut G) -> Result<Round> {
        self.cancel();
        let round = set_random_target(
            rng,
            min_range(self.config.reel_count, self.config.decimal_digits),
            self.config.increment,
            self.config.decimal_digits,
        );
        self.reels.set_value(round.min_number)?;
        self.min_number = round.min_number;
        self.target_number = round.target_number;
        self.render_all();

        log::info!("Min Number: {}", self.reels);
        log::info!("Target Number: {:.*}", self.config.decimal_digits as usize, self.target_number);
        Ok(round)
    }

    /// Shows `value` on every reel, abandoning any scroll in flight.
    pub fn set_value(&mut self, value: f64) -> Result<()> {
        self.cancel();
        self.reels.set_value(value)?;
        self.render_all();
        Ok(())
    }

    pub fn set_target(&mut self, target: f64) {
        self.target_number = target;
    }

    /// Starts scrolling toward the target, replacing any sequence in flight.
    pub fn start_scroll(&mut self) -> Result<()> {
        self.cancel();
        self.steps_taken = 0;
        self.completed = false;

        let Some(target_units) = self.target_units() else {
            let err = OdometerError::TargetOutOfRange {
                target: self.target_number,
                reel_count: self.reels.len(),
            };
            log::error!("{err}");
            return Err(err);
        };
        self.target_units = target_units;

        if self.at_target() {
            log::debug!("already at target {}", self.reels);
            self.completed = true;
            return Ok(());
        }

        log::info!(
            "scrolling from {} to {:.*}",
            self.reels,
            self.config.decimal_digits as usize,
            self.target_number
        );
        self.begin_step();
        Ok(())
    }

    /// Advances the sequence once the scheduler reports the current step done.
    pub fn poll(&mut self) -> ScrollStatus {
        let step = match self.step.take() {
            Some(step) if self.scheduler.is_complete(step.batch) => step,
            Some(step) => {
                self.step = Some(step);
                return ScrollStatus::InProgress;
            }
            None if std::mem::take(&mut self.completed) => return ScrollStatus::Completed,
            None => return ScrollStatus::Idle,
        };

        self.scheduler.cancel(step.batch);
        for (&reel, &digit) in &step.pending {
            self.reels.set_digit(reel, digit);
            self.renderer.render(reel, digit);
        }
        self.steps_taken += 1;

        if self.at_target() {
            log::info!(
                "reached {} after {} steps",
                self.reels,
                self.steps_taken
            );
            ScrollStatus::Completed
        } else {
            self.begin_step();
            ScrollStatus::InProgress
        }
    }

    /// Drops the in-flight step without committing it. Safe to call at any time.
    pub fn cancel(&mut self) {
        if let Some(step) = self.step.take() {
            self.scheduler.cancel(step.batch);
            for &reel in step.pending.keys() {
                if let Some(digit) = self.reels.digit(reel) {
                    self.renderer.render(reel, digit);
                }
            }
            log::debug!("cancelled scroll at {}", self.reels);
        }
    }

    fn begin_step(&mut self) {
        let pending = self.reels.pending_step();
        let tweens = pending
            .keys()
            .map(|&reel| {
                ScrollTween::one_glyph(reel, self.config.scroll_duration, self.config.easing)
            })
            .collect();
        let batch = self.scheduler.play(tweens);
        log::debug!(
            "step {} from {} moves reels {:?}",
            self.steps_taken + 1,
            self.reels,
            pending.keys().collect::<Vec<_>>()
        );
        self.step = Some(ScrollStep { batch, pending });
    }

    fn at_target(&self) -> bool {
        self.reels.units() == self.target_units
    }

    /// Target as a whole number of steps, if it fits the reels and lands on one.
    fn target_units(&self) -> Option<u64> {
        let units = self.reels.units_for(self.target_number)?;
        let scaled = self.target_number * self.reels.unit_scale();
        ((scaled - units as f64).abs() < self.config.epsilon).then_some(units)
    }

    fn render_all(&mut self) {
        for reel in 0..self.reels.len() {
            if let Some(digit) = self.reels.digit(reel) {
                self.renderer.render(reel, digit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{Easing, FrameScheduler};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Debug, Default)]
    struct RecordingRenderer {
        calls: Vec<(usize, u8)>,
        faces: BTreeMap<usize, u8>,
    }

    impl DigitRenderer for RecordingRenderer {
        fn render(&mut self, reel: usize, digit: u8) {
            self.calls.push((reel, digit));
            self.faces.insert(reel, digit);
        }
    }

    type TestController = OdometerController<RecordingRenderer, FrameScheduler>;

    fn controller(reel_count: usize, decimal_digits: u32) -> TestController {
        let config = OdometerConfig::builder()
            .reel_count(reel_count)
            .decimal_digits(decimal_digits)
            .scroll_duration(1.0)
            .easing(Easing::Linear)
            .build();
        let mut rng = StdRng::seed_from_u64(11);
        OdometerController::new(
            config,
            RecordingRenderer::default(),
            FrameScheduler::new(),
            &mut rng,
        )
        .unwrap()
    }

    fn finish_step(ctrl: &mut TestController) -> ScrollStatus {
        ctrl.scheduler_mut().advance(1.0);
        ctrl.poll()
    }

    fn run_to_completion(ctrl: &mut TestController) {
        for _ in 0..100_000 {
            if finish_step(ctrl) == ScrollStatus::Completed {
                return;
            }
        }
        panic!("scroll never completed");
    }

    fn faces(ctrl: &TestController) -> Vec<u8> {
        (0..ctrl.reels().len())
            .rev()
            .map(|reel| ctrl.renderer().faces[&reel])
            .collect()
    }

    #[test]
    fn renders_every_reel_at_startup() {
        let ctrl = controller(5, 2);
        assert_eq!(ctrl.renderer().calls.len(), 5);
        assert_eq!(faces(&ctrl), ctrl.reels().digits());
        assert_eq!(ctrl.target(), ctrl.current_value());
    }

    #[test]
    fn single_step_with_carry() {
        let mut ctrl = controller(5, 0);
        ctrl.set_value(9.0).unwrap();
        ctrl.set_target(10.0);
        ctrl.start_scroll().unwrap();

        assert_eq!(ctrl.scrolling_reels(), vec![0, 1]);
        assert_eq!(ctrl.poll(), ScrollStatus::InProgress);
        assert_eq!(finish_step(&mut ctrl), ScrollStatus::Completed);
        assert_eq!(ctrl.reels().digits(), &[0, 0, 0, 1, 0]);
        assert_eq!(faces(&ctrl), vec![0, 0, 0, 1, 0]);
        assert_eq!(ctrl.steps_taken(), 1);
        assert_eq!(ctrl.poll(), ScrollStatus::Idle);
    }

    #[test]
    fn digits_commit_only_after_batch_completes() {
        let mut ctrl = controller(4, 0);
        ctrl.set_value(1299.0).unwrap();
        ctrl.set_target(1300.0);
        ctrl.start_scroll().unwrap();

        ctrl.scheduler_mut().advance(0.5);
        assert_eq!(ctrl.poll(), ScrollStatus::InProgress);
        assert_eq!(ctrl.reels().digits(), &[1, 2, 9, 9]);
        assert_eq!(ctrl.current_value(), 1299.0);
        assert_eq!(ctrl.scheduler().offset(0), Some(0.5));
        assert_eq!(ctrl.scheduler().offset(2), Some(0.5));
        assert_eq!(ctrl.scheduler().offset(3), None);

        ctrl.scheduler_mut().advance(0.5);
        assert_eq!(ctrl.poll(), ScrollStatus::Completed);
        assert_eq!(ctrl.reels().digits(), &[1, 3, 0, 0]);
        assert_eq!(ctrl.scheduler().batch_count(), 0);
    }

    #[test]
    fn next_group_is_selected_after_commit() {
        let mut ctrl = controller(5, 0);
        ctrl.set_value(199.0).unwrap();
        ctrl.set_target(201.0);
        ctrl.start_scroll().unwrap();
        assert_eq!(ctrl.scrolling_reels(), vec![0, 1, 2]);

        assert_eq!(finish_step(&mut ctrl), ScrollStatus::InProgress);
        assert_eq!(ctrl.reels().digits(), &[0, 0, 2, 0, 0]);
        assert_eq!(ctrl.scrolling_reels(), vec![0]);

        assert_eq!(finish_step(&mut ctrl), ScrollStatus::Completed);
        assert_eq!(ctrl.current_value(), 201.0);
    }

    #[test]
    fn step_count_equals_distance_to_target() {
        let mut ctrl = controller(5, 2);
        ctrl.set_value(12.34).unwrap();
        ctrl.set_target(14.34);
        ctrl.start_scroll().unwrap();
        run_to_completion(&mut ctrl);
        assert_eq!(ctrl.steps_taken(), 200);
        assert!((ctrl.current_value() - 14.34).abs() < 1e-4);
        assert_eq!(ctrl.reels().to_string(), "014.34");
    }

    #[test]
    fn fine_fixed_point_display_counts_every_step() {
        let mut ctrl = controller(6, 5);
        ctrl.set_value(0.0).unwrap();
        ctrl.set_target(0.0005);
        ctrl.start_scroll().unwrap();
        run_to_completion(&mut ctrl);
        assert_eq!(ctrl.steps_taken(), 50);
        assert_eq!(ctrl.reels().units(), 50);
        assert_eq!(ctrl.reels().digits(), &[0, 0, 0, 0, 5, 0]);
    }

    #[test]
    fn wide_integer_display_stops_on_exact_target() {
        let mut ctrl = controller(17, 0);
        ctrl.set_value(9_999_999_999_999_990.0).unwrap();
        ctrl.set_target(9_999_999_999_999_994.0);
        ctrl.start_scroll().unwrap();
        run_to_completion(&mut ctrl);
        assert_eq!(ctrl.reels().units(), 9_999_999_999_999_994);
        assert_eq!(ctrl.steps_taken(), 4);
    }

    #[test]
    fn target_between_display_steps_is_rejected() {
        let mut ctrl = controller(6, 5);
        ctrl.set_value(0.0).unwrap();
        ctrl.set_target(0.000055);
        assert!(matches!(
            ctrl.start_scroll(),
            Err(OdometerError::TargetOutOfRange { .. })
        ));
    }

    #[test]
    fn already_at_target_takes_no_steps() {
        let mut ctrl = controller(5, 2);
        ctrl.set_value(3.5).unwrap();
        ctrl.set_target(3.5);
        ctrl.start_scroll().unwrap();
        assert!(!ctrl.is_scrolling());
        assert_eq!(ctrl.scheduler().batch_count(), 0);
        assert_eq!(ctrl.poll(), ScrollStatus::Completed);
        assert_eq!(ctrl.poll(), ScrollStatus::Idle);
        assert_eq!(ctrl.steps_taken(), 0);
    }

    #[test]
    fn lower_target_wraps_through_full_rollover() {
        let mut ctrl = controller(2, 0);
        ctrl.set_value(98.0).unwrap();
        ctrl.set_target(1.0);
        ctrl.start_scroll().unwrap();
        assert_eq!(finish_step(&mut ctrl), ScrollStatus::InProgress);
        assert_eq!(ctrl.scrolling_reels(), vec![0, 1]);
        run_to_completion(&mut ctrl);
        assert_eq!(ctrl.reels().digits(), &[0, 1]);
        assert_eq!(ctrl.steps_taken(), 3);
    }

    #[test]
    fn restarting_cancels_in_flight_step() {
        let mut ctrl = controller(5, 0);
        ctrl.set_value(97.0).unwrap();
        ctrl.set_target(102.0);
        ctrl.start_scroll().unwrap();
        assert_eq!(finish_step(&mut ctrl), ScrollStatus::InProgress);
        assert_eq!(finish_step(&mut ctrl), ScrollStatus::InProgress);
        assert_eq!(ctrl.current_value(), 99.0);

        // halfway through the 99 -> 100 carry
        ctrl.scheduler_mut().advance(0.5);
        assert_eq!(ctrl.poll(), ScrollStatus::InProgress);
        let calls_before = ctrl.renderer().calls.len();

        ctrl.start_scroll().unwrap();
        assert_eq!(ctrl.current_value(), 99.0);
        // the abandoned reels are redrawn at their committed digits
        assert_eq!(
            &ctrl.renderer().calls[calls_before..calls_before + 3],
            &[(0, 9), (1, 9), (2, 0)]
        );
        // only the new sequence's batch is alive, and it starts from zero offset
        assert_eq!(ctrl.scheduler().batch_count(), 1);
        assert_eq!(ctrl.scheduler().offset(0), Some(0.0));

        run_to_completion(&mut ctrl);
        assert_eq!(ctrl.current_value(), 102.0);
        assert_eq!(ctrl.steps_taken(), 3);
        assert_eq!(faces(&ctrl), ctrl.reels().digits());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut ctrl = controller(3, 0);
        ctrl.set_value(5.0).unwrap();
        ctrl.set_target(7.0);
        ctrl.start_scroll().unwrap();
        ctrl.cancel();
        ctrl.cancel();
        assert!(!ctrl.is_scrolling());
        assert_eq!(ctrl.poll(), ScrollStatus::Idle);
        assert_eq!(ctrl.current_value(), 5.0);
    }

    #[test]
    fn unreachable_target_is_rejected() {
        let mut ctrl = controller(5, 2);
        ctrl.set_value(998.0).unwrap();
        ctrl.set_target(1000.0);
        assert!(matches!(
            ctrl.start_scroll(),
            Err(OdometerError::TargetOutOfRange { reel_count: 5, .. })
        ));
        ctrl.set_target(1.234);
        assert!(ctrl.start_scroll().is_err());
        assert!(!ctrl.is_scrolling());
        assert_eq!(ctrl.scheduler().batch_count(), 0);
    }

    #[test]
    fn set_value_out_of_range_keeps_reels() {
        let mut ctrl = controller(3, 0);
        ctrl.set_value(123.0).unwrap();
        assert!(ctrl.set_value(1000.0).is_err());
        assert_eq!(ctrl.reels().digits(), &[1, 2, 3]);
    }

    #[test]
    fn new_round_shows_min_and_targets_increment() {
        let mut ctrl = controller(5, 2);
        let mut rng = StdRng::seed_from_u64(5);
        let round = ctrl.new_round(&mut rng).unwrap();
        assert!((ctrl.current_value() - round.min_number).abs() < 1e-4);
        assert!((ctrl.target() - (round.min_number + 2.0)).abs() < 1e-4);
        assert!(round.min_number < 999.0);
        assert_eq!(faces(&ctrl), ctrl.reels().digits());

        if round.target_number < 1000.0 {
            ctrl.start_scroll().unwrap();
            run_to_completion(&mut ctrl);
            assert_eq!(ctrl.steps_taken(), 200);
            assert!((ctrl.current_value() - round.target_number).abs() < 1e-4);
        }
    }

    #[test]
    fn new_round_cancels_running_scroll() {
        let mut ctrl = controller(5, 2);
        ctrl.set_value(1.0).unwrap();
        ctrl.set_target(2.0);
        ctrl.start_scroll().unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        ctrl.new_round(&mut rng).unwrap();
        assert!(!ctrl.is_scrolling());
        assert_eq!(ctrl.scheduler().batch_count(), 0);
    }

    #[test]
    fn bad_increment_is_reported_but_not_fatal() {
        let config = OdometerConfig::builder()
            .increment(0.125)
            .scroll_duration(1.0)
            .build();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctrl = OdometerController::new(
            config,
            RecordingRenderer::default(),
            FrameScheduler::new(),
            &mut rng,
        )
        .unwrap();
        assert!(matches!(
            ctrl.config_error(),
            Some(OdometerError::InvalidIncrement { .. })
        ));
        assert!(ctrl.new_round(&mut rng).is_ok());
    }

    #[test]
    fn group_tweens_share_timing() {
        let config = OdometerConfig::builder()
            .reel_count(4)
            .decimal_digits(0)
            .scroll_duration(0.75)
            .easing(Easing::Decelerate)
            .build();
        let mut rng = StdRng::seed_from_u64(2);
        let mut ctrl = OdometerController::new(
            config,
            RecordingRenderer::default(),
            FrameScheduler::new(),
            &mut rng,
        )
        .unwrap();
        ctrl.set_value(999.0).unwrap();
        ctrl.set_target(1000.0);
        ctrl.start_scroll().unwrap();

        ctrl.scheduler_mut().advance(0.375);
        let offsets: Vec<_> = (0..4).map(|reel| ctrl.scheduler().offset(reel)).collect();
        assert_eq!(offsets, vec![Some(0.75), Some(0.75), Some(0.75), Some(0.75)]);
    }
}
