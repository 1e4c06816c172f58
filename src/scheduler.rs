//! Reel scroll tweens and the frame-clock scheduler that runs them.
//!
//! A batch is the set of tweens for one carry step. Every tween in a batch
//! starts on the same frame; the batch is complete once the longest tween
//! has run its full duration. Finished batches stay queryable (their reels
//! hold the end offset) until the owner releases them with `cancel`, so a
//! renderer never sees a reel snap back before its digit is committed.

/// Easing curves for reel scrolling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// quad-in
    Accelerate,
    /// quad-out
    Decelerate,
    /// smoothstep
    Smooth,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Accelerate => t * t,
            Easing::Decelerate => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::Smooth => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// One reel scrolling between two offsets, measured in glyph heights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTween {
    pub reel: usize,
    pub start_offset: f32,
    pub end_offset: f32,
    pub duration: f32,
    pub easing: Easing,
}

impl ScrollTween {
    /// A single glyph-height scroll, the motion of one carry step.
    pub fn one_glyph(reel: usize, duration: f32, easing: Easing) -> Self {
        Self {
            reel,
            start_offset: 0.0,
            end_offset: 1.0,
            duration,
            easing,
        }
    }

    pub fn sample(&self, elapsed: f32) -> f32 {
        let t = if self.duration > 0.0 {
            elapsed / self.duration
        } else {
            1.0
        };
        let eased = self.easing.apply(t);
        self.start_offset + (self.end_offset - self.start_offset) * eased
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(u64);

impl BatchId {
    pub fn to_raw(self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Runs sets of scroll tweens concurrently.
pub trait AnimationScheduler {
    /// Starts every tween in `tweens` together.
    fn play(&mut self, tweens: Vec<ScrollTween>) -> BatchId;

    /// Whether the whole batch has finished. Unknown ids count as finished.
    fn is_complete(&self, batch: BatchId) -> bool;

    /// Stops and forgets a batch. Must be safe to call repeatedly.
    fn cancel(&mut self, batch: BatchId);
}

#[derive(Debug, Clone)]
struct Batch {
    id: BatchId,
    elapsed: f32,
    tweens: Vec<ScrollTween>,
}

impl Batch {
    fn duration(&self) -> f32 {
        self.tweens
            .iter()
            .map(|tween| tween.duration)
            .fold(0.0, f32::max)
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.duration()
    }
}

/// Scheduler driven by the host's frame clock.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    batches: Vec<Batch>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances every running batch by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        for batch in self.batches.iter_mut() {
            if !batch.is_finished() {
                batch.elapsed = (batch.elapsed + dt.max(0.0)).min(batch.duration());
            }
        }
    }

    /// Live scroll offset of `reel`, if any batch is moving it.
    pub fn offset(&self, reel: usize) -> Option<f32> {
        self.batches.iter().find_map(|batch| {
            batch
                .tweens
                .iter()
                .find(|tween| tween.reel == reel)
                .map(|tween| tween.sample(batch.elapsed))
        })
    }

    pub fn has_active_animations(&self) -> bool {
        self.batches.iter().any(|batch| !batch.is_finished())
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }
}

impl AnimationScheduler for FrameScheduler {
    fn play(&mut self, tweens: Vec<ScrollTween>) -> BatchId {
        let id = BatchId(self.next_id);
        self.next_id += 1;
        log::trace!("scheduling batch {} with {} tweens", id.0, tweens.len());
        self.batches.push(Batch {
            id,
            elapsed: 0.0,
            tweens,
        });
        id
    }

    fn is_complete(&self, batch: BatchId) -> bool {
        self.batches
            .iter()
            .find(|b| b.id == batch)
            .map_or(true, Batch::is_finished)
    }

    fn cancel(&mut self, batch: BatchId) {
        self.batches.retain(|b| b.id != batch);
    }
}
