//! Cyclic glyph strip behind one reel window.

/// A column of `slots` glyphs that scrolls upward through a one-glyph window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReelStrip {
    slots: usize,
}

impl ReelStrip {
    /// Two slots is the minimum that can show a digit leaving and one arriving.
    pub fn new(slots: usize) -> Self {
        Self {
            slots: slots.max(2),
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Glyphs of a reel resting on `digit`, scrolled by `offset` glyph heights.
    ///
    /// Returns `(digit, y)` per slot with `y` in glyph heights from the top of
    /// the window. A glyph pushed to `y <= -1` has fully left the window and is
    /// moved to the bottom of the strip.
    pub fn layout(&self, digit: u8, offset: f32) -> Vec<(u8, f32)> {
        let slots = self.slots as f32;
        (0..self.slots)
            .map(|slot| {
                let mut y = slot as f32 - offset;
                while y <= -1.0 {
                    y += slots;
                }
                (((digit as usize + slot) % 10) as u8, y)
            })
            .collect()
    }

    /// Glyphs that overlap the window at `offset`.
    pub fn visible(&self, digit: u8, offset: f32) -> Vec<(u8, f32)> {
        self.layout(digit, offset)
            .into_iter()
            .filter(|&(_, y)| y > -1.0 && y < 1.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_rest_shows_only_current_digit() {
        let strip = ReelStrip::new(3);
        assert_eq!(strip.layout(7, 0.0), vec![(7, 0.0), (8, 1.0), (9, 2.0)]);
        assert_eq!(strip.visible(7, 0.0), vec![(7, 0.0)]);
    }

    #[test]
    fn mid_scroll_shows_old_leaving_and_new_arriving() {
        let strip = ReelStrip::new(3);
        assert_eq!(strip.visible(9, 0.5), vec![(9, -0.5), (0, 0.5)]);
    }

    #[test]
    fn glyph_past_the_top_wraps_to_bottom() {
        let strip = ReelStrip::new(3);
        let layout = strip.layout(4, 1.0);
        assert_eq!(layout[0], (4, 2.0));
        assert_eq!(layout[1], (5, 0.0));
        assert_eq!(strip.visible(4, 1.0), vec![(5, 0.0)]);
    }

    #[test]
    fn end_of_scroll_matches_next_digit_at_rest() {
        let strip = ReelStrip::new(4);
        let mut scrolled: Vec<_> = strip.visible(2, 1.0);
        scrolled.sort_by(|a, b| a.1.total_cmp(&b.1));
        assert_eq!(scrolled, strip.visible(3, 0.0));
    }

    #[test]
    fn strip_has_at_least_two_slots() {
        assert_eq!(ReelStrip::new(0).slots(), 2);
    }
}
