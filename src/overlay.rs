//! Placement of decorative overlays on the trailing digits of a readout.

use rusttype::{point, Font, PositionedGlyph, Scale};

/// Axis-aligned glyph box, `x`/`y` at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl GlyphRect {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Where one overlay element goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPlacement {
    /// Character index in the text the overlay sits on.
    pub char_index: usize,
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

impl OverlayPlacement {
    pub fn rect(&self) -> GlyphRect {
        GlyphRect {
            x: self.center_x - self.width / 2.0,
            y: self.center_y - self.height / 2.0,
            width: self.width,
            height: self.height,
        }
    }
}

/// Bounding boxes of rendered glyphs, by character index.
pub trait GlyphMetrics {
    fn glyph_bounds(&self, char_index: usize) -> Option<GlyphRect>;
}

/// Placements for the last `count` numeric characters of `text`, left to right.
///
/// Returns `None` and logs a warning when there are not enough digits or one
/// of them has no glyph box.
pub fn align_overlays<M: GlyphMetrics + ?Sized>(
    text: &str,
    metrics: &M,
    count: usize,
) -> Option<Vec<OverlayPlacement>> {
    let mut numeric: Vec<usize> = text
        .chars()
        .enumerate()
        .filter(|(_, c)| c.is_ascii_digit())
        .map(|(index, _)| index)
        .collect();

    if numeric.len() < count {
        log::warn!(
            "not enough numeric characters in {text:?} for {count} overlays (found {})",
            numeric.len()
        );
        return None;
    }
    let trailing = numeric.split_off(numeric.len() - count);

    let mut placements = Vec::with_capacity(count);
    for char_index in trailing {
        let Some(bounds) = metrics.glyph_bounds(char_index) else {
            log::warn!("no glyph bounds for character {char_index} of {text:?}");
            return None;
        };
        let (center_x, center_y) = bounds.center();
        placements.push(OverlayPlacement {
            char_index,
            center_x,
            center_y,
            width: bounds.width,
            height: bounds.height,
        });
    }
    Some(placements)
}

/// Glyph boxes of a line of text laid out by rusttype, centered on a point the
/// same way the readout is drawn.
#[derive(Debug, Clone)]
pub struct FontGlyphMetrics {
    bounds: Vec<Option<GlyphRect>>,
}

impl FontGlyphMetrics {
    pub fn centered(font: &Font, text: &str, scale: Scale, x: i32, y: i32) -> Self {
        let v_metrics = font.v_metrics(scale);
        let glyphs: Vec<PositionedGlyph> = font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .collect();
        let (origin_x, origin_y) = centered_origin(&glyphs, x, y);

        let bounds = glyphs
            .iter()
            .map(|glyph| {
                glyph.pixel_bounding_box().map(|bb| GlyphRect {
                    x: (origin_x + bb.min.x) as f32,
                    y: (origin_y + bb.min.y) as f32,
                    width: bb.width() as f32,
                    height: bb.height() as f32,
                })
            })
            .collect();
        Self { bounds }
    }
}

impl GlyphMetrics for FontGlyphMetrics {
    fn glyph_bounds(&self, char_index: usize) -> Option<GlyphRect> {
        self.bounds.get(char_index).copied().flatten()
    }
}

/// Translation that centers the inked area of `glyphs` on `(x, y)`.
pub(crate) fn centered_origin(glyphs: &[PositionedGlyph], x: i32, y: i32) -> (i32, i32) {
    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(min_x, max_x, min_y, max_y), bb| {
            (
                min_x.min(bb.min.x),
                max_x.max(bb.max.x),
                min_y.min(bb.min.y),
                max_y.max(bb.max.y),
            )
        },
    );
    if min_x > max_x {
        return (x, y);
    }
    let width_px = max_x - min_x;
    let height_px = max_y - min_y;
    (x - width_px / 2 - min_x, y - height_px / 2 - min_y)
}
