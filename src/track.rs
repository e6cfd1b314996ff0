//! Scroll state of the lightbox's main track, in cell units.
//!
//! Stands in for a scroll-snapping container: it eases toward the cell the slider
//! asked for and reports cells entering or leaving the fully visible state, which is
//! all the slider needs to detect a settle.

use ferris_lightbox::{ExtendedIndex, ScrollBehavior, ScrollRequest, TrackCell, Visibility};

/* ───────────────────────── tuneables ───────────────────────────── */

const TRACK_OMEGA: f32 = 14.0; // responsiveness (larger = snappier)
const TRACK_SNAP_EPS: f32 = 0.002; // cells; closer than this counts as landed
const DRAG_SNAP_EPS_PX: f32 = 0.5;

#[derive(Debug)]
pub struct TrackView {
    pos: f32,
    target: f32,
    fully_visible: Option<ExtendedIndex>,
    // A scroll was requested; its landing is reported even on the cell already shown.
    report_landing: bool,
    drag_px: f32,
    drag_target_px: f32,
    // Seconds the snap-back animation should roughly take.
    drag_settle_secs: f32,
}

impl TrackView {
    pub fn new(drag_settle_secs: f32) -> Self {
        Self {
            pos: 0.0,
            target: 0.0,
            fully_visible: None,
            report_landing: false,
            drag_px: 0.0,
            drag_target_px: 0.0,
            drag_settle_secs,
        }
    }

    /// Fractional track position centered in the viewport.
    #[inline]
    pub fn position(&self) -> f32 {
        self.pos
    }

    /// Horizontal translation applied while dragging.
    #[inline]
    pub fn drag_offset(&self) -> f32 {
        self.drag_px
    }

    pub fn is_moving(&self) -> bool {
        (self.target - self.pos).abs() > TRACK_SNAP_EPS
            || (self.drag_target_px - self.drag_px).abs() > DRAG_SNAP_EPS_PX
    }

    pub fn scroll_to(&mut self, request: ScrollRequest) {
        self.target = request.position as f32;
        if request.behavior == ScrollBehavior::Instant {
            self.pos = self.target;
        }
        self.report_landing = true;
    }

    pub fn set_drag_offset(&mut self, px: f32, animate: bool) {
        self.drag_target_px = px;
        if !animate {
            self.drag_px = px;
        }
    }

    /// Advance animations by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, 0.25);

        let alpha = 1.0 - (-TRACK_OMEGA * dt).exp();
        self.pos += (self.target - self.pos) * alpha;
        if (self.target - self.pos).abs() <= TRACK_SNAP_EPS {
            self.pos = self.target;
        }

        // ~5 time constants within the snap-back duration
        let omega = 5.0 / self.drag_settle_secs.max(0.016);
        let beta = 1.0 - (-omega * dt).exp();
        self.drag_px += (self.drag_target_px - self.drag_px) * beta;
        if (self.drag_target_px - self.drag_px).abs() <= DRAG_SNAP_EPS_PX {
            self.drag_px = self.drag_target_px;
        }
    }

    /// Visibility entries for cells whose fully-visible state changed since last call.
    pub fn visibility_changes(&mut self, cells: &[TrackCell]) -> Vec<Visibility> {
        let now = cells
            .iter()
            .map(|c| c.position)
            .find(|&p| (p as f32 - self.pos).abs() <= TRACK_SNAP_EPS);
        let landed_again = self.report_landing && now.is_some();
        if now == self.fully_visible && !landed_again {
            return Vec::new();
        }

        let mut batch = Vec::with_capacity(2);
        if let Some(prev) = self.fully_visible.filter(|&p| Some(p) != now) {
            batch.push(Visibility {
                position: prev,
                ratio: self.ratio(prev),
            });
        }
        if let Some(cur) = now {
            batch.push(Visibility::fully_visible(cur));
            self.report_landing = false;
        }
        self.fully_visible = now;
        batch
    }

    fn ratio(&self, position: ExtendedIndex) -> f32 {
        (1.0 - (position as f32 - self.pos).abs()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(len: usize) -> Vec<TrackCell> {
        (-2..(len as isize + 2))
            .map(|p| TrackCell {
                position: p,
                item: p.rem_euclid(len as isize) as usize,
            })
            .collect()
    }

    fn run_until_still(track: &mut TrackView) {
        for _ in 0..600 {
            track.step(1.0 / 60.0);
            if !track.is_moving() {
                break;
            }
        }
    }

    #[test]
    fn instant_scroll_lands_immediately() {
        let mut t = TrackView::new(0.25);
        t.scroll_to(ScrollRequest {
            position: 3,
            behavior: ScrollBehavior::Instant,
        });
        assert_eq!(t.position(), 3.0);
        assert_eq!(t.visibility_changes(&cells(4)), vec![Visibility::fully_visible(3)]);
        assert!(t.visibility_changes(&cells(4)).is_empty());
    }

    #[test]
    fn smooth_scroll_reports_only_on_landing() {
        let mut t = TrackView::new(0.25);
        t.visibility_changes(&cells(4));
        t.scroll_to(ScrollRequest {
            position: 1,
            behavior: ScrollBehavior::Smooth,
        });
        t.step(1.0 / 60.0);
        let mid = t.visibility_changes(&cells(4));
        assert_eq!(mid.len(), 1);
        assert!(mid[0].ratio < 1.0);

        run_until_still(&mut t);
        assert_eq!(t.position(), 1.0);
        assert_eq!(t.visibility_changes(&cells(4)), vec![Visibility::fully_visible(1)]);
    }

    #[test]
    fn repeated_scroll_to_current_cell_is_reported_again() {
        let mut t = TrackView::new(0.25);
        let request = ScrollRequest {
            position: 0,
            behavior: ScrollBehavior::Instant,
        };
        t.scroll_to(request);
        assert_eq!(t.visibility_changes(&cells(3)).len(), 1);
        t.scroll_to(request);
        assert_eq!(t.visibility_changes(&cells(3)), vec![Visibility::fully_visible(0)]);
    }

    #[test]
    fn drag_offset_follows_then_eases_back() {
        let mut t = TrackView::new(0.25);
        t.set_drag_offset(-180.0, false);
        assert_eq!(t.drag_offset(), -180.0);
        t.set_drag_offset(0.0, true);
        assert!(t.is_moving());
        run_until_still(&mut t);
        assert_eq!(t.drag_offset(), 0.0);
    }
}
