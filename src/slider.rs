//! Infinite slider: a finite item list presented as a wrap-around, snapping track.
//!
//! The track holds every real item plus copies of the last two items before the
//! first one and copies of the first two after the last one:
//!
//! ```text
//! position: -2     -1     0  1 .. N-1   N    N+1
//! item:     N-2    N-1    0  1 .. N-1   0    1
//! ```
//!
//! Stepping past either edge scrolls smoothly onto a copy. Once the host reports that
//! copy as fully visible the slider re-bases with an instant scroll to the real cell
//! holding the same item, which the user cannot see because both cells look the same.

use crate::{error::GalleryError, item::wrap_index, item::GalleryItem};

/// Number of copied cells on each side of the real items.
pub const BOUNDARY_DUPLICATES: usize = 2;

/// Track position of a cell, `-2..=N+1` for galleries that wrap.
pub type ExtendedIndex = isize;

/// Visible ratio at which a cell counts as settled.
const FULLY_VISIBLE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Ask the host to bring a track cell into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub position: ExtendedIndex,
    pub behavior: ScrollBehavior,
}

/// One rendered cell of the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackCell {
    pub position: ExtendedIndex,
    /// Index of the real item this cell shows.
    pub item: usize,
}

impl TrackCell {
    #[inline]
    pub fn is_duplicate(&self, len: usize) -> bool {
        self.position < 0 || self.position >= len as ExtendedIndex
    }
}

/// Visibility report for one cell, the way an intersection observer delivers it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visibility {
    pub position: ExtendedIndex,
    /// Share of the cell inside the viewport, `0.0..=1.0`.
    pub ratio: f32,
}

impl Visibility {
    pub fn fully_visible(position: ExtendedIndex) -> Self {
        Self {
            position,
            ratio: FULLY_VISIBLE,
        }
    }

    pub fn hidden(position: ExtendedIndex) -> Self {
        Self {
            position,
            ratio: 0.0,
        }
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.ratio >= FULLY_VISIBLE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderEvent {
    ScrollTo(ScrollRequest),
    IndexChanged(usize),
}

/// Result of the detection phase of a visibility batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settle {
    Real(usize),
    Duplicate { position: ExtendedIndex, item: usize },
}

#[derive(Debug)]
pub struct InfiniteSlider {
    len: usize,
    track: Vec<TrackCell>,
    index: usize,
    smooth_scrolling: bool,
    // Cell targeted by the last scroll command until the host reports it settled.
    in_flight: Option<ExtendedIndex>,
    last_notified: Option<usize>,
    events: Vec<SliderEvent>,
}

impl InfiniteSlider {
    pub fn initialize<C>(
        items: &[GalleryItem<C>],
        smooth_scrolling: bool,
    ) -> Result<Self, GalleryError> {
        Self::with_len(items.len(), smooth_scrolling)
    }

    pub fn with_len(len: usize, smooth_scrolling: bool) -> Result<Self, GalleryError> {
        if len == 0 {
            return Err(GalleryError::Empty);
        }
        let track = build_track(len);
        log::debug!("slider track built: {} items, {} cells", len, track.len());
        Ok(Self {
            len,
            track,
            index: 0,
            smooth_scrolling,
            in_flight: None,
            last_notified: None,
            events: Vec::new(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// A single item has no neighbours to slide to.
    #[inline]
    pub fn can_navigate(&self) -> bool {
        self.len > 1
    }

    #[inline]
    pub fn get_index(&self) -> usize {
        self.index
    }

    pub fn track(&self) -> &[TrackCell] {
        &self.track
    }

    /// Move to `target`, which may be any integer.
    ///
    /// Targets on a boundary copy scroll onto that copy; the change is reported once the
    /// copy settles and the slider has re-based. Everything else reduces to a real cell.
    pub fn set_index(&mut self, target: i64, disable_smooth: bool) {
        let canonical = wrap_index(target, self.len);
        let position = self.position_for(target);
        self.index = canonical;

        let behavior = if self.smooth_scrolling && !disable_smooth {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        };
        self.scroll_to(position, behavior);

        if (0..self.len as i64).contains(&target) {
            self.notify(canonical);
        }
    }

    /// Move `delta` cells on from the cell the track is heading to.
    ///
    /// Repeated steps before a scroll lands keep going from its target copy, so a quick
    /// right-left at an edge returns to the cell it left instead of sweeping the track.
    pub fn step(&mut self, delta: i64, disable_smooth: bool) {
        if !self.can_navigate() {
            return;
        }
        let target = match self.in_flight {
            Some(from) if self.cell_at(from + delta as ExtendedIndex).is_some() => {
                from as i64 + delta
            }
            _ => self.index as i64 + delta,
        };
        self.set_index(target, disable_smooth);
    }

    /// Feed one batch of visibility reports from the host.
    pub fn on_visibility(&mut self, batch: &[Visibility]) {
        let Some(settle) = self.detect_settle(batch) else {
            return;
        };
        match settle {
            Settle::Real(item) => {
                self.in_flight = None;
                self.index = item;
                self.notify(item);
            }
            Settle::Duplicate { position, item } => {
                log::debug!("settled on copy at {position}, re-basing to {item}");
                self.index = item;
                self.rebase(item);
            }
        }
    }

    /// The last scroll will not be reported; settle on whatever the host shows next.
    pub fn cancel_scroll(&mut self) {
        self.in_flight = None;
    }

    /// Forget the last delivered index so the next change is always reported.
    pub fn reset_notifications(&mut self) {
        self.last_notified = None;
    }

    pub fn drain_events(&mut self) -> Vec<SliderEvent> {
        std::mem::take(&mut self.events)
    }

    /* ───────────────────────── internals ─────────────────────────── */

    fn position_for(&self, target: i64) -> ExtendedIndex {
        if !self.can_navigate() {
            return 0;
        }
        let first = -(BOUNDARY_DUPLICATES as i64);
        let last = (self.len + BOUNDARY_DUPLICATES) as i64;
        if (first..last).contains(&target) {
            target as ExtendedIndex
        } else {
            wrap_index(target, self.len) as ExtendedIndex
        }
    }

    fn cell_at(&self, position: ExtendedIndex) -> Option<&TrackCell> {
        let offset = if self.can_navigate() {
            BOUNDARY_DUPLICATES as ExtendedIndex
        } else {
            0
        };
        let slot = usize::try_from(position + offset).ok()?;
        self.track.get(slot)
    }

    fn detect_settle(&self, batch: &[Visibility]) -> Option<Settle> {
        let mut settled = None;
        let mut on_duplicate = false;

        for entry in batch.iter().filter(|e| e.is_full()) {
            let Some(cell) = self.cell_at(entry.position) else {
                debug_assert!(false, "visibility for unknown cell {}", entry.position);
                log::warn!("ignoring visibility for unknown cell {}", entry.position);
                continue;
            };
            if let Some(target) = self.in_flight {
                if target != cell.position {
                    log::trace!("cell {} passed while scrolling to {target}", cell.position);
                    continue;
                }
            }
            on_duplicate |= cell.is_duplicate(self.len);
            settled = Some(*cell);
        }

        settled.map(|cell| {
            if on_duplicate {
                Settle::Duplicate {
                    position: cell.position,
                    item: cell.item,
                }
            } else {
                Settle::Real(cell.item)
            }
        })
    }

    fn rebase(&mut self, item: usize) {
        self.scroll_to(item as ExtendedIndex, ScrollBehavior::Instant);
        self.notify(item);
    }

    fn scroll_to(&mut self, position: ExtendedIndex, behavior: ScrollBehavior) {
        debug_assert!(self.cell_at(position).is_some());
        self.in_flight = Some(position);
        self.events
            .push(SliderEvent::ScrollTo(ScrollRequest { position, behavior }));
    }

    fn notify(&mut self, index: usize) {
        if self.last_notified == Some(index) {
            return;
        }
        self.last_notified = Some(index);
        log::debug!("slider index -> {index}");
        self.events.push(SliderEvent::IndexChanged(index));
    }
}

fn build_track(len: usize) -> Vec<TrackCell> {
    if len == 1 {
        return vec![TrackCell {
            position: 0,
            item: 0,
        }];
    }
    let first = -(BOUNDARY_DUPLICATES as i64);
    let last = (len + BOUNDARY_DUPLICATES) as i64;
    (first..last)
        .map(|position| TrackCell {
            position: position as ExtendedIndex,
            item: wrap_index(position, len),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slider(len: usize) -> InfiniteSlider {
        InfiniteSlider::with_len(len, true).unwrap()
    }

    fn notifications(slider: &mut InfiniteSlider) -> Vec<usize> {
        slider
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                SliderEvent::IndexChanged(i) => Some(i),
                SliderEvent::ScrollTo(_) => None,
            })
            .collect()
    }

    fn scrolls(slider: &mut InfiniteSlider) -> Vec<ScrollRequest> {
        slider
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                SliderEvent::ScrollTo(r) => Some(r),
                SliderEvent::IndexChanged(_) => None,
            })
            .collect()
    }

    #[test]
    fn empty_gallery_is_rejected() {
        assert_eq!(
            InfiniteSlider::with_len(0, true).unwrap_err(),
            GalleryError::Empty
        );
    }

    #[test]
    fn track_mirrors_two_items_on_each_side() {
        let s = slider(5);
        let layout: Vec<(isize, usize)> = s.track().iter().map(|c| (c.position, c.item)).collect();
        assert_eq!(
            layout,
            vec![(-2, 3), (-1, 4), (0, 0), (1, 1), (2, 2), (3, 3), (4, 4), (5, 0), (6, 1)]
        );
        let copies = s.track().iter().filter(|c| c.is_duplicate(5)).count();
        assert_eq!(copies, 4);
    }

    #[test]
    fn two_item_track_still_wraps() {
        let s = slider(2);
        let items: Vec<usize> = s.track().iter().map(|c| c.item).collect();
        assert_eq!(items, vec![0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn single_item_has_one_cell_and_no_navigation() {
        let mut s = slider(1);
        assert_eq!(s.track().len(), 1);
        assert!(!s.can_navigate());
        s.set_index(7, false);
        assert_eq!(s.get_index(), 0);
        assert_eq!(
            scrolls(&mut s),
            vec![ScrollRequest {
                position: 0,
                behavior: ScrollBehavior::Smooth
            }]
        );
    }

    #[test]
    fn set_index_reduces_any_integer() {
        let mut s = slider(4);
        for k in [-9_i64, -5, -1, 0, 3, 4, 6, 13] {
            s.set_index(k, false);
            assert_eq!(s.get_index(), k.rem_euclid(4) as usize, "k = {k}");
        }
    }

    #[test]
    fn in_range_target_notifies_immediately() {
        let mut s = slider(4);
        s.set_index(2, false);
        let events = s.drain_events();
        assert_eq!(
            events,
            vec![
                SliderEvent::ScrollTo(ScrollRequest {
                    position: 2,
                    behavior: ScrollBehavior::Smooth
                }),
                SliderEvent::IndexChanged(2),
            ]
        );
    }

    #[test]
    fn stepping_past_the_end_scrolls_onto_the_copy_without_notifying() {
        let mut s = slider(4);
        s.set_index(3, true);
        s.drain_events();

        s.set_index(4, false);
        assert_eq!(s.get_index(), 0);
        assert_eq!(
            s.drain_events(),
            vec![SliderEvent::ScrollTo(ScrollRequest {
                position: 4,
                behavior: ScrollBehavior::Smooth
            })]
        );
    }

    #[test]
    fn far_targets_scroll_to_the_real_cell() {
        let mut s = slider(4);
        s.set_index(-7, false);
        assert_eq!(s.get_index(), 1);
        assert_eq!(scrolls(&mut s)[0].position, 1);
    }

    #[test]
    fn disabled_smoothing_scrolls_instantly() {
        let mut s = InfiniteSlider::with_len(3, false).unwrap();
        s.set_index(1, false);
        assert_eq!(scrolls(&mut s)[0].behavior, ScrollBehavior::Instant);

        let mut s = slider(3);
        s.set_index(1, true);
        assert_eq!(scrolls(&mut s)[0].behavior, ScrollBehavior::Instant);
    }

    #[test]
    fn settling_on_a_copy_rebases_instantly_and_notifies_once() {
        let mut s = slider(4);
        s.set_index(3, true);
        s.drain_events();
        s.set_index(4, false);
        s.drain_events();

        s.on_visibility(&[Visibility::hidden(3), Visibility::fully_visible(4)]);
        assert_eq!(s.get_index(), 0);
        assert_eq!(
            s.drain_events(),
            vec![
                SliderEvent::ScrollTo(ScrollRequest {
                    position: 0,
                    behavior: ScrollBehavior::Instant
                }),
                SliderEvent::IndexChanged(0),
            ]
        );

        // the re-based real cell landing is not reported again
        s.on_visibility(&[Visibility::hidden(4), Visibility::fully_visible(0)]);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn stepping_before_the_start_lands_on_the_last_item() {
        let mut s = slider(4);
        s.set_index(0, true);
        s.drain_events();
        s.set_index(-1, false);
        assert_eq!(s.get_index(), 3);
        assert_eq!(scrolls(&mut s)[0].position, -1);

        s.on_visibility(&[Visibility::fully_visible(-1)]);
        assert_eq!(notifications(&mut s), vec![3]);
    }

    #[test]
    fn cells_passed_during_a_scroll_are_ignored() {
        let mut s = slider(6);
        s.set_index(0, true);
        s.drain_events();
        s.set_index(3, false);
        s.drain_events();

        s.on_visibility(&[Visibility::fully_visible(1)]);
        s.on_visibility(&[Visibility::hidden(1), Visibility::fully_visible(2)]);
        assert_eq!(s.get_index(), 3);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn user_scroll_settles_after_cancel() {
        let mut s = slider(4);
        s.set_index(0, true);
        s.drain_events();
        s.cancel_scroll();

        s.on_visibility(&[Visibility::fully_visible(2)]);
        assert_eq!(s.get_index(), 2);
        assert_eq!(notifications(&mut s), vec![2]);

        s.on_visibility(&[Visibility::fully_visible(5)]);
        assert_eq!(s.get_index(), 1);
        assert_eq!(
            s.drain_events(),
            vec![
                SliderEvent::ScrollTo(ScrollRequest {
                    position: 1,
                    behavior: ScrollBehavior::Instant
                }),
                SliderEvent::IndexChanged(1),
            ]
        );
    }

    #[test]
    fn quick_steps_continue_from_the_copy_in_flight() {
        let mut s = slider(4);
        s.set_index(3, true);
        s.drain_events();

        s.step(1, false);
        assert_eq!(scrolls(&mut s)[0].position, 4);
        s.step(1, false);
        assert_eq!(s.get_index(), 1);
        assert_eq!(scrolls(&mut s)[0].position, 5);

        // past the outermost copy the step falls back to the real cell
        s.step(1, false);
        assert_eq!(s.get_index(), 2);
        assert_eq!(scrolls(&mut s)[0].position, 2);
    }

    #[test]
    fn step_back_before_landing_returns_to_the_cell_left() {
        let mut s = slider(4);
        s.set_index(0, true);
        s.drain_events();

        s.step(-1, false);
        assert_eq!(s.get_index(), 3);
        s.step(1, false);
        assert_eq!(s.get_index(), 0);
        assert_eq!(
            s.drain_events(),
            vec![
                SliderEvent::ScrollTo(ScrollRequest {
                    position: -1,
                    behavior: ScrollBehavior::Smooth
                }),
                SliderEvent::ScrollTo(ScrollRequest {
                    position: 0,
                    behavior: ScrollBehavior::Smooth
                }),
            ]
        );
    }

    #[test]
    fn step_after_cancel_starts_from_the_index() {
        let mut s = slider(4);
        s.set_index(3, true);
        s.step(1, false);
        s.cancel_scroll();
        s.drain_events();

        s.step(1, false);
        assert_eq!(s.get_index(), 1);
        assert_eq!(scrolls(&mut s)[0].position, 1);
    }

    #[test]
    fn partially_visible_cells_do_not_settle() {
        let mut s = slider(4);
        s.cancel_scroll();
        s.on_visibility(&[Visibility {
            position: 2,
            ratio: 0.97,
        }]);
        assert_eq!(s.get_index(), 0);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn reset_notifications_repeats_the_current_index() {
        let mut s = slider(4);
        s.set_index(1, true);
        assert_eq!(notifications(&mut s), vec![1]);
        s.set_index(1, true);
        assert!(notifications(&mut s).is_empty());
        s.reset_notifications();
        s.set_index(1, true);
        assert_eq!(notifications(&mut s), vec![1]);
    }
}
