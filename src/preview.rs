//! Thumbnail strip mirroring the slider's index.

use crate::{error::GalleryError, item::wrap_index, item::GalleryItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewEvent {
    /// Center this thumbnail in the strip (smooth).
    ScrollIntoView { index: usize },
    /// The user clicked a thumbnail.
    IndexRequested(usize),
}

/// Never owns the canonical index; it shows whatever it was last told.
#[derive(Debug)]
pub struct PreviewStrip {
    len: usize,
    active: Option<usize>,
    events: Vec<PreviewEvent>,
}

impl PreviewStrip {
    pub fn initialize<C>(items: &[GalleryItem<C>]) -> Result<Self, GalleryError> {
        Self::with_len(items.len())
    }

    pub fn with_len(len: usize) -> Result<Self, GalleryError> {
        if len == 0 {
            return Err(GalleryError::Empty);
        }
        Ok(Self {
            len,
            active: None,
            events: Vec::new(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    #[inline]
    pub fn is_active(&self, index: usize) -> bool {
        self.active == Some(index)
    }

    pub fn set_index(&mut self, index: i64) {
        let index = wrap_index(index, self.len);
        self.active = Some(index);
        self.events.push(PreviewEvent::ScrollIntoView { index });
    }

    pub fn click(&mut self, index: usize) {
        if index >= self.len {
            debug_assert!(false, "thumbnail {index} out of {}", self.len);
            log::warn!("dropping click on missing thumbnail {index}");
            return;
        }
        self.events.push(PreviewEvent::IndexRequested(index));
    }

    pub fn drain_events(&mut self) -> Vec<PreviewEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_thumbnail_is_active() {
        let mut strip = PreviewStrip::with_len(4).unwrap();
        assert_eq!(strip.active(), None);
        strip.set_index(1);
        strip.set_index(2);
        let active: Vec<usize> = (0..4).filter(|&i| strip.is_active(i)).collect();
        assert_eq!(active, vec![2]);
    }

    #[test]
    fn set_index_reduces_and_scrolls() {
        let mut strip = PreviewStrip::with_len(4).unwrap();
        strip.set_index(-1);
        assert_eq!(strip.active(), Some(3));
        assert_eq!(
            strip.drain_events(),
            vec![PreviewEvent::ScrollIntoView { index: 3 }]
        );
    }

    #[test]
    fn click_requests_without_changing_active() {
        let mut strip = PreviewStrip::with_len(3).unwrap();
        strip.set_index(0);
        strip.drain_events();
        strip.click(2);
        assert_eq!(strip.active(), Some(0));
        assert_eq!(strip.drain_events(), vec![PreviewEvent::IndexRequested(2)]);
    }

    #[test]
    fn empty_strip_is_rejected() {
        assert_eq!(PreviewStrip::with_len(0).unwrap_err(), GalleryError::Empty);
    }
}
