//! Lightbox coordinator: slider, preview strip, caption and drag controller behind
//! one command surface.
//!
//! The host forwards user input here and executes the [`HostCommand`]s it drains
//! afterwards. Index changes always flow slider → caption/preview; nothing but the
//! slider writes the index.

use std::time::Duration;

use crate::{
    config::{GalleryConfig, ThumbnailTransition},
    error::GalleryError,
    gesture::{DragController, DragState, GestureEvent, PointerInput, ResetToken},
    item::{cyclic_delta, GalleryItem},
    preview::{PreviewEvent, PreviewStrip},
    slider::{InfiniteSlider, ScrollRequest, SliderEvent, TrackCell, Visibility},
};

/// Keys the lightbox reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
}

/// Work for the host to carry out, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCommand {
    Show,
    Hide,
    ScrollTrack(ScrollRequest),
    ScrollThumbnail { index: usize },
    IndexChanged(usize),
    DragOffset { px: f32, animate: bool },
    ScheduleDragReset { token: ResetToken, after: Duration },
}

#[derive(Debug)]
pub struct ModalCoordinator<C> {
    items: Vec<GalleryItem<C>>,
    slider: InfiniteSlider,
    preview: PreviewStrip,
    drag: DragController,
    config: GalleryConfig,
    open: bool,
    caption_index: usize,
    commands: Vec<HostCommand>,
}

impl<C> ModalCoordinator<C> {
    pub fn new(items: Vec<GalleryItem<C>>, config: GalleryConfig) -> Result<Self, GalleryError> {
        let slider = InfiniteSlider::initialize(&items, config.smooth_scrolling)?;
        let preview = PreviewStrip::initialize(&items)?;
        let drag = DragController::new(&config);
        log::info!("gallery attached with {} items", items.len());
        Ok(Self {
            items,
            slider,
            preview,
            drag,
            config,
            open: false,
            caption_index: 0,
            commands: Vec::new(),
        })
    }

    /// Replace the whole item set. The modal is closed first.
    pub fn reattach(&mut self, items: Vec<GalleryItem<C>>) -> Result<(), GalleryError> {
        let slider = InfiniteSlider::initialize(&items, self.config.smooth_scrolling)?;
        let preview = PreviewStrip::initialize(&items)?;
        if self.open {
            self.close();
        }
        self.items = items;
        self.slider = slider;
        self.preview = preview;
        self.caption_index = 0;
        log::info!("gallery re-attached with {} items", self.items.len());
        Ok(())
    }

    /* ───────────────────────── queries ───────────────────────────── */

    pub fn items(&self) -> &[GalleryItem<C>] {
        &self.items
    }

    pub fn track(&self) -> &[TrackCell] {
        self.slider.track()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    pub fn get_index(&self) -> usize {
        self.slider.get_index()
    }

    pub fn can_navigate(&self) -> bool {
        self.slider.can_navigate()
    }

    pub fn caption(&self) -> Option<&str> {
        self.items
            .get(self.caption_index)
            .and_then(|item| item.caption.as_deref())
    }

    pub fn preview_active(&self) -> Option<usize> {
        self.preview.active()
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /* ───────────────────────── commands ──────────────────────────── */

    pub fn open(&mut self, index: i64) {
        if !self.open {
            self.open = true;
            self.commands.push(HostCommand::Show);
        }
        self.slider.reset_notifications();
        self.slider.set_index(index, true);
        self.pump();
        // Views follow the canonical index even when the slider stays silent,
        // e.g. when the target was reduced from out of range.
        let current = self.slider.get_index();
        if self.caption_index != current || self.preview.active() != Some(current) {
            self.sync_views(current);
            self.pump();
        }
    }

    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.drag.detach();
        // The host stops reporting visibility while hidden.
        self.slider.cancel_scroll();
        self.commands.push(HostCommand::Hide);
    }

    pub fn left(&mut self) {
        self.step(-1);
    }

    pub fn right(&mut self) {
        self.step(1);
    }

    pub fn set_index(&mut self, index: i64, disable_smooth: bool) {
        self.slider.set_index(index, disable_smooth);
        self.pump();
    }

    /* ───────────────────────── input routing ─────────────────────── */

    pub fn on_key(&mut self, key: Key) {
        if !self.open {
            return;
        }
        match key {
            Key::ArrowLeft => self.left(),
            Key::ArrowRight => self.right(),
            Key::Escape => self.close(),
        }
    }

    pub fn on_pointer(&mut self, input: PointerInput, viewport_width: f32) {
        if !self.open {
            return;
        }
        self.drag.handle(input, viewport_width);
        self.pump();
    }

    pub fn on_drag_reset(&mut self, token: ResetToken) {
        self.drag.reset_elapsed(token);
    }

    pub fn on_visibility(&mut self, batch: &[Visibility]) {
        if !self.open {
            return;
        }
        self.slider.on_visibility(batch);
        self.pump();
    }

    pub fn on_thumbnail_click(&mut self, index: usize) {
        if !self.open {
            return;
        }
        self.preview.click(index);
        self.pump();
    }

    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    /* ───────────────────────── internals ─────────────────────────── */

    fn step(&mut self, delta: i64) {
        if !self.open || !self.slider.can_navigate() {
            return;
        }
        self.slider.step(delta, false);
        self.pump();
    }

    fn navigate_to(&mut self, requested: usize) {
        let current = self.slider.get_index();
        match self.config.thumbnail_transition {
            ThumbnailTransition::Directional => self.slider.set_index(requested as i64, false),
            ThumbnailTransition::Neutral => self.slider.set_index(requested as i64, true),
            ThumbnailTransition::AdjacentDirectional => {
                let delta = cyclic_delta(current, requested, self.slider.len());
                if delta.abs() == 1 {
                    self.slider.set_index(current as i64 + delta, false);
                } else {
                    self.slider.set_index(requested as i64, true);
                }
            }
        }
    }

    fn sync_views(&mut self, index: usize) {
        self.caption_index = index;
        self.preview.set_index(index as i64);
    }

    /// Route component events until every queue is empty.
    fn pump(&mut self) {
        loop {
            let slider_events = self.slider.drain_events();
            let preview_events = self.preview.drain_events();
            let gesture_events = self.drag.drain_events();
            if slider_events.is_empty() && preview_events.is_empty() && gesture_events.is_empty()
            {
                break;
            }

            for event in slider_events {
                match event {
                    SliderEvent::ScrollTo(request) => {
                        self.commands.push(HostCommand::ScrollTrack(request));
                    }
                    SliderEvent::IndexChanged(index) => {
                        self.sync_views(index);
                        self.commands.push(HostCommand::IndexChanged(index));
                    }
                }
            }

            for event in preview_events {
                match event {
                    PreviewEvent::ScrollIntoView { index } => {
                        self.commands.push(HostCommand::ScrollThumbnail { index });
                    }
                    PreviewEvent::IndexRequested(index) => self.navigate_to(index),
                }
            }

            for event in gesture_events {
                match event {
                    GestureEvent::Offset { px, animate } => {
                        self.commands.push(HostCommand::DragOffset { px, animate });
                    }
                    GestureEvent::Step(delta) => self.step(delta),
                    GestureEvent::CloseRequested => self.close(),
                    GestureEvent::ScheduleReset { token, after } => {
                        self.commands
                            .push(HostCommand::ScheduleDragReset { token, after });
                    }
                }
            }
        }
    }
}
