use std::{
    collections::{HashSet, VecDeque},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use eframe::{egui, egui::TextureHandle, App};
use egui::{Color32, Pos2, Rect, Sense, Vec2};
use ferris_lightbox::{
    gesture::ResetToken, Config, GalleryItem, HostCommand, Key, ModalCoordinator, PointerInput,
    PointerTarget,
};

use crate::load::{self, DecodeOptions, ImgMsg, JobMsg, PathMsg};
use crate::track::TrackView;

/* ───────────────────────── UI tuneables ─────────────────────────── */

const UPLOADS_PER_FRAME: usize = 4;
const PATHS_PER_FRAME: usize = 64;

const TRACK_GAP_PX: f32 = 32.0; // gap between lightbox cells
const TRACK_PAD_PX: f32 = 32.0; // horizontal padding of the viewer
const CAPTION_BAR_PX: f32 = 36.0;
const CAPTION_FONT_PX: f32 = 20.0;
const BUTTON_FONT_PX: f32 = 30.0;
const BUTTON_SIZE_PX: f32 = 48.0;
const WHEEL_STEP_PX: f32 = 60.0; // accumulated wheel travel per page
const STRIP_SCALE: f32 = 2.0; // gallery tiles relative to preview thumbnails
const FULL_UV: Rect = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));

/* ───────────────────────── domain types ─────────────────────────── */

struct ImgEntry {
    path: PathBuf,
    tex: TextureHandle,
    caption: Option<String>,
}

/// What the lightbox frame asked for, applied once the UI closures release `self`.
#[derive(Default)]
struct LightboxInput {
    pointer: Vec<PointerInput>,
    thumbnail: Option<usize>,
    step: i64,
    close: bool,
}

/* ───────────────────────── app state ─────────────────────────────── */

pub struct GalleryApp {
    config: Config,
    images: Vec<ImgEntry>,
    gallery_dirty: bool,

    modal: Option<ModalCoordinator<TextureHandle>>,
    modal_visible: bool,
    track: TrackView,
    track_width: f32,
    thumb_scroll: Option<usize>,
    drag_reset_due: Option<(ResetToken, Instant)>,
    dragging: bool,
    wheel_accum: f32,
    pending_open: Option<PathBuf>,
    last_frame: Instant,

    img_rx: Receiver<ImgMsg>,
    paths_rx: Receiver<PathMsg>,
    paths_tx: Sender<PathMsg>,
    job_tx: Sender<JobMsg>,
    backlog: VecDeque<PathBuf>,
    seen: HashSet<PathBuf>,

    // generation token: bump on every new load
    current_gen: Arc<AtomicU64>,
    current_dir: Option<PathBuf>,

    egui_ctx: egui::Context,
}

impl GalleryApp {
    pub fn new(egui_ctx: egui::Context, config: Config) -> Self {
        let (img_tx, img_rx) = bounded::<ImgMsg>(load::IMG_CHAN_CAP);
        let (paths_tx, paths_rx) = bounded::<PathMsg>(load::PATHS_CHAN_CAP);
        let (job_tx, job_rx) = bounded::<JobMsg>(load::MAX_ENQUEUED_JOBS);
        let current_gen = Arc::new(AtomicU64::new(1));

        load::start_decoder_workers(
            job_rx,
            img_tx,
            egui_ctx.clone(),
            current_gen.clone(),
            DecodeOptions {
                max_dim: config.viewer.decode_max_dim,
                sidecar_captions: config.viewer.sidecar_captions,
            },
        );

        let settle_secs = config.gallery.drag_reset().as_secs_f32();
        Self {
            config,
            images: Vec::new(),
            gallery_dirty: false,
            modal: None,
            modal_visible: false,
            track: TrackView::new(settle_secs),
            track_width: 0.0,
            thumb_scroll: None,
            drag_reset_due: None,
            dragging: false,
            wheel_accum: 0.0,
            pending_open: None,
            last_frame: Instant::now(),
            img_rx,
            paths_rx,
            paths_tx,
            job_tx,
            backlog: VecDeque::new(),
            seen: HashSet::new(),
            current_gen,
            current_dir: None,
            egui_ctx,
        }
    }

    pub fn spawn_loader(&mut self, dir: PathBuf) {
        self.reset_for_new_load();
        self.current_dir = Some(dir.clone());
        let paths_tx = self.paths_tx.clone();
        let ctx = self.egui_ctx.clone();
        std::thread::spawn(move || load::enumerate_paths(dir, paths_tx, ctx));
    }

    /// Load the file's folder and open the lightbox on the file once it is decoded.
    pub fn spawn_loader_file(&mut self, file: PathBuf) {
        match file.parent().map(Path::to_path_buf) {
            Some(parent) => {
                self.spawn_loader(parent);
                self.pending_open = Some(file);
            }
            None => log::warn!("{} has no parent folder", file.display()),
        }
    }

    fn reset_for_new_load(&mut self) {
        self.current_gen.fetch_add(1, Ordering::Relaxed);
        while self.paths_rx.try_recv().is_ok() {}
        while self.img_rx.try_recv().is_ok() {}
        self.images.clear();
        self.backlog.clear();
        self.seen.clear();
        self.modal = None;
        self.modal_visible = false;
        self.gallery_dirty = false;
        self.pending_open = None;
        self.drag_reset_due = None;
        self.dragging = false;
    }

    /* ───────────────────────── loading ───────────────────────────── */

    fn drain_decoded(&mut self, ctx: &egui::Context) {
        for _ in 0..UPLOADS_PER_FRAME {
            let msg = match self.img_rx.try_recv() {
                Ok(msg) => msg,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            };
            let name = msg
                .path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let tex = ctx.load_texture(
                name,
                egui::ColorImage::from_rgba_unmultiplied([msg.width, msg.height], &msg.rgba),
                egui::TextureOptions::default(),
            );
            // Keep gallery order by path regardless of decode order.
            let slot = self
                .images
                .binary_search_by(|e| e.path.cmp(&msg.path))
                .unwrap_or_else(|i| i);
            self.images.insert(
                slot,
                ImgEntry {
                    path: msg.path,
                    tex,
                    caption: msg.caption,
                },
            );
            self.gallery_dirty = true;
        }
    }

    fn drain_paths(&mut self) {
        for _ in 0..PATHS_PER_FRAME {
            match self.paths_rx.try_recv() {
                Ok(p) => {
                    if self.seen.insert(p.clone()) {
                        self.backlog.push_back(p);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let gen = self.current_gen.load(Ordering::Relaxed);
        while let Some(path) = self.backlog.pop_front() {
            if let Err(e) = self.job_tx.try_send((gen, path)) {
                // Queue full: retry next frame.
                self.backlog.push_front(e.into_inner().1);
                break;
            }
        }
    }

    /// Items only change while the lightbox is closed; arrivals wait until then.
    fn sync_gallery(&mut self) {
        if !self.gallery_dirty || self.modal_visible || self.images.is_empty() {
            return;
        }
        let items: Vec<_> = self
            .images
            .iter()
            .map(|e| GalleryItem::new(e.tex.clone(), e.caption.clone()))
            .collect();
        let result = match self.modal.as_mut() {
            Some(modal) => modal.reattach(items),
            None => ModalCoordinator::new(items, self.config.gallery.clone())
                .map(|modal| self.modal = Some(modal)),
        };
        if let Err(e) = result {
            log::warn!("gallery not rebuilt: {e}");
            return;
        }
        self.gallery_dirty = false;

        if let Some(target) = self.pending_open.clone() {
            if let Some(idx) = self.images.iter().position(|e| e.path == target) {
                self.pending_open = None;
                self.open_at(idx);
            }
        }
    }

    /* ───────────────────────── lightbox plumbing ─────────────────── */

    fn open_at(&mut self, index: usize) {
        if let Some(modal) = self.modal.as_mut() {
            modal.open(index as i64);
        }
        self.apply_commands();
    }

    fn apply_commands(&mut self) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };
        for command in modal.drain_commands() {
            match command {
                HostCommand::Show => self.modal_visible = true,
                HostCommand::Hide => {
                    self.modal_visible = false;
                    self.dragging = false;
                    self.drag_reset_due = None;
                    self.track.set_drag_offset(0.0, false);
                }
                HostCommand::ScrollTrack(request) => self.track.scroll_to(request),
                HostCommand::ScrollThumbnail { index } => self.thumb_scroll = Some(index),
                HostCommand::IndexChanged(index) => {
                    if let Some(name) = shown_name(modal, index) {
                        log::debug!("showing {name}");
                    }
                }
                HostCommand::DragOffset { px, animate } => self.track.set_drag_offset(px, animate),
                HostCommand::ScheduleDragReset { token, after } => {
                    self.drag_reset_due = Some((token, Instant::now() + after));
                    self.egui_ctx.request_repaint_after(after);
                }
            }
        }
    }

    /// Timers, animation and visibility reports; runs every frame while open.
    fn tick_lightbox(&mut self, ctx: &egui::Context, input: &egui::InputState) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };

        if input.key_pressed(egui::Key::ArrowLeft) {
            modal.on_key(Key::ArrowLeft);
        }
        if input.key_pressed(egui::Key::ArrowRight) {
            modal.on_key(Key::ArrowRight);
        }
        if input.key_pressed(egui::Key::Escape) {
            modal.on_key(Key::Escape);
        }
        if let Some((token, due)) = self.drag_reset_due {
            if Instant::now() >= due {
                modal.on_drag_reset(token);
                self.drag_reset_due = None;
            }
        }
        self.apply_commands();

        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.track.step(dt);

        if let Some(modal) = self.modal.as_mut() {
            let batch = self.track.visibility_changes(modal.track());
            if !batch.is_empty() {
                modal.on_visibility(&batch);
            }
        }
        self.apply_commands();

        if self.track.is_moving() {
            ctx.request_repaint();
        }
    }

    fn apply_lightbox_input(&mut self, input: LightboxInput) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };
        for pointer in input.pointer {
            modal.on_pointer(pointer, self.track_width);
        }
        if let Some(index) = input.thumbnail {
            modal.on_thumbnail_click(index);
        }
        match input.step {
            s if s < 0 => modal.left(),
            s if s > 0 => modal.right(),
            _ => {}
        }
        if input.close {
            modal.close();
        }
        self.apply_commands();
    }

    /* ───────────────────────── drawing ───────────────────────────── */

    fn show_lightbox(&mut self, ctx: &egui::Context, input: &egui::InputState) -> LightboxInput {
        let mut out = LightboxInput::default();
        let Some(modal) = self.modal.as_ref() else {
            return out;
        };
        let thumb_h = self.config.viewer.thumbnail_height;
        let backdrop = egui::Frame::none().fill(Color32::from_black_alpha(235));

        egui::TopBottomPanel::bottom("preview")
            .frame(backdrop)
            .exact_height(thumb_h + 16.0)
            .show(ctx, |ui| {
                egui::ScrollArea::horizontal()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.horizontal_centered(|ui| {
                            for (i, item) in modal.items().iter().enumerate() {
                                let size = fit_height(item.content.size_vec2(), thumb_h);
                                let (rect, resp) = ui.allocate_exact_size(size, Sense::click());
                                ui.painter().image(item.content.id(), rect, FULL_UV, Color32::WHITE);
                                if modal.preview_active() == Some(i) {
                                    ui.painter().rect_stroke(
                                        rect.expand(2.0),
                                        6.0,
                                        egui::Stroke::new(2.0, Color32::WHITE),
                                    );
                                }
                                if self.thumb_scroll == Some(i) {
                                    resp.scroll_to_me(Some(egui::Align::Center));
                                }
                                if resp.clicked() {
                                    out.thumbnail = Some(i);
                                }
                            }
                        });
                    });
            });

        egui::TopBottomPanel::bottom("caption")
            .frame(backdrop)
            .exact_height(CAPTION_BAR_PX)
            .show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new(modal.caption().unwrap_or_default())
                            .size(CAPTION_FONT_PX)
                            .color(Color32::WHITE),
                    );
                });
            });

        egui::CentralPanel::default().frame(backdrop).show(ctx, |ui| {
            let avail = ui.available_rect_before_wrap().shrink2(Vec2::new(TRACK_PAD_PX, 0.0));
            if avail.width() <= 0.0 || avail.height() <= 0.0 {
                return;
            }
            self.track_width = avail.width();
            let painter = ui.painter().with_clip_rect(avail);
            let stride = avail.width() + TRACK_GAP_PX;

            let mut content_rects = Vec::new();
            for cell in modal.track() {
                let dx = (cell.position as f32 - self.track.position()) * stride
                    + self.track.drag_offset();
                if dx.abs() >= stride {
                    continue;
                }
                let tex = &modal.items()[cell.item].content;
                let fit = fit_within(tex.size_vec2(), avail.size());
                let rect = Rect::from_center_size(avail.center() + Vec2::new(dx, 0.0), fit);
                painter.image(tex.id(), rect, FULL_UV, Color32::WHITE);
                content_rects.push(rect);
            }

            let button = |text: &str| {
                egui::Button::new(
                    egui::RichText::new(text)
                        .size(BUTTON_FONT_PX)
                        .color(Color32::WHITE),
                )
                .frame(false)
            };
            let side = Vec2::splat(BUTTON_SIZE_PX);
            let close_rect = Rect::from_min_size(
                Pos2::new(avail.right() - BUTTON_SIZE_PX, avail.top()),
                side,
            );
            let left_rect = Rect::from_center_size(
                Pos2::new(avail.left() + BUTTON_SIZE_PX / 2.0, avail.center().y),
                side,
            );
            let right_rect = Rect::from_center_size(
                Pos2::new(avail.right() - BUTTON_SIZE_PX / 2.0, avail.center().y),
                side,
            );
            if ui.put(close_rect, button("X")).clicked() {
                out.close = true;
            }
            let navigable = modal.can_navigate();
            if ui.add_enabled_ui(navigable, |ui| ui.put(left_rect, button("<"))).inner.clicked() {
                out.step = -1;
            }
            if ui.add_enabled_ui(navigable, |ui| ui.put(right_rect, button(">"))).inner.clicked() {
                out.step = 1;
            }

            // One page per wheel gesture over the track; the strip scrolls itself.
            let over_track = input.pointer.hover_pos().is_some_and(|p| avail.contains(p));
            let wheel = input.raw_scroll_delta.x + input.raw_scroll_delta.y;
            let step = wheel_page(
                &mut self.wheel_accum,
                wheel,
                over_track && !self.track.is_moving(),
            );
            if step != 0 {
                out.step = step;
            }

            let on_button =
                |p: Pos2| close_rect.contains(p) || left_rect.contains(p) || right_rect.contains(p);
            if input.pointer.primary_pressed() {
                if let Some(p) = input.pointer.interact_pos() {
                    if avail.contains(p) && !on_button(p) {
                        let target = if content_rects.iter().any(|r| r.contains(p)) {
                            PointerTarget::Content
                        } else {
                            PointerTarget::Background
                        };
                        out.pointer.push(PointerInput::Down { x: p.x, target });
                        self.dragging = target == PointerTarget::Content;
                    }
                }
            } else if self.dragging {
                if input.pointer.primary_released() {
                    out.pointer.push(PointerInput::Up);
                    self.dragging = false;
                } else if let Some(p) = input.pointer.interact_pos() {
                    if input.pointer.delta().x != 0.0 {
                        out.pointer.push(PointerInput::Move { x: p.x });
                    }
                }
            }
            if self.dragging {
                ctx.set_cursor_icon(egui::CursorIcon::Grabbing);
            }
        });

        self.thumb_scroll = None;
        out
    }

    fn show_gallery(&mut self, ctx: &egui::Context) -> Option<usize> {
        let mut clicked = None;

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open folder...").clicked() {
                    if let Some(d) = rfd::FileDialog::new().pick_folder() {
                        self.spawn_loader(d);
                    }
                }
                ui.separator();
                if let Some(dir) = &self.current_dir {
                    ui.label(format!("{}", dir.display()));
                    ui.separator();
                }
                ui.label(format!("{} images", self.images.len()));
            });
        });

        let tile_h = self.config.viewer.thumbnail_height * STRIP_SCALE;
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.images.is_empty() {
                ui.centered_and_justified(|ui| ui.label("Open a folder of images"));
                return;
            }
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        for (i, entry) in self.images.iter().enumerate() {
                            let size = fit_height(entry.tex.size_vec2(), tile_h);
                            let (rect, resp) = ui.allocate_exact_size(size, Sense::click());
                            ui.painter().image(entry.tex.id(), rect, FULL_UV, Color32::WHITE);
                            let resp = resp.on_hover_cursor(egui::CursorIcon::PointingHand);
                            let resp = match entry.caption.as_deref() {
                                Some(caption) => resp.on_hover_text(caption),
                                None => resp,
                            };
                            if resp.clicked() {
                                clicked = Some(i);
                            }
                        }
                    });
                });
        });

        clicked
    }
}

/* ─────────────────── eframe integration ───────────────────────── */
impl App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        let input = ctx.input(|i| i.clone());

        self.drain_decoded(ctx);
        self.drain_paths();
        self.sync_gallery();
        if !self.backlog.is_empty() {
            ctx.request_repaint();
        }

        if self.modal_visible {
            self.tick_lightbox(ctx, &input);
            let lightbox_input = self.show_lightbox(ctx, &input);
            self.apply_lightbox_input(lightbox_input);
        } else if let Some(index) = self.show_gallery(ctx) {
            self.open_at(index);
        }

        self.last_frame = Instant::now();
    }
}

/* ───────────────────────── helpers ──────────────────────────── */

/// Texture name of the lightbox item at `index`; `images` may have grown since attach.
fn shown_name(modal: &ModalCoordinator<TextureHandle>, index: usize) -> Option<String> {
    modal.items().get(index).map(|item| item.content.name())
}

/// Sum wheel travel into at most one page; any pause in eligibility starts over.
fn wheel_page(accum: &mut f32, delta: f32, eligible: bool) -> i64 {
    if !eligible {
        *accum = 0.0;
        return 0;
    }
    *accum += delta;
    if accum.abs() < WHEEL_STEP_PX {
        return 0;
    }
    let step = if *accum > 0.0 { -1 } else { 1 };
    *accum = 0.0;
    step
}

fn fit_height(size: Vec2, height: f32) -> Vec2 {
    if size.y <= 0.0 {
        return Vec2::splat(height);
    }
    Vec2::new(size.x * height / size.y, height)
}

/// Largest size with `size`'s aspect ratio inside `bounds`, never upscaled.
fn fit_within(size: Vec2, bounds: Vec2) -> Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return Vec2::ZERO;
    }
    let fit = (bounds.x / size.x).min(bounds.y / size.y).min(1.0);
    size * fit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_within_scales_down_only() {
        assert_eq!(
            fit_within(Vec2::new(4000.0, 2000.0), Vec2::new(1000.0, 1000.0)),
            Vec2::new(1000.0, 500.0)
        );
        assert_eq!(
            fit_within(Vec2::new(300.0, 200.0), Vec2::new(1000.0, 1000.0)),
            Vec2::new(300.0, 200.0)
        );
        assert_eq!(fit_within(Vec2::ZERO, Vec2::splat(10.0)), Vec2::ZERO);
    }

    #[test]
    fn trackpad_stream_pages_once_per_threshold() {
        let mut accum = 0.0;
        let pages: Vec<i64> = (0..10).map(|_| wheel_page(&mut accum, -10.0, true)).collect();
        assert_eq!(pages.iter().filter(|&&p| p != 0).count(), 1);
        assert_eq!(pages[5], 1);

        assert_eq!(wheel_page(&mut accum, 120.0, true), -1);
    }

    #[test]
    fn wheel_outside_the_track_never_pages() {
        let mut accum = 0.0;
        for _ in 0..20 {
            assert_eq!(wheel_page(&mut accum, -40.0, false), 0);
        }
        assert_eq!(accum, 0.0);
        assert_eq!(wheel_page(&mut accum, -40.0, true), 0);
    }

    #[test]
    fn shown_name_follows_the_attached_items() {
        let ctx = egui::Context::default();
        let tex = |name: &str| {
            ctx.load_texture(
                name,
                egui::ColorImage::new([1, 1], Color32::BLACK),
                egui::TextureOptions::default(),
            )
        };
        let items = vec![
            GalleryItem::without_caption(tex("b.png")),
            GalleryItem::without_caption(tex("c.png")),
        ];
        let modal = ModalCoordinator::new(items, Default::default()).unwrap();

        // a later decode sorting first in `images` does not shift the lightbox
        let _late = tex("a.png");
        assert_eq!(shown_name(&modal, 0).as_deref(), Some("b.png"));
        assert_eq!(shown_name(&modal, 1).as_deref(), Some("c.png"));
        assert_eq!(shown_name(&modal, 2), None);
    }

    #[test]
    fn fit_height_keeps_aspect() {
        assert_eq!(
            fit_height(Vec2::new(1600.0, 900.0), 90.0),
            Vec2::new(160.0, 90.0)
        );
    }
}
