use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, OnceLock,
    },
};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use image::{DynamicImage, ImageReader};

/* ───────────────────────── channel types / caps ─────────────────── */

/// Decoded image ready for texture upload.
pub struct ImgMsg {
    pub path: PathBuf,
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
    pub caption: Option<String>,
}

/// (generation_id, path); workers drop jobs whose gen_id != current
pub type JobMsg = (u64, PathBuf);
/// discovered path
pub type PathMsg = PathBuf;

pub const IMG_CHAN_CAP: usize = 256;
pub const PATHS_CHAN_CAP: usize = 4096;
pub const MAX_ENQUEUED_JOBS: usize = 1024;

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "gif", "tiff", "webp"];

/// Settings shared by every decoder worker.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    pub max_dim: u32,
    pub sidecar_captions: bool,
}

/* ───────────────────────── helpers ──────────────────────────────── */

pub fn is_img_ext(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// Caption from `photo.jpg.txt`, falling back to `photo.txt`.
pub fn read_caption(path: &Path) -> Option<String> {
    let mut full = path.as_os_str().to_owned();
    full.push(".txt");
    let candidates = [PathBuf::from(full), path.with_extension("txt")];

    candidates.iter().filter(|p| p.is_file()).find_map(|p| {
        match std::fs::read_to_string(p) {
            Ok(text) => Some(text.trim().to_owned()).filter(|t| !t.is_empty()),
            Err(e) => {
                log::debug!("caption {} unreadable: {e}", p.display());
                None
            }
        }
    })
}

#[inline]
fn scaled_dimensions(w: u32, h: u32, max_dim: u32) -> (u32, u32) {
    if w >= h {
        let ratio = max_dim as f32 / w as f32;
        let nh = ((h as f32) * ratio).round().max(1.0) as u32;
        (max_dim, nh)
    } else {
        let ratio = max_dim as f32 / h as f32;
        let nw = ((w as f32) * ratio).round().max(1.0) as u32;
        (nw, max_dim)
    }
}

/* ───────────────────────── decoding / workers ───────────────────── */

fn decode_image(path: &Path) -> image::ImageResult<DynamicImage> {
    ImageReader::open(path)?.with_guessed_format()?.decode()
}

fn decode_path_to_msg(path: &Path, opts: DecodeOptions) -> image::ImageResult<ImgMsg> {
    use image::imageops::FilterType;

    let mut img = decode_image(path)?;
    let (w, h) = (img.width(), img.height());
    if opts.max_dim > 0 && w.max(h) > opts.max_dim {
        let (nw, nh) = scaled_dimensions(w, h, opts.max_dim);
        img = img.resize(nw, nh, FilterType::Triangle);
    }

    let rgba = img.to_rgba8();
    Ok(ImgMsg {
        path: path.to_path_buf(),
        width: rgba.width() as usize,
        height: rgba.height() as usize,
        rgba: rgba.into_raw(),
        caption: opts
            .sidecar_captions
            .then(|| read_caption(path))
            .flatten(),
    })
}

#[inline]
fn suggested_decoder_threads() -> usize {
    let logical = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    ((logical * 3) / 4).clamp(2, 12)
}

/* Global Rayon decoder pool (one-time init) */
static DECODER_POOL_INIT: OnceLock<usize> = OnceLock::new();

fn init_decoder_pool() -> usize {
    *DECODER_POOL_INIT.get_or_init(|| {
        let threads = suggested_decoder_threads();
        let built = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("decoder-{i}"))
            .start_handler(|_| {
                #[cfg(windows)]
                unsafe {
                    use winapi::um::processthreadsapi::{GetCurrentThread, SetThreadPriority};
                    use winapi::um::winbase::THREAD_PRIORITY_BELOW_NORMAL;
                    let _ =
                        SetThreadPriority(GetCurrentThread(), THREAD_PRIORITY_BELOW_NORMAL as i32);
                }
            })
            .build_global();
        if let Err(e) = built {
            log::warn!("decoder pool already initialised elsewhere: {e}");
        }
        threads
    })
}

/// Spawn long-lived decode workers on the global pool.
pub fn start_decoder_workers(
    job_rx: Receiver<JobMsg>,
    img_tx: Sender<ImgMsg>,
    egui_ctx: egui::Context,
    current_gen: Arc<AtomicU64>,
    opts: DecodeOptions,
) {
    let workers = init_decoder_pool();
    log::debug!("starting {workers} decoder workers");

    for _ in 0..workers {
        let rx = job_rx.clone();
        let tx = img_tx.clone();
        let ctx = egui_ctx.clone();
        let gen = current_gen.clone();

        rayon::spawn(move || {
            while let Ok((job_gen, path)) = rx.recv() {
                // Drop stale work (generation bumped on new loads)
                if job_gen != gen.load(Ordering::Relaxed) {
                    continue;
                }
                match decode_path_to_msg(&path, opts) {
                    Ok(msg) => {
                        if job_gen != gen.load(Ordering::Relaxed) {
                            continue;
                        }
                        if tx.send(msg).is_err() {
                            break;
                        }
                        ctx.request_repaint();
                    }
                    Err(e) => log::warn!("skipping {}: {e}", path.display()),
                }
            }
        });
    }
}

/* ───────────────────────── filesystem enumeration ───────────────── */

pub fn enumerate_paths(dir: PathBuf, paths_tx: Sender<PathMsg>, egui_ctx: egui::Context) {
    use jwalk::{Parallelism, WalkDir};

    let logical = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    let walker_threads = logical.saturating_div(2).clamp(1, 4);

    let mut found = 0usize;
    for entry in WalkDir::new(&dir)
        .follow_links(false)
        .sort(true)
        .skip_hidden(true)
        .parallelism(Parallelism::RayonNewPool(walker_threads))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::debug!("walk error under {}: {e}", dir.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !is_img_ext(&path) {
            continue;
        }
        if paths_tx.send(path).is_err() {
            return;
        }
        found += 1;
        if found % 64 == 0 {
            egui_ctx.request_repaint();
        }
    }
    log::info!("found {found} images under {}", dir.display());
    egui_ctx.request_repaint();
}
