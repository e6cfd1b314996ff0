#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;
mod load;
mod track;

use std::{env, path::PathBuf};

use eframe::{egui::ViewportBuilder, NativeOptions};
use ferris_lightbox::Config;

use crate::gui::GalleryApp;

/* ───────────────────────── program entry ─────────────────────────── */

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load();
    let start_path = env::args().nth(1).map(PathBuf::from);

    let mut opts = NativeOptions::default();
    opts.viewport = ViewportBuilder::default()
        .with_inner_size([1280.0, 800.0])
        .with_min_inner_size([480.0, 360.0])
        .with_decorations(true);

    eframe::run_native(
        "Ferris Lightbox",
        opts,
        Box::new(move |cc| {
            let mut app = GalleryApp::new(cc.egui_ctx.clone(), config);
            match &start_path {
                Some(p) if p.is_file() => app.spawn_loader_file(p.clone()),
                Some(p) if p.is_dir() => app.spawn_loader(p.clone()),
                Some(p) => log::warn!("{} is neither a file nor a folder", p.display()),
                None => {}
            }
            Box::new(app)
        }),
    )
}
