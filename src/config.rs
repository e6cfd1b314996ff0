//! User configuration for the lightbox and the desktop host.
//!
//! Loaded from `<config dir>/ferris-lightbox/config.toml`; every key is optional.
//!
//! ```toml
//! [gallery]
//! smooth_scrolling = true
//! swipe_threshold = 0.2
//! drag_reset_ms = 250
//! swipe_direction = "natural"          # or "inverted"
//! thumbnail_transition = "directional" # or "neutral", "adjacent-directional"
//!
//! [viewer]
//! decode_max_dim = 2560
//! thumbnail_height = 96.0
//! sidecar_captions = true
//! ```

use std::{path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::error::ConfigError;

/* ───────────────────────── defaults ─────────────────────────────── */

const DEFAULT_SWIPE_THRESHOLD: f32 = 0.2;
const DEFAULT_DRAG_RESET_MS: u64 = 250;
const DEFAULT_DECODE_MAX_DIM: u32 = 2560;
const DEFAULT_THUMBNAIL_HEIGHT: f32 = 96.0;

/// Which way a committed swipe moves the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwipeDirection {
    /// Dragging the content left reveals the next item.
    #[default]
    Natural,
    /// Dragging the content left reveals the previous item.
    Inverted,
}

impl SwipeDirection {
    /// Step to commit for a drag whose content moved by `offset`.
    pub fn step_for(self, offset: f32) -> i64 {
        let visual = if offset < 0.0 { -1 } else { 1 };
        match self {
            Self::Natural => -visual,
            Self::Inverted => visual,
        }
    }
}

/// How a thumbnail click moves the main viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThumbnailTransition {
    /// Smoothly scroll to the requested item.
    #[default]
    Directional,
    /// Jump without animation.
    Neutral,
    /// Step smoothly when the request is a neighbour (wrapping included), jump otherwise.
    AdjacentDirectional,
}

/// Behavior of the lightbox core.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Animate scrolls of the main track.
    pub smooth_scrolling: bool,
    /// Fraction of the viewport width a drag must exceed to page.
    pub swipe_threshold: f32,
    /// Duration of the snap-back animation; new drags are refused until it elapses.
    pub drag_reset_ms: u64,
    pub swipe_direction: SwipeDirection,
    pub thumbnail_transition: ThumbnailTransition,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            smooth_scrolling: true,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            drag_reset_ms: DEFAULT_DRAG_RESET_MS,
            swipe_direction: SwipeDirection::default(),
            thumbnail_transition: ThumbnailTransition::default(),
        }
    }
}

impl GalleryConfig {
    #[inline]
    pub fn drag_reset(&self) -> Duration {
        Duration::from_millis(self.drag_reset_ms)
    }

    /// Clamp the threshold into a usable range.
    pub fn swipe_threshold(&self) -> f32 {
        if self.swipe_threshold.is_finite() {
            self.swipe_threshold.clamp(0.0, 1.0)
        } else {
            DEFAULT_SWIPE_THRESHOLD
        }
    }
}

/// Settings for the desktop host.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Longest edge of decoded images; larger files are downscaled.
    pub decode_max_dim: u32,
    pub thumbnail_height: f32,
    /// Read captions from `<image>.txt` sidecar files.
    pub sidecar_captions: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            decode_max_dim: DEFAULT_DECODE_MAX_DIM,
            thumbnail_height: DEFAULT_THUMBNAIL_HEIGHT,
            sidecar_captions: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gallery: GalleryConfig,
    pub viewer: ViewerConfig,
}

impl Config {
    /// Load from the default path, falling back to defaults on any problem.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; using default config");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ferris-lightbox")
            .join("config.toml")
    }
}
