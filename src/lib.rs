//! Core of an image lightbox with infinite wrap-around paging.
//!
//! [`InfiniteSlider`] owns the current index and the duplicated-edge track,
//! [`PreviewStrip`] mirrors it as thumbnails, [`DragController`] turns swipes into
//! single steps and [`ModalCoordinator`] wires the three together with the caption.
//! None of it renders anything: hosts feed input in and execute [`HostCommand`]s.

pub mod config;
pub mod error;
pub mod gesture;
pub mod item;
pub mod modal;
pub mod preview;
pub mod slider;

pub use config::{Config, GalleryConfig, SwipeDirection, ThumbnailTransition, ViewerConfig};
pub use error::{ConfigError, GalleryError};
pub use gesture::{DragController, DragState, GestureEvent, PointerInput, PointerTarget};
pub use item::{wrap_index, GalleryItem};
pub use modal::{HostCommand, Key, ModalCoordinator};
pub use preview::{PreviewEvent, PreviewStrip};
pub use slider::{
    ExtendedIndex, InfiniteSlider, ScrollBehavior, ScrollRequest, SliderEvent, TrackCell,
    Visibility,
};
