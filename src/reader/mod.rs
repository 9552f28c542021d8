//! Reader session components

pub mod autoplay;
pub mod gesture;
pub mod navigation;
pub mod session;
pub mod state;
pub mod transition;
pub mod types;
pub mod zoom;

pub use autoplay::Autoplay;
pub use gesture::{GestureOutcome, GestureTracker, SWIPE_THRESHOLD_PX};
pub use navigation::VisiblePages;
pub use session::{ReaderSession, SessionOptions};
pub use state::{ReaderState, SPREAD_MIN_WIDTH_PX, SessionError};
pub use types::{
    PageDirection, PanOffset, Point, ReaderCommand, ReaderEvent, Slide, ViewMode, Viewport,
};
pub use zoom::{Zoom, ZoomIndicator};
