use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Single,
    /// Two pages side by side, read right to left.
    Spread,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Single => ViewMode::Spread,
            ViewMode::Spread => ViewMode::Single,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Single => "Single",
            ViewMode::Spread => "Spread",
        }
    }
}

/// Logical direction of a page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Forward,
    Backward,
}

/// Slide animation tags sent to the renderer.
///
/// Moving forward slides the current page out to the right and the new one
/// in from the left, matching a right-to-left book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slide {
    OutRight,
    OutLeft,
    InLeft,
    InRight,
}

impl Slide {
    pub fn exit(direction: PageDirection) -> Self {
        match direction {
            PageDirection::Forward => Slide::OutRight,
            PageDirection::Backward => Slide::OutLeft,
        }
    }

    pub fn enter(direction: PageDirection) -> Self {
        match direction {
            PageDirection::Forward => Slide::InLeft,
            PageDirection::Backward => Slide::InRight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanOffset {
    pub x: f32,
    pub y: f32,
}

impl PanOffset {
    pub const ZERO: PanOffset = PanOffset { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Point on the reader surface in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Size of the display surface in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Commands accepted by a reader session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReaderCommand {
    Advance,
    Retreat,
    /// Direct jump, clamped to the book.
    GoToPage {
        page: usize,
        animated: bool,
    },
    FirstPage,
    LastPage,
    ToggleViewMode,
    /// One wheel notch; positive `delta` zooms out, negative zooms in.
    Wheel {
        delta: f32,
    },
    ResetZoom,
    PinchStart {
        distance: f32,
    },
    PinchUpdate {
        distance: f32,
    },
    PanStart {
        at: Point,
    },
    PanMove {
        to: Point,
    },
    PanEnd,
    /// Click on the reader surface at horizontal position `x`.
    Click {
        x: f32,
    },
    /// Click on the progress bar at `x` of a bar `width` wide.
    ProgressBarClick {
        x: f32,
        width: f32,
    },
    ToggleAutoplay,
    SetAutoplayInterval {
        seconds: u64,
    },
    SetAnimationSpeed {
        seconds: f32,
    },
    Resize(Viewport),
}

/// Notifications emitted by a reader session for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderEvent {
    SlideStarted(Slide),
    PageChanged {
        page: usize,
        slide: Option<Slide>,
    },
    ZoomChanged {
        zoom: f32,
    },
    ViewModeChanged(ViewMode),
    AutoplayChanged {
        running: bool,
        interval_ms: u64,
    },
    BookmarkSaved {
        page: usize,
    },
}
