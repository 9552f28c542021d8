//! One open book.
//!
//! A [`ReaderSession`] owns every piece of per-book state: page position,
//! zoom, gestures, the autoplay timer and the pending page transition. The
//! session is driven entirely by [`ReaderSession::handle`] and
//! [`ReaderSession::tick`]; it owns no threads or callbacks, so dropping it
//! cancels everything it scheduled. The bookmark is written after every
//! committed page change and once more when the session goes away.

use std::time::{Duration, Instant};

use log::{debug, info};

use super::autoplay::Autoplay;
use super::gesture::{GestureOutcome, GestureTracker};
use super::state::{ReaderState, SPREAD_MIN_WIDTH_PX, SessionError};
use super::transition::{PendingTransition, jump_direction};
use super::types::{
    PageDirection, Point, ReaderCommand, ReaderEvent, Slide, ViewMode, Viewport,
};
use super::zoom::{Zoom, ZoomIndicator};
use crate::bookmark::Bookmarks;
use crate::config::Config;
use crate::content_store::ContentStore;
use crate::library::Book;
use crate::settings::{ReaderSettings, load_reader_settings, save_reader_settings};
use crate::storage::SharedStore;
use crate::theme::next_background;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub spread_min_width: u32,
    pub autoplay_interval: Duration,
    pub zoom_indicator: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            spread_min_width: SPREAD_MIN_WIDTH_PX,
            autoplay_interval: super::autoplay::DEFAULT_INTERVAL,
            zoom_indicator: ZoomIndicator::DEFAULT_DURATION,
        }
    }
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            spread_min_width: config.spread_min_width_px,
            autoplay_interval: Duration::from_millis(config.autoplay_delay_ms),
            zoom_indicator: Duration::from_millis(config.zoom_indicator_ms),
        }
    }
}

pub struct ReaderSession {
    state: ReaderState,
    bookmarks: Bookmarks,
    store: SharedStore,
    settings: ReaderSettings,
    gestures: GestureTracker,
    autoplay: Autoplay,
    pending: Option<PendingTransition>,
    slide: Option<Slide>,
    zoom_indicator: Option<ZoomIndicator>,
    zoom_indicator_duration: Duration,
    events: Vec<ReaderEvent>,
    bookmark_cleared: bool,
    closed: bool,
}

impl ReaderSession {
    /// Open `book`, resuming at its bookmark.
    pub fn open(
        book: &Book,
        content: &dyn ContentStore,
        extension: &str,
        store: SharedStore,
        viewport: Viewport,
        options: &SessionOptions,
    ) -> Result<Self, SessionError> {
        let pages = book.page_refs(content, extension);
        Self::new(&book.id, pages, store, viewport, options)
    }

    pub fn new(
        book_id: &str,
        pages: Vec<String>,
        store: SharedStore,
        viewport: Viewport,
        options: &SessionOptions,
    ) -> Result<Self, SessionError> {
        let bookmarks = Bookmarks::new(store.clone());
        let settings = load_reader_settings(&store);
        let start_page = bookmarks.get_page(book_id).unwrap_or(0);
        let state = ReaderState::new(book_id, pages, start_page, settings.view_mode, viewport)?
            .with_spread_min_width(options.spread_min_width);
        info!(
            "Opened book {book_id} at page {} of {}",
            state.current_page() + 1,
            state.page_count()
        );
        Ok(Self {
            state,
            bookmarks,
            store,
            settings,
            gestures: GestureTracker::new(),
            autoplay: Autoplay::new(options.autoplay_interval),
            pending: None,
            slide: None,
            zoom_indicator: None,
            zoom_indicator_duration: options.zoom_indicator,
            events: Vec::new(),
            bookmark_cleared: false,
            closed: false,
        })
    }

    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    pub fn book_id(&self) -> &str {
        &self.state.book_id
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page()
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    pub fn zoom(&self) -> &Zoom {
        &self.state.zoom
    }

    pub fn slide(&self) -> Option<Slide> {
        self.slide
    }

    pub fn is_transition_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_autoplay_running(&self) -> bool {
        self.autoplay.is_running()
    }

    pub fn autoplay_interval(&self) -> Duration {
        self.autoplay.interval()
    }

    pub fn zoom_indicator(&self) -> Option<&ZoomIndicator> {
        self.zoom_indicator.as_ref()
    }

    pub fn can_advance(&self) -> bool {
        self.state.can_advance()
    }

    pub fn can_retreat(&self) -> bool {
        self.state.can_retreat()
    }

    pub fn drain_events(&mut self) -> Vec<ReaderEvent> {
        std::mem::take(&mut self.events)
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.pending.map(|p| p.commit_at),
            self.autoplay.next_deadline(),
            self.zoom_indicator.as_ref().map(|z| z.expires_at),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn handle(&mut self, command: ReaderCommand, now: Instant) {
        match command {
            ReaderCommand::Advance => {
                self.advance(now);
            }
            ReaderCommand::Retreat => {
                self.retreat(now);
            }
            ReaderCommand::GoToPage { page, animated } => {
                self.go_to_page(page, animated, now);
            }
            ReaderCommand::FirstPage => {
                self.go_to_page(0, false, now);
            }
            ReaderCommand::LastPage => {
                let last = self.state.last_page();
                self.go_to_page(last, false, now);
            }
            ReaderCommand::ToggleViewMode => self.toggle_view_mode(),
            ReaderCommand::Wheel { delta } => {
                if self.state.zoom.wheel(delta) {
                    self.zoom_changed(now);
                }
            }
            ReaderCommand::ResetZoom => {
                if self.state.zoom.reset() {
                    self.zoom_changed(now);
                }
            }
            ReaderCommand::PinchStart { distance } => {
                self.state.zoom.pan_end();
                self.state.zoom.pinch_start(distance);
            }
            ReaderCommand::PinchUpdate { distance } => {
                if self.state.zoom.pinch_update(distance) {
                    self.zoom_changed(now);
                }
            }
            ReaderCommand::PanStart { at } => {
                self.state.zoom.pan_start(at);
            }
            ReaderCommand::PanMove { to } => {
                self.state.zoom.pan_move(to);
            }
            ReaderCommand::PanEnd => self.state.zoom.pan_end(),
            ReaderCommand::Click { x } => self.click(x, now),
            ReaderCommand::ProgressBarClick { x, width } => {
                let target = self.state.progress_bar_target(x, width);
                self.go_to_page(target, true, now);
            }
            ReaderCommand::ToggleAutoplay => self.toggle_autoplay(now),
            ReaderCommand::SetAutoplayInterval { seconds } => {
                self.autoplay.set_interval_secs(seconds, now);
                self.autoplay_changed();
            }
            ReaderCommand::SetAnimationSpeed { seconds } => self.set_animation_speed(seconds),
            ReaderCommand::Resize(viewport) => self.resize(viewport),
        }
    }

    /// Turn one step forward. Refused without any state change when the
    /// book is at its end or another page change is still animating.
    pub fn advance(&mut self, now: Instant) -> bool {
        self.step(PageDirection::Forward, now)
    }

    pub fn retreat(&mut self, now: Instant) -> bool {
        self.step(PageDirection::Backward, now)
    }

    fn step(&mut self, direction: PageDirection, now: Instant) -> bool {
        if self.pending.is_some() {
            debug!("Page turn ignored while a transition is pending");
            return false;
        }
        let Some(target) = self.state.step_target(direction) else {
            return false;
        };
        self.begin_transition(target, direction, now);
        true
    }

    /// Jump to `page`, clamped into the book. Returns false only when a
    /// transition is already pending.
    pub fn go_to_page(&mut self, page: usize, animated: bool, now: Instant) -> bool {
        if self.pending.is_some() {
            debug!("Jump ignored while a transition is pending");
            return false;
        }
        let target = self.state.clamp_page(page);
        if animated {
            let direction = jump_direction(self.state.current_page(), target);
            self.begin_transition(target, direction, now);
        } else {
            self.commit(target, None);
        }
        true
    }

    fn begin_transition(&mut self, target: usize, direction: PageDirection, now: Instant) {
        let delay = Duration::from_millis(self.settings.animation_delay_ms());
        let transition = PendingTransition::new(target, direction, now, delay);
        if delay.is_zero() {
            self.commit(target, Some(transition.enter_slide()));
            return;
        }
        let exit = transition.exit_slide();
        self.slide = Some(exit);
        self.pending = Some(transition);
        self.events.push(ReaderEvent::SlideStarted(exit));
    }

    fn commit(&mut self, target: usize, slide: Option<Slide>) {
        self.state.current_page = target;
        self.slide = slide;
        self.events.push(ReaderEvent::PageChanged {
            page: target,
            slide,
        });
        self.persist_bookmark();
    }

    fn persist_bookmark(&mut self) {
        self.bookmark_cleared = false;
        let page = self.state.current_page();
        self.bookmarks.update_bookmark(&self.state.book_id, page);
        self.events.push(ReaderEvent::BookmarkSaved { page });
    }

    /// Advance timers: commit a due transition, fire autoplay, expire the
    /// zoom indicator.
    pub fn tick(&mut self, now: Instant) {
        if let Some(pending) = self.pending {
            if pending.is_due(now) {
                self.pending = None;
                self.commit(pending.target, Some(pending.enter_slide()));
            }
        }

        if self.autoplay.poll(now) {
            self.autoplay_step(now);
        }

        if self
            .zoom_indicator
            .as_ref()
            .is_some_and(|indicator| indicator.is_expired(now))
        {
            self.zoom_indicator = None;
        }
    }

    fn autoplay_step(&mut self, now: Instant) {
        if self.state.can_advance() {
            self.advance(now);
        } else {
            debug!("Autoplay reached the end of {}, looping", self.state.book_id);
            self.go_to_page(0, false, now);
        }
    }

    fn click(&mut self, x: f32, now: Instant) {
        if self.gestures.take_click_suppression() {
            return;
        }
        if self.state.zoom.is_zoomed() {
            return;
        }
        let center = self.state.viewport.width as f32 / 2.0;
        if x < center {
            self.advance(now);
        } else {
            self.retreat(now);
        }
    }

    pub fn touch_start(&mut self, touches: &[Point], now: Instant) {
        let outcome = self.gestures.touch_start(touches);
        self.apply_gesture(outcome, now);
    }

    pub fn touch_move(&mut self, touches: &[Point], now: Instant) {
        let outcome = self.gestures.touch_move(touches);
        self.apply_gesture(outcome, now);
    }

    pub fn touch_end(&mut self, lifted: Point, remaining: usize, now: Instant) {
        let outcome = self.gestures.touch_end(lifted, remaining);
        self.apply_gesture(outcome, now);
    }

    fn apply_gesture(&mut self, outcome: GestureOutcome, now: Instant) {
        match outcome {
            GestureOutcome::Ignored => {}
            GestureOutcome::PinchStarted { distance } => {
                self.handle(ReaderCommand::PinchStart { distance }, now);
            }
            GestureOutcome::PinchMoved { distance } => {
                self.handle(ReaderCommand::PinchUpdate { distance }, now);
            }
            GestureOutcome::PinchEnded => self.state.zoom.pinch_end(),
            GestureOutcome::Swipe(PageDirection::Forward) => {
                self.advance(now);
            }
            GestureOutcome::Swipe(PageDirection::Backward) => {
                self.retreat(now);
            }
        }
    }

    fn zoom_changed(&mut self, now: Instant) {
        let zoom = self.state.zoom.factor();
        self.zoom_indicator = Some(ZoomIndicator::new(
            &self.state.zoom,
            now,
            self.zoom_indicator_duration,
        ));
        self.events.push(ReaderEvent::ZoomChanged { zoom });
    }

    pub fn toggle_view_mode(&mut self) {
        self.settings.view_mode = self.settings.view_mode.toggled();
        self.state.view_mode = self.settings.view_mode;
        self.save_settings();
        self.events
            .push(ReaderEvent::ViewModeChanged(self.state.view_mode));
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state.view_mode
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if self.state.viewport != viewport {
            debug!("Reader viewport now {}x{}", viewport.width, viewport.height);
            self.state.viewport = viewport;
        }
    }

    pub fn toggle_autoplay(&mut self, now: Instant) {
        if self.autoplay.is_running() {
            self.autoplay.stop();
        } else {
            self.autoplay.start(now);
        }
        self.autoplay_changed();
    }

    pub fn stop_autoplay(&mut self) {
        if self.autoplay.is_running() {
            self.autoplay.stop();
            self.autoplay_changed();
        }
    }

    fn autoplay_changed(&mut self) {
        self.events.push(ReaderEvent::AutoplayChanged {
            running: self.autoplay.is_running(),
            interval_ms: self.autoplay.interval().as_millis() as u64,
        });
    }

    pub fn set_animation_speed(&mut self, seconds: f32) {
        if !seconds.is_finite() || seconds < 0.0 {
            return;
        }
        self.settings.animation_speed = seconds;
        self.save_settings();
    }

    pub fn cycle_animation_speed(&mut self) {
        let next = self.settings.next_animation_speed();
        self.set_animation_speed(next);
    }

    pub fn toggle_dark_mode(&mut self) {
        self.settings.dark_mode = !self.settings.dark_mode;
        self.save_settings();
    }

    pub fn cycle_background(&mut self) {
        self.settings.background_color = next_background(self.settings.background_color.as_deref());
        self.save_settings();
    }

    pub fn toggle_panel_minimized(&mut self) {
        self.settings.panel_minimized = !self.settings.panel_minimized;
        self.save_settings();
    }

    /// Forget the saved position of this book. The next committed page
    /// change writes a fresh bookmark; closing without one leaves it unset.
    pub fn reset_bookmark(&mut self) {
        self.bookmarks.reset(&self.state.book_id);
        self.bookmark_cleared = true;
    }

    fn save_settings(&self) {
        save_reader_settings(&self.store, &self.settings);
    }

    /// Tear the session down: cancel timers and save the position.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.autoplay.stop();
        self.pending = None;
        if !self.bookmark_cleared {
            self.persist_bookmark();
        }
        info!(
            "Closed book {} at page {}",
            self.state.book_id,
            self.state.current_page() + 1
        );
    }
}

impl Drop for ReaderSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
