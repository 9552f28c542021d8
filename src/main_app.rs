use crate::bookmark::Bookmarks;
use crate::config::Config;
use crate::content_store::ContentStore;
use crate::event_source::{
    Event, EventSource, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind,
};
use crate::hud::HudMessage;
use crate::library::{Catalog, discover};
use crate::library_view::LibraryView;
use crate::panels::{OpenPanel, PanelAction, SettingsPanel, SettingsRow, ThumbnailPanel};
use crate::reader::{Point, ReaderCommand, ReaderEvent, ReaderSession, SessionOptions, Viewport};
use crate::reader_view::{ReaderLayout, render_reader};
use crate::settings::{LibrarySettings, load_library_settings, save_library_settings};
use crate::storage::SharedStore;
use crate::theme::palette;
use anyhow::{Context, Result, bail};
use crossterm::event::KeyEventKind;
use log::{debug, error, info};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use std::time::{Duration, Instant};

/// Longest the event loop sleeps when no timer is due.
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

/// What a held left button is doing on the page area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragKind {
    Pan,
    Touch,
}

pub struct App {
    config: Config,
    content: Box<dyn ContentStore>,
    library_root: String,
    store: SharedStore,
    bookmarks: Bookmarks,
    pub catalog: Catalog,
    library_settings: LibrarySettings,
    pub library_view: LibraryView,
    session: Option<ReaderSession>,
    panel: Option<OpenPanel>,
    immersive: bool,
    hud: Option<HudMessage>,
    layout: ReaderLayout,
    frame_area: Rect,
    drag: Option<DragKind>,
}

impl App {
    /// Discover the library behind `content` and start on the book list.
    pub fn new(
        config: Config,
        content: Box<dyn ContentStore>,
        library_root: impl Into<String>,
        store: SharedStore,
    ) -> Self {
        let bookmarks = Bookmarks::new(store.clone());
        let catalog = discover(content.as_ref(), &bookmarks, &config.page_extension);
        let library_settings = load_library_settings(&store);
        let library_view = LibraryView::new(&catalog);
        Self {
            config,
            content,
            library_root: library_root.into(),
            store,
            bookmarks,
            catalog,
            library_settings,
            library_view,
            session: None,
            panel: None,
            immersive: false,
            hud: None,
            layout: ReaderLayout::default(),
            frame_area: Rect::default(),
            drag: None,
        }
    }

    pub fn session(&self) -> Option<&ReaderSession> {
        self.session.as_ref()
    }

    pub fn is_reading(&self) -> bool {
        self.session.is_some()
    }

    pub fn hud(&self) -> Option<&HudMessage> {
        self.hud.as_ref()
    }

    pub fn is_immersive(&self) -> bool {
        self.immersive
    }

    pub fn has_open_panel(&self) -> bool {
        self.panel.is_some()
    }

    pub fn library_settings(&self) -> &LibrarySettings {
        &self.library_settings
    }

    /// Open `book_id`, closing any book already open.
    pub fn open_book(&mut self, book_id: &str) -> Result<()> {
        let Some(book) = self.catalog.find(book_id).cloned() else {
            bail!("No book {book_id} in {}", self.library_root);
        };
        self.close_book();

        let area = if self.frame_area.is_empty() {
            self.layout.page_area
        } else {
            self.frame_area
        };
        let viewport = viewport_for(area, &self.config);
        let session = ReaderSession::open(
            &book,
            self.content.as_ref(),
            &self.config.page_extension,
            self.store.clone(),
            viewport,
            &SessionOptions::from(&self.config),
        )
        .with_context(|| format!("Failed to open book {book_id}"))?;

        if let Some(position) = self.catalog.position(book_id) {
            self.library_view.select(position, &self.catalog);
        }
        self.session = Some(session);
        Ok(())
    }

    /// Close the open book and return to the library with fresh progress.
    pub fn close_book(&mut self) {
        if let Some(session) = self.session.take() {
            session.close();
            self.catalog.refresh_progress(&self.bookmarks);
        }
        self.panel = None;
        self.drag = None;
        self.immersive = false;
    }

    pub fn handle_event(&mut self, event: Event, now: Instant) -> Option<AppAction> {
        match event {
            Event::Key(key) => self.handle_key_event(key, now),
            Event::Mouse(mouse) => {
                self.handle_mouse_event(mouse, now);
                None
            }
            // The next draw measures the new page area and re-evaluates the
            // spread rule.
            Event::Resize(columns, rows) => {
                debug!("Terminal resized to {columns}x{rows}");
                None
            }
            _ => None,
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent, now: Instant) -> Option<AppAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if self.session.is_some() {
            self.handle_reader_key(key, now);
            self.collect_reader_events(now);
            None
        } else {
            self.handle_library_key(key, now)
        }
    }

    fn handle_library_key(&mut self, key: KeyEvent, now: Instant) -> Option<AppAction> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.library_view.move_selection_down(&self.catalog);
            }
            KeyCode::Char('k') | KeyCode::Up => self.library_view.move_selection_up(),
            KeyCode::Enter => {
                let Some(book_id) = self
                    .library_view
                    .selected_book(&self.catalog)
                    .map(|book| book.id.clone())
                else {
                    return None;
                };
                if let Err(e) = self.open_book(&book_id) {
                    error!("{e:#}");
                    self.hud = Some(HudMessage::error(format!("{e:#}"), now));
                }
            }
            KeyCode::Char('d') => {
                self.library_settings.dark_mode = !self.library_settings.dark_mode;
                save_library_settings(&self.store, &self.library_settings);
            }
            KeyCode::Char('h') => {
                self.library_settings.panel_minimized = !self.library_settings.panel_minimized;
                save_library_settings(&self.store, &self.library_settings);
            }
            KeyCode::Char('q') | KeyCode::Esc => return Some(AppAction::Quit),
            _ => {}
        }
        None
    }

    fn handle_reader_key(&mut self, key: KeyEvent, now: Instant) {
        if self.panel.is_some() {
            self.handle_panel_key(key, now);
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Left | KeyCode::Char(' ') => session.handle(ReaderCommand::Advance, now),
            KeyCode::Right => session.handle(ReaderCommand::Retreat, now),
            KeyCode::Home => session.handle(ReaderCommand::FirstPage, now),
            KeyCode::End => session.handle(ReaderCommand::LastPage, now),
            KeyCode::Char('s') => session.handle(ReaderCommand::ToggleViewMode, now),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                session.handle(ReaderCommand::Wheel { delta: -1.0 }, now)
            }
            KeyCode::Char('-') => session.handle(ReaderCommand::Wheel { delta: 1.0 }, now),
            KeyCode::Char('0') => session.handle(ReaderCommand::ResetZoom, now),
            KeyCode::Char('p') => session.handle(ReaderCommand::ToggleAutoplay, now),
            KeyCode::Char('[') => step_autoplay_interval(session, false, now),
            KeyCode::Char(']') => step_autoplay_interval(session, true, now),
            KeyCode::Char('a') => {
                session.cycle_animation_speed();
                let speed = session.settings().animation_speed;
                self.hud = Some(HudMessage::info(format!("Animation {speed:.2}s"), now));
            }
            KeyCode::Char('d') => session.toggle_dark_mode(),
            KeyCode::Char('b') => session.cycle_background(),
            KeyCode::Char('h') => session.toggle_panel_minimized(),
            KeyCode::Char('r') => {
                session.reset_bookmark();
                self.hud = Some(HudMessage::info("Bookmark reset", now));
            }
            KeyCode::Char('t') => {
                self.panel = Some(OpenPanel::Thumbnails(ThumbnailPanel::new(
                    session.current_page(),
                )));
            }
            KeyCode::Char('o') => {
                self.panel = Some(OpenPanel::Settings(SettingsPanel::default()));
            }
            KeyCode::Char('f') => {
                self.immersive = !self.immersive;
                let label = if self.immersive { "on" } else { "off" };
                self.hud = Some(HudMessage::info(format!("Immersive {label}"), now));
            }
            KeyCode::Char('q') | KeyCode::Esc => self.close_book(),
            _ => {}
        }
    }

    fn handle_panel_key(&mut self, key: KeyEvent, now: Instant) {
        let (Some(panel), Some(session)) = (self.panel.as_mut(), self.session.as_mut()) else {
            return;
        };
        let action = match panel {
            OpenPanel::Thumbnails(thumbnails) => {
                thumbnails.handle_key(key, session.state().page_count())
            }
            OpenPanel::Settings(settings) => settings.handle_key(key),
        };

        match action {
            PanelAction::None => {}
            PanelAction::Close => self.panel = None,
            PanelAction::JumpTo(page) => {
                session.handle(
                    ReaderCommand::GoToPage {
                        page,
                        animated: true,
                    },
                    now,
                );
                self.panel = None;
            }
            PanelAction::Activate(row) => self.apply_settings_row(row, true, now),
            PanelAction::Decrease(row) => self.apply_settings_row(row, false, now),
        }
    }

    fn apply_settings_row(&mut self, row: SettingsRow, forward: bool, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match row {
            SettingsRow::ViewMode => session.toggle_view_mode(),
            SettingsRow::AnimationSpeed => session.cycle_animation_speed(),
            SettingsRow::Background => session.cycle_background(),
            SettingsRow::DarkMode => session.toggle_dark_mode(),
            SettingsRow::Autoplay => session.toggle_autoplay(now),
            SettingsRow::AutoplayInterval => step_autoplay_interval(session, forward, now),
            SettingsRow::ResetBookmark => {
                session.reset_bookmark();
                self.hud = Some(HudMessage::info("Bookmark reset", now));
            }
        }
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent, now: Instant) {
        if self.session.is_none() {
            match mouse.kind {
                MouseEventKind::ScrollDown => {
                    self.library_view.move_selection_down(&self.catalog)
                }
                MouseEventKind::ScrollUp => self.library_view.move_selection_up(),
                _ => {}
            }
            return;
        }

        let position = Position::new(mouse.column, mouse.row);
        let layout = self.layout;
        let point = to_point(layout.page_area, &self.config, mouse.column, mouse.row);
        let on_page = layout.page_area.contains(position);
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match mouse.kind {
            MouseEventKind::ScrollUp if on_page => {
                session.handle(ReaderCommand::Wheel { delta: -1.0 }, now)
            }
            MouseEventKind::ScrollDown if on_page => {
                session.handle(ReaderCommand::Wheel { delta: 1.0 }, now)
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if layout.progress_area.contains(position) {
                    let x = (mouse.column - layout.progress_area.x) as f32 + 0.5;
                    let width = layout.progress_area.width as f32;
                    session.handle(ReaderCommand::ProgressBarClick { x, width }, now);
                } else if on_page {
                    if session.zoom().is_zoomed() {
                        session.handle(ReaderCommand::PanStart { at: point }, now);
                        self.drag = Some(DragKind::Pan);
                    } else {
                        session.touch_start(&[point], now);
                        self.drag = Some(DragKind::Touch);
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => match self.drag {
                Some(DragKind::Pan) => session.handle(ReaderCommand::PanMove { to: point }, now),
                Some(DragKind::Touch) => session.touch_move(&[point], now),
                None => {}
            },
            MouseEventKind::Up(MouseButton::Left) => match self.drag.take() {
                Some(DragKind::Pan) => session.handle(ReaderCommand::PanEnd, now),
                Some(DragKind::Touch) => {
                    session.touch_end(point, 0, now);
                    // A release is also a click; the session drops it when
                    // the touch was a swipe.
                    session.handle(ReaderCommand::Click { x: point.x }, now);
                }
                None => {}
            },
            _ => {}
        }
        self.collect_reader_events(now);
    }

    fn collect_reader_events(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        for event in session.drain_events() {
            match event {
                ReaderEvent::ViewModeChanged(mode) => {
                    self.hud = Some(HudMessage::info(format!("{} view", mode.as_str()), now));
                }
                ReaderEvent::AutoplayChanged {
                    running,
                    interval_ms,
                } => {
                    let message = if running {
                        format!("Autoplay on ({}s)", interval_ms / 1000)
                    } else {
                        "Autoplay off".to_string()
                    };
                    self.hud = Some(HudMessage::info(message, now));
                }
                ReaderEvent::PageChanged { page, .. } => {
                    debug!("Showing page {}", page + 1);
                }
                ReaderEvent::SlideStarted(_)
                | ReaderEvent::ZoomChanged { .. }
                | ReaderEvent::BookmarkSaved { .. } => {}
            }
        }
    }

    /// Run due timers of the open book and expire the HUD.
    pub fn tick(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            session.tick(now);
        }
        self.collect_reader_events(now);
        if self.hud.as_ref().is_some_and(|hud| hud.is_expired(now)) {
            self.hud = None;
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let session_deadline = self.session.as_ref().and_then(|s| s.next_deadline());
        let hud_deadline = self.hud.as_ref().map(|hud| hud.expires_at);
        session_deadline.into_iter().chain(hud_deadline).min()
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let area = f.area();
        self.frame_area = area;

        if let Some(session) = self.session.as_mut() {
            let layout = render_reader(
                f,
                area,
                session,
                self.panel.as_mut(),
                self.immersive,
                self.hud.as_ref(),
            );
            session.resize(viewport_for(layout.page_area, &self.config));
            self.layout = layout;
            return;
        }

        self.draw_library(f, area);
    }

    fn draw_library(&mut self, f: &mut Frame, area: Rect) {
        let palette = palette(self.library_settings.dark_mode);
        f.render_widget(
            Block::default().style(Style::default().bg(palette.base_00)),
            area,
        );
        let [list_area, help_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

        self.library_view.render(
            f,
            list_area,
            &self.catalog,
            &self.library_root,
            palette,
            !self.library_settings.panel_minimized,
        );

        let help = match &self.hud {
            Some(hud) => hud.styled_line(palette),
            None => Line::from(Span::styled(
                "j/k move  Enter open  d dark mode  h details  q quit",
                Style::default().fg(palette.base_04),
            )),
        };
        f.render_widget(
            Paragraph::new(help).style(Style::default().bg(palette.base_01)),
            help_area,
        );
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.close_book();
    }
}

fn step_autoplay_interval(session: &mut ReaderSession, up: bool, now: Instant) {
    let current = session.autoplay_interval().as_secs();
    let seconds = if up {
        current + 1
    } else {
        current.saturating_sub(1)
    };
    session.handle(ReaderCommand::SetAutoplayInterval { seconds }, now);
}

fn viewport_for(area: Rect, config: &Config) -> Viewport {
    Viewport::new(
        area.width as u32 * config.cell_width_px,
        area.height as u32 * config.cell_height_px,
    )
}

/// Centre of a terminal cell, in px relative to the page area.
fn to_point(page_area: Rect, config: &Config, column: u16, row: u16) -> Point {
    let cell_w = config.cell_width_px as f32;
    let cell_h = config.cell_height_px as f32;
    Point::new(
        (column.saturating_sub(page_area.x) as f32 + 0.5) * cell_w,
        (row.saturating_sub(page_area.y) as f32 + 0.5) * cell_h,
    )
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    info!("Event loop started");
    loop {
        app.tick(Instant::now());
        terminal.draw(|f| app.draw(f))?;

        let timeout = app
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_POLL)
            .min(IDLE_POLL);

        if event_source.poll(timeout)? {
            let event = event_source.read()?;
            if app.handle_event(event, Instant::now()) == Some(AppAction::Quit) {
                break;
            }
        }
    }
    app.close_book();
    info!("Event loop finished");
    Ok(())
}
