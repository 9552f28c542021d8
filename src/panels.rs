//! Side panels of the reader: the page thumbnail strip and the settings
//! list. While either is open the reader's own keys are suspended.

use crate::event_source::{KeyCode, KeyEvent};
use crate::reader::ReaderSession;
use crate::theme::Base16Palette;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

pub enum OpenPanel {
    Thumbnails(ThumbnailPanel),
    Settings(SettingsPanel),
}

/// What the app should do after a key reached a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    None,
    Close,
    JumpTo(usize),
    Activate(SettingsRow),
    Decrease(SettingsRow),
}

/// Page list with the current page highlighted.
pub struct ThumbnailPanel {
    pub selected: usize,
    pub list_state: ListState,
}

impl ThumbnailPanel {
    pub fn new(current_page: usize) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(current_page));
        Self {
            selected: current_page,
            list_state,
        }
    }

    pub fn move_down(&mut self, page_count: usize) {
        if self.selected + 1 < page_count {
            self.selected += 1;
            self.list_state.select(Some(self.selected));
        }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.list_state.select(Some(self.selected));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, page_count: usize) -> PanelAction {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_down(page_count);
                PanelAction::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_up();
                PanelAction::None
            }
            KeyCode::Enter => PanelAction::JumpTo(self.selected),
            KeyCode::Esc | KeyCode::Char('t') | KeyCode::Char('q') => PanelAction::Close,
            _ => PanelAction::None,
        }
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        session: &ReaderSession,
        palette: &Base16Palette,
    ) {
        let current = session.current_page();
        let items: Vec<ListItem> = session
            .state()
            .pages
            .iter()
            .enumerate()
            .map(|(index, page_ref)| {
                let marker = if index == current { "●" } else { " " };
                let name = page_ref.rsplit(['/', '\\']).next().unwrap_or(page_ref);
                let style = if index == current {
                    Style::default()
                        .fg(palette.base_0a)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.base_05)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{marker}{:>4} ", index + 1), style),
                    Span::styled(name.to_string(), Style::default().fg(palette.base_04)),
                ]))
            })
            .collect();

        let (selection_bg, selection_fg) = palette.get_selection_colors();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Pages ")
                    .border_style(Style::default().fg(palette.base_04))
                    .style(Style::default().bg(palette.base_00)),
            )
            .highlight_style(Style::default().bg(selection_bg).fg(selection_fg));
        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut self.list_state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    ViewMode,
    AnimationSpeed,
    Background,
    DarkMode,
    Autoplay,
    AutoplayInterval,
    ResetBookmark,
}

impl SettingsRow {
    pub const ALL: [SettingsRow; 7] = [
        SettingsRow::ViewMode,
        SettingsRow::AnimationSpeed,
        SettingsRow::Background,
        SettingsRow::DarkMode,
        SettingsRow::Autoplay,
        SettingsRow::AutoplayInterval,
        SettingsRow::ResetBookmark,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingsRow::ViewMode => "View mode",
            SettingsRow::AnimationSpeed => "Animation speed",
            SettingsRow::Background => "Background",
            SettingsRow::DarkMode => "Dark mode",
            SettingsRow::Autoplay => "Autoplay",
            SettingsRow::AutoplayInterval => "Autoplay interval",
            SettingsRow::ResetBookmark => "Reset bookmark",
        }
    }

    fn value(&self, session: &ReaderSession) -> String {
        let settings = session.settings();
        match self {
            SettingsRow::ViewMode => session.view_mode().as_str().to_string(),
            SettingsRow::AnimationSpeed => format!("{:.2}s", settings.animation_speed),
            SettingsRow::Background => settings
                .background_color
                .clone()
                .unwrap_or_else(|| "theme".to_string()),
            SettingsRow::DarkMode => on_off(settings.dark_mode).to_string(),
            SettingsRow::Autoplay => on_off(session.is_autoplay_running()).to_string(),
            SettingsRow::AutoplayInterval => {
                format!("{}s", session.autoplay_interval().as_secs())
            }
            SettingsRow::ResetBookmark => String::new(),
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

pub struct SettingsPanel {
    pub selected: usize,
    pub list_state: ListState,
}

impl Default for SettingsPanel {
    fn default() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            selected: 0,
            list_state,
        }
    }
}

impl SettingsPanel {
    pub fn move_down(&mut self) {
        if self.selected + 1 < SettingsRow::ALL.len() {
            self.selected += 1;
            self.list_state.select(Some(self.selected));
        }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.list_state.select(Some(self.selected));
        }
    }

    pub fn selected_row(&self) -> SettingsRow {
        SettingsRow::ALL[self.selected]
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PanelAction {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_down();
                PanelAction::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_up();
                PanelAction::None
            }
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                PanelAction::Activate(self.selected_row())
            }
            KeyCode::Char('h') | KeyCode::Left => PanelAction::Decrease(self.selected_row()),
            KeyCode::Esc | KeyCode::Char('o') | KeyCode::Char('q') => PanelAction::Close,
            _ => PanelAction::None,
        }
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        session: &ReaderSession,
        palette: &Base16Palette,
    ) {
        let items: Vec<ListItem> = SettingsRow::ALL
            .iter()
            .map(|row| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<18}", row.label()),
                        Style::default().fg(palette.base_05),
                    ),
                    Span::styled(row.value(session), Style::default().fg(palette.base_0d)),
                ]))
            })
            .collect();

        let (selection_bg, selection_fg) = palette.get_selection_colors();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Settings ")
                    .border_style(Style::default().fg(palette.base_04))
                    .style(Style::default().bg(palette.base_00)),
            )
            .highlight_style(Style::default().bg(selection_bg).fg(selection_fg));
        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbnail_selection_stays_in_book() {
        let mut panel = ThumbnailPanel::new(1);
        panel.move_down(3);
        panel.move_down(3);
        assert_eq!(panel.selected, 2);
        panel.move_up();
        panel.move_up();
        panel.move_up();
        assert_eq!(panel.selected, 0);
    }

    #[test]
    fn settings_selection_is_bounded() {
        let mut panel = SettingsPanel::default();
        panel.move_up();
        assert_eq!(panel.selected_row(), SettingsRow::ViewMode);
        for _ in 0..20 {
            panel.move_down();
        }
        assert_eq!(panel.selected_row(), SettingsRow::ResetBookmark);
    }

    #[test]
    fn panel_keys_map_to_actions() {
        use crate::event_source::KeyModifiers;
        let key = |code| KeyEvent::new(code, KeyModifiers::empty());

        let mut thumbs = ThumbnailPanel::new(0);
        assert_eq!(thumbs.handle_key(key(KeyCode::Char('j')), 5), PanelAction::None);
        assert_eq!(thumbs.handle_key(key(KeyCode::Enter), 5), PanelAction::JumpTo(1));
        assert_eq!(thumbs.handle_key(key(KeyCode::Esc), 5), PanelAction::Close);

        let mut settings = SettingsPanel::default();
        settings.handle_key(key(KeyCode::Down));
        assert_eq!(
            settings.handle_key(key(KeyCode::Enter)),
            PanelAction::Activate(SettingsRow::AnimationSpeed)
        );
        assert_eq!(
            settings.handle_key(key(KeyCode::Left)),
            PanelAction::Decrease(SettingsRow::AnimationSpeed)
        );
    }
}
