use crate::library::{Book, Catalog};
use crate::theme::Base16Palette;
use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

/// Selection state of the book list.
pub struct LibraryView {
    pub selected: usize,
    pub list_state: ListState,
}

impl LibraryView {
    pub fn new(catalog: &Catalog) -> Self {
        let mut list_state = ListState::default();
        if !catalog.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            selected: 0,
            list_state,
        }
    }

    pub fn move_selection_down(&mut self, catalog: &Catalog) {
        if self.selected < catalog.len().saturating_sub(1) {
            self.selected += 1;
            self.list_state.select(Some(self.selected));
        }
    }

    pub fn move_selection_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.list_state.select(Some(self.selected));
        }
    }

    pub fn select(&mut self, index: usize, catalog: &Catalog) {
        if catalog.is_empty() {
            self.selected = 0;
            self.list_state.select(None);
            return;
        }
        self.selected = index.min(catalog.len() - 1);
        self.list_state.select(Some(self.selected));
    }

    pub fn selected_book<'a>(&self, catalog: &'a Catalog) -> Option<&'a Book> {
        catalog.get(self.selected)
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        catalog: &Catalog,
        library_root: &str,
        palette: &Base16Palette,
        show_details: bool,
    ) {
        let (text_color, border_color, bg_color) = palette.get_panel_colors(true);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Library: {library_root} "))
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(bg_color));

        if catalog.is_empty() {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No books found",
                    Style::default().fg(text_color).add_modifier(Modifier::BOLD),
                ))
                .centered(),
                Line::from(""),
                Line::from(Span::styled(
                    "Put each book in a numbered folder (001, 002, ...) holding 001.png, 002.png, ...",
                    Style::default().fg(palette.base_04),
                ))
                .centered(),
            ])
            .wrap(Wrap { trim: true })
            .block(block);
            f.render_widget(empty, area);
            return;
        }

        let [list_area, details_area] = if show_details {
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(area)
        } else {
            Layout::horizontal([Constraint::Percentage(100), Constraint::Length(0)]).areas(area)
        };

        let items: Vec<ListItem> = catalog
            .books()
            .iter()
            .map(|book| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", book.id), Style::default().fg(palette.base_03)),
                    Span::styled(book.title.clone(), Style::default().fg(text_color)),
                    Span::raw("  "),
                    progress_badge(book, palette),
                ]))
            })
            .collect();

        let (selection_bg, selection_fg) = palette.get_selection_colors();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(selection_bg).fg(selection_fg))
            .highlight_symbol("» ");
        f.render_stateful_widget(list, list_area, &mut self.list_state);

        if show_details {
            if let Some(book) = self.selected_book(catalog) {
                render_details(f, details_area, book, palette);
            }
        }
    }
}

/// `new`, `done`, or `read/total`.
pub fn progress_label(book: &Book) -> String {
    if !book.is_started() {
        "new".to_string()
    } else if book.is_finished() {
        "done".to_string()
    } else {
        format!("{}/{}", book.progress, book.page_count)
    }
}

fn progress_badge(book: &Book, palette: &Base16Palette) -> Span<'static> {
    let color = if !book.is_started() {
        palette.base_0d
    } else if book.is_finished() {
        palette.base_0b
    } else {
        palette.base_0a
    };
    Span::styled(format!("[{}]", progress_label(book)), Style::default().fg(color))
}

fn render_details(f: &mut Frame, area: Rect, book: &Book, palette: &Base16Palette) {
    let (text_color, _, bg_color) = palette.get_panel_colors(false);
    let lines = vec![
        Line::from(Span::styled(
            book.title.clone(),
            Style::default()
                .fg(palette.base_07)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Pages:    {}", book.page_count)),
        Line::from(format!("Progress: {}", progress_label(book))),
        Line::from(format!(
            "Last read: {}",
            book.last_read
                .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".to_string())
        )),
        Line::from(""),
        Line::from("Cover:"),
        Line::from(Span::styled(
            book.cover_ref.clone(),
            Style::default().fg(palette.base_04),
        )),
    ];
    let details = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(text_color).bg(bg_color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Book ")
                .border_style(Style::default().fg(palette.base_03)),
        );
    f.render_widget(details, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(progress: usize, pages: usize) -> Book {
        Book {
            id: "001".to_string(),
            title: "t".to_string(),
            cover_ref: String::new(),
            page_count: pages,
            progress,
            last_read: None,
        }
    }

    #[test]
    fn progress_labels() {
        assert_eq!(progress_label(&book(0, 10)), "new");
        assert_eq!(progress_label(&book(4, 10)), "4/10");
        assert_eq!(progress_label(&book(10, 10)), "done");
    }
}
