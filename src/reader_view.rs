//! Terminal rendering of an open book.
//!
//! Pages are drawn as framed cards naming the page resource. In spread mode
//! the leading page sits on the right and its partner on the left, as in a
//! right-to-left printed book. The progress bar fills from the right edge.

use crate::hud::HudMessage;
use crate::panels::OpenPanel;
use crate::reader::{ReaderSession, Slide};
use crate::theme::{Base16Palette, page_background, palette};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

const PANEL_WIDTH: u16 = 34;

/// Screen regions of the last frame, used to hit-test mouse events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderLayout {
    pub page_area: Rect,
    pub progress_area: Rect,
    pub panel_area: Option<Rect>,
}

pub fn render_reader(
    f: &mut Frame,
    area: Rect,
    session: &ReaderSession,
    panel: Option<&mut OpenPanel>,
    immersive: bool,
    hud: Option<&HudMessage>,
) -> ReaderLayout {
    let settings = session.settings();
    let palette = palette(settings.dark_mode);

    f.render_widget(
        Block::default().style(Style::default().bg(palette.base_00)),
        area,
    );

    let header_height = if immersive { 0 } else { 1 };
    let footer_height = if immersive {
        0
    } else if settings.panel_minimized {
        1
    } else {
        2
    };
    let [header_area, body_area, progress_area, footer_area] = Layout::vertical([
        Constraint::Length(header_height),
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(footer_height),
    ])
    .areas(area);

    let (page_area, panel_area) = if panel.is_some() && body_area.width > PANEL_WIDTH * 2 {
        let [pages, side] =
            Layout::horizontal([Constraint::Min(1), Constraint::Length(PANEL_WIDTH)])
                .areas(body_area);
        (pages, Some(side))
    } else {
        (body_area, None)
    };

    if !immersive {
        render_header(f, header_area, session, palette);
    }
    render_pages(f, page_area, session, palette);
    render_progress(f, progress_area, session, palette);
    if !immersive {
        render_controls(f, footer_area, session, palette);
    }

    if let (Some(panel), Some(side)) = (panel, panel_area) {
        match panel {
            OpenPanel::Thumbnails(thumbnails) => thumbnails.render(f, side, session, palette),
            OpenPanel::Settings(settings_panel) => {
                settings_panel.render(f, side, session, palette)
            }
        }
    }

    if let Some(indicator) = session.zoom_indicator() {
        render_zoom_indicator(f, page_area, &indicator.text, palette);
    }

    if let Some(hud) = hud {
        let hud_area = Rect {
            y: page_area.bottom().saturating_sub(1),
            height: 1,
            ..page_area
        };
        f.render_widget(Paragraph::new(hud.styled_line(palette)), hud_area);
    }

    ReaderLayout {
        page_area,
        progress_area,
        panel_area,
    }
}

fn render_header(f: &mut Frame, area: Rect, session: &ReaderSession, palette: &Base16Palette) {
    let mut spans = vec![
        Span::styled(
            format!(" {} ", session.book_id()),
            Style::default()
                .fg(palette.base_07)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            session.state().page_label(),
            Style::default().fg(palette.base_0a),
        ),
        Span::styled(
            format!("  {}", session.view_mode().as_str()),
            Style::default().fg(palette.base_0d),
        ),
    ];
    if session.is_autoplay_running() {
        spans.push(Span::styled(
            format!("  ▶ auto {}s", session.autoplay_interval().as_secs()),
            Style::default().fg(palette.base_0b),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(palette.base_01)),
        area,
    );
}

fn render_pages(f: &mut Frame, area: Rect, session: &ReaderSession, palette: &Base16Palette) {
    let background = page_background(palette, session.settings().background_color.as_deref());
    f.render_widget(
        Block::default().style(Style::default().bg(background)),
        area,
    );

    let state = session.state();
    let visible = state.visible_pages();
    let exit_slide = session
        .is_transition_pending()
        .then(|| session.slide())
        .flatten();

    match visible.trailing {
        Some(trailing) => {
            let [left, right] =
                Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .areas(area);
            render_page_card(f, right, session, visible.leading, exit_slide, palette, background);
            render_page_card(f, left, session, trailing, exit_slide, palette, background);
        }
        None => {
            render_page_card(f, area, session, visible.leading, exit_slide, palette, background);
        }
    }
}

fn slide_glyph(slide: Slide) -> &'static str {
    match slide {
        Slide::OutRight | Slide::InRight => "⟶",
        Slide::OutLeft | Slide::InLeft => "⟵",
    }
}

fn render_page_card(
    f: &mut Frame,
    area: Rect,
    session: &ReaderSession,
    index: usize,
    slide: Option<Slide>,
    palette: &Base16Palette,
    background: Color,
) {
    let page_ref = &session.state().pages[index];
    let name = page_ref.rsplit(['/', '\\']).next().unwrap_or(page_ref);
    let zoom = session.zoom();

    let mut title = format!(" {} ", index + 1);
    if let Some(slide) = slide {
        title = format!(" {} {}", slide_glyph(slide), title.trim_start());
    }

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            name.to_string(),
            Style::default()
                .fg(palette.base_06)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            page_ref.clone(),
            Style::default().fg(palette.base_03),
        )),
    ];
    if zoom.factor() != 1.0 {
        let pan = zoom.pan();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("zoom {}%  pan {:+.0},{:+.0}", zoom.percent(), pan.x, pan.y),
            Style::default().fg(palette.base_04),
        )));
    }

    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(background))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette.base_03))
                .title(title)
                .title_alignment(Alignment::Center),
        );
    f.render_widget(card, area);
}

/// Right-to-left bar: the filled part grows from the right edge.
pub fn progress_bar_line(ratio: f64, width: u16, palette: &Base16Palette) -> Line<'static> {
    let width = width as usize;
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    Line::from(vec![
        Span::styled(
            " ".repeat(width - filled),
            Style::default().bg(palette.base_01),
        ),
        Span::styled(" ".repeat(filled), Style::default().bg(palette.base_0d)),
    ])
}

fn render_progress(f: &mut Frame, area: Rect, session: &ReaderSession, palette: &Base16Palette) {
    let ratio = session.state().progress_ratio();
    f.render_widget(
        Paragraph::new(progress_bar_line(ratio, area.width, palette)),
        area,
    );
}

fn render_controls(f: &mut Frame, area: Rect, session: &ReaderSession, palette: &Base16Palette) {
    let enabled = Style::default()
        .fg(palette.base_07)
        .add_modifier(Modifier::BOLD);
    let disabled = Style::default().fg(palette.base_03);

    let controls = Line::from(vec![
        Span::styled(
            "◀ Next",
            if session.can_advance() { enabled } else { disabled },
        ),
        Span::styled(
            format!("   {}   ", session.state().page_label()),
            Style::default().fg(palette.base_0a),
        ),
        Span::styled(
            "Prev ▶",
            if session.can_retreat() { enabled } else { disabled },
        ),
    ])
    .centered();

    let settings = session.settings();
    let mut lines = vec![controls];
    if !settings.panel_minimized {
        lines.push(
            Line::from(Span::styled(
                "←/Space next  → prev  s spread  +/- zoom  p autoplay  t pages  o settings  h hide  q close",
                Style::default().fg(palette.base_04),
            ))
            .centered(),
        );
    }
    f.render_widget(
        Paragraph::new(lines).style(Style::default().bg(palette.base_01)),
        area,
    );
}

fn render_zoom_indicator(f: &mut Frame, area: Rect, text: &str, palette: &Base16Palette) {
    let width = (text.len() as u16 + 4).min(area.width);
    let height = 3.min(area.height);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(text.to_string())
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(palette.base_07)
                    .bg(palette.base_02)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL)),
        popup,
    );
}
