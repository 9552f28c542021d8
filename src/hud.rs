use std::time::{Duration, Instant};

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::theme::Base16Palette;

pub const HUD_DURATION: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudMode {
    Normal,
    Error,
}

/// Short status message drawn over the bottom of the screen.
#[derive(Debug, Clone)]
pub struct HudMessage {
    pub message: String,
    pub expires_at: Instant,
    pub mode: HudMode,
}

impl HudMessage {
    pub fn new(message: impl Into<String>, now: Instant, duration: Duration, mode: HudMode) -> Self {
        Self {
            message: message.into(),
            expires_at: now + duration,
            mode,
        }
    }

    pub fn info(message: impl Into<String>, now: Instant) -> Self {
        Self::new(message, now, HUD_DURATION, HudMode::Normal)
    }

    pub fn error(message: impl Into<String>, now: Instant) -> Self {
        Self::new(message, now, HUD_DURATION * 2, HudMode::Error)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn styled_line(&self, palette: &Base16Palette) -> Line<'static> {
        let style = match self.mode {
            HudMode::Normal => Style::default()
                .fg(palette.base_06)
                .bg(palette.base_02)
                .add_modifier(Modifier::BOLD),
            HudMode::Error => Style::default()
                .fg(palette.base_07)
                .bg(palette.base_08)
                .add_modifier(Modifier::BOLD),
        };

        Line::from(vec![Span::styled(format!(" {} ", self.message), style)]).centered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_outlive_info() {
        let now = Instant::now();
        let info = HudMessage::info("Spread view", now);
        let error = HudMessage::error("Could not open 004", now);
        let later = now + HUD_DURATION;
        assert!(info.is_expired(later));
        assert!(!error.is_expired(later));
    }
}
