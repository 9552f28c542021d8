use ratatui::style::Color;

// Color palette structure
#[derive(Clone, Debug, PartialEq)]
pub struct Base16Palette {
    pub base_00: Color, // Background
    pub base_01: Color, // Lighter background
    pub base_02: Color, // Selection background
    pub base_03: Color, // Comments, invisibles
    pub base_04: Color, // Dark foreground
    pub base_05: Color, // Default foreground
    pub base_06: Color, // Light foreground
    pub base_07: Color, // Light background
    pub base_08: Color, // Red
    pub base_0a: Color, // Yellow
    pub base_0b: Color, // Green
    pub base_0d: Color, // Blue
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

// Oceanic Next
pub const DARK_PALETTE: Base16Palette = Base16Palette {
    base_00: rgb(0x1B2B34),
    base_01: rgb(0x343D46),
    base_02: rgb(0x4F5B66),
    base_03: rgb(0x65737E),
    base_04: rgb(0xA7ADBA),
    base_05: rgb(0xC0C5CE),
    base_06: rgb(0xCDD3DE),
    base_07: rgb(0xF0F4F8),
    base_08: rgb(0xEC5F67),
    base_0a: rgb(0xFAC863),
    base_0b: rgb(0x99C794),
    base_0d: rgb(0x6699CC),
};

// Paper-like light scheme; backgrounds and foregrounds mirror the dark one.
pub const LIGHT_PALETTE: Base16Palette = Base16Palette {
    base_00: rgb(0xF5F0E6),
    base_01: rgb(0xE8E1D3),
    base_02: rgb(0xD6CDBA),
    base_03: rgb(0x9A9184),
    base_04: rgb(0x6B6359),
    base_05: rgb(0x3C3836),
    base_06: rgb(0x282522),
    base_07: rgb(0x1A1816),
    base_08: rgb(0xB3413B),
    base_0a: rgb(0xA8741A),
    base_0b: rgb(0x5D7F3A),
    base_0d: rgb(0x3A6A9A),
};

pub fn palette(dark_mode: bool) -> &'static Base16Palette {
    if dark_mode {
        &DARK_PALETTE
    } else {
        &LIGHT_PALETTE
    }
}

/// Background colours offered by the background toggle, after the palette
/// default.
pub const BACKGROUND_CHOICES: [&str; 4] = ["#000000", "#1e1e1e", "#f5f0e6", "#ffffff"];

/// Next background in the cycle `palette default -> choices... -> default`.
pub fn next_background(current: Option<&str>) -> Option<String> {
    let position = current.and_then(|color| {
        BACKGROUND_CHOICES
            .iter()
            .position(|choice| choice.eq_ignore_ascii_case(color))
    });
    match position {
        None => Some(BACKGROUND_CHOICES[0].to_string()),
        Some(i) if i + 1 < BACKGROUND_CHOICES.len() => Some(BACKGROUND_CHOICES[i + 1].to_string()),
        Some(_) => None,
    }
}

/// Parse `#rrggbb`.
pub fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().map(rgb)
}

/// Background for the page area: the user's colour if valid, else the
/// palette background.
pub fn page_background(palette: &Base16Palette, custom: Option<&str>) -> Color {
    custom
        .and_then(parse_hex_color)
        .unwrap_or(palette.base_00)
}

impl Base16Palette {
    // Get colors for focused/unfocused panels
    pub fn get_panel_colors(&self, is_focused: bool) -> (Color, Color, Color) {
        if is_focused {
            (self.base_07, self.base_04, self.base_00)
        } else {
            (self.base_03, self.base_03, self.base_00)
        }
    }

    pub fn get_selection_colors(&self) -> (Color, Color) {
        (self.base_02, self.base_06)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_cycle_wraps_to_default() {
        let mut current: Option<String> = None;
        let mut seen = Vec::new();
        for _ in 0..5 {
            current = next_background(current.as_deref());
            seen.push(current.clone());
        }
        assert_eq!(seen[0].as_deref(), Some("#000000"));
        assert_eq!(seen[3].as_deref(), Some("#ffffff"));
        assert_eq!(seen[4], None);
    }

    #[test]
    fn unknown_background_restarts_cycle() {
        assert_eq!(next_background(Some("#123456")).as_deref(), Some("#000000"));
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_hex_color("ff8000"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(
            page_background(&DARK_PALETTE, Some("nonsense")),
            DARK_PALETTE.base_00
        );
    }
}
