use eframe::egui::Color32;

/// Card colors offered in the card toolbar, in display order.
pub const NODE_COLORS: [&str; 10] = [
    "#ffffff", "#fecaca", "#fed7aa", "#fde68a", "#bbf7d0", "#a5f3fc", "#bfdbfe", "#ddd6fe",
    "#fbcfe8", "#e2e8f0",
];

/// Connection colors offered in the edge toolbar. The first is the default.
pub const EDGE_COLORS: [&str; 6] = [
    "#64748b", "#ef4444", "#f59e0b", "#10b981", "#3b82f6", "#8b5cf6",
];

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub grid_dot: Color32,
    pub foreground: Color32,
    pub muted: Color32,
    pub accent: Color32,
    pub panel_background: Color32,
    pub panel_border: Color32,
    pub toolbar_background: Color32,
    pub completed: Color32,
    pub danger: Color32,
    pub card_border: Color32,
    /// Card text is always dark: cards keep their pastel fill in both themes.
    pub card_text: Color32,
    pub minimap_background: Color32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x0F, 0x17, 0x2A),
            grid_dot: Color32::from_rgb(0x33, 0x41, 0x55),
            foreground: Color32::from_rgb(0xE2, 0xE8, 0xF0),
            muted: Color32::from_rgb(0x94, 0xA3, 0xB8),
            accent: Color32::from_rgb(0x81, 0x8C, 0xF8),
            panel_background: Color32::from_rgb(0x1E, 0x29, 0x3B),
            panel_border: Color32::from_rgb(0x33, 0x41, 0x55),
            toolbar_background: Color32::from_rgb(0x1E, 0x29, 0x3B),
            completed: Color32::from_rgb(0x4A, 0xDE, 0x80),
            danger: Color32::from_rgb(0xF8, 0x71, 0x71),
            card_border: Color32::from_rgb(0x47, 0x55, 0x69),
            card_text: Color32::from_rgb(0x1E, 0x29, 0x3B),
            minimap_background: Color32::from_rgb(0x1E, 0x29, 0x3B),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(0xF8, 0xFA, 0xFC),
            grid_dot: Color32::from_rgb(0xCB, 0xD5, 0xE1),
            foreground: Color32::from_rgb(0x1E, 0x29, 0x3B),
            muted: Color32::from_rgb(0x64, 0x74, 0x8B),
            accent: Color32::from_rgb(0x63, 0x66, 0xF1),
            panel_background: Color32::WHITE,
            panel_border: Color32::from_rgb(0xE2, 0xE8, 0xF0),
            toolbar_background: Color32::WHITE,
            completed: Color32::from_rgb(0x22, 0xC5, 0x5E),
            danger: Color32::from_rgb(0xEF, 0x44, 0x44),
            card_border: Color32::from_rgb(0xE2, 0xE8, 0xF0),
            card_text: Color32::from_rgb(0x1E, 0x29, 0x3B),
            minimap_background: Color32::from_rgb(0xE2, 0xE8, 0xF0),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            _ => Self::light(),
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    pub fn is_dark(&self) -> bool {
        self.name == "dark"
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }

    /// Fill for a stored card color, falling back to white for missing or malformed values.
    pub fn card_fill(color: Option<&str>) -> Color32 {
        color.and_then(parse_hex).unwrap_or(Color32::WHITE)
    }

    pub fn edge_color(&self, color: &str) -> Color32 {
        parse_hex(color).unwrap_or(self.muted)
    }
}

/// Parse `#rgb` or `#rrggbb`.
pub fn parse_hex(s: &str) -> Option<Color32> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize, len: usize| u8::from_str_radix(&hex[i..i + len], 16).ok();
    match hex.len() {
        6 => Some(Color32::from_rgb(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
        3 => {
            let (r, g, b) = (channel(0, 1)?, channel(1, 1)?, channel(2, 1)?);
            Some(Color32::from_rgb(r * 17, g * 17, b * 17))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(parse_hex("#64748b"), Some(Color32::from_rgb(0x64, 0x74, 0x8B)));
        assert_eq!(parse_hex("#fff"), Some(Color32::WHITE));
        assert_eq!(parse_hex("64748b"), None);
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
        assert_eq!(parse_hex("#ééé"), None);
    }

    #[test]
    fn every_palette_entry_parses() {
        for color in NODE_COLORS.iter().chain(EDGE_COLORS.iter()) {
            assert!(parse_hex(color).is_some(), "{color}");
        }
        assert_eq!(EDGE_COLORS[0], crate::board::edges::DEFAULT_EDGE_COLOR);
        assert_eq!(NODE_COLORS[0], crate::board::DEFAULT_NODE_COLOR);
    }

    #[test]
    fn malformed_card_color_falls_back_to_white() {
        assert_eq!(Theme::card_fill(None), Color32::WHITE);
        assert_eq!(Theme::card_fill(Some("red")), Color32::WHITE);
        assert_eq!(
            Theme::card_fill(Some("#fde68a")),
            Color32::from_rgb(0xFD, 0xE6, 0x8A)
        );
    }

    #[test]
    fn theme_names_round_trip() {
        assert!(Theme::from_name("dark").is_dark());
        assert!(!Theme::from_name("anything").is_dark());
        assert!(Theme::dark().toggled().name == "light");
    }
}
