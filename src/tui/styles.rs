use ratatui::style::{Color, Modifier, Style};

/// Application theme configuration
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary colors
    pub primary: Color,
    pub accent: Color,

    /// Text colors
    pub text: Color,
    pub text_dim: Color,
    pub text_bright: Color,

    /// Background colors
    pub background: Color,
    pub background_alt: Color,

    /// Border colors
    pub border: Color,
    pub border_focused: Color,

    /// Status colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Purple-on-black, like the portal
    pub fn dark() -> Self {
        Self {
            primary: Color::Rgb(129, 140, 248),    // Indigo-400
            accent: Color::Rgb(147, 51, 234),     // Purple

            text: Color::Rgb(209, 213, 219),      // Gray-300
            text_dim: Color::Rgb(107, 114, 128),  // Gray-500
            text_bright: Color::Rgb(255, 255, 255), // White

            background: Color::Rgb(3, 0, 20),     // Near black
            background_alt: Color::Rgb(31, 41, 55), // Gray-800

            border: Color::Rgb(55, 65, 81),       // Gray-700
            border_focused: Color::Rgb(99, 102, 241), // Indigo-500

            success: Color::Rgb(74, 222, 128),    // Green-400
            warning: Color::Rgb(254, 215, 170),   // Orange-200
            error: Color::Rgb(239, 68, 68),       // Red-500
        }
    }

    /// Base style for normal elements
    pub fn base_style(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    /// Style for text content
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.text_bright).add_modifier(Modifier::BOLD)
    }

    pub fn species_style(&self) -> Style {
        Style::default().fg(self.primary)
    }

    /// Style for borders
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Style for focused borders
    pub fn focused_border_style(&self) -> Style {
        Style::default().fg(self.border_focused).add_modifier(Modifier::BOLD)
    }

    /// Colour of a character's status line
    pub fn status_style(&self, status: &str) -> Style {
        match status {
            "Alive" => Style::default().fg(self.success),
            "Dead" => Style::default().fg(self.error),
            _ => Style::default().fg(self.warning),
        }
    }

    /// The selected page number
    pub fn current_page_style(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn page_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn disabled_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Style for the status bar
    pub fn status_bar_style(&self) -> Style {
        Style::default().fg(self.text).bg(self.background_alt)
    }

    pub fn error_bar_style(&self) -> Style {
        Style::default().fg(self.text_bright).bg(self.error)
    }

    /// Style for help text
    pub fn help_style(&self) -> Style {
        Style::default().fg(self.text).bg(self.background_alt).add_modifier(Modifier::BOLD)
    }

    /// Style for placeholder text
    pub fn placeholder_style(&self) -> Style {
        Style::default().fg(self.text_dim).add_modifier(Modifier::ITALIC)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }
}
