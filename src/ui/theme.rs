// ============================================================================
// Thème : palette claire / sombre
// ============================================================================
// Le mode sombre est une préférence persistée (clé `darkMode`). Tous les
// écrans lisent leurs couleurs ici plutôt que de coder des Color en dur.
// ============================================================================

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub accent: Color,
    pub key: Color,
    pub positive: Color,
    pub negative: Color,
    pub favorite: Color,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            background: Color::Reset,
            text: Color::Reset,
            muted: Color::Gray,
            border: Color::Cyan,
            accent: Color::Blue,
            key: Color::Yellow,
            positive: Color::Green,
            negative: Color::Red,
            favorite: Color::Yellow,
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(18, 18, 24),
            text: Color::Rgb(220, 220, 230),
            muted: Color::DarkGray,
            border: Color::Rgb(90, 90, 140),
            accent: Color::LightMagenta,
            key: Color::LightYellow,
            positive: Color::LightGreen,
            negative: Color::LightRed,
            favorite: Color::LightYellow,
        }
    }

    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }

    /// Style de base (fond + texte)
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    /// Raccourci clavier dans le pied de page
    pub fn key(&self) -> Style {
        Style::default().fg(self.key).add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Couleur d'une variation : hausse (>= 0) ou baisse
    pub fn change(&self, change_pct: f64) -> Style {
        let color = if change_pct >= 0.0 {
            self.positive
        } else {
            self.negative
        };
        Style::default().fg(color)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.negative)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_selects_palette() {
        assert_eq!(Theme::for_mode(true), Theme::dark());
        assert_eq!(Theme::for_mode(false), Theme::light());
        assert_ne!(Theme::dark().background, Theme::light().background);
    }

    #[test]
    fn test_zero_change_uses_positive_color() {
        let theme = Theme::light();
        assert_eq!(theme.change(0.0), Style::default().fg(Color::Green));
        assert_eq!(theme.change(-1.0), Style::default().fg(Color::Red));
    }
}
