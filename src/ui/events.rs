// ============================================================================
// Gestion des événements
// ============================================================================
// Lit les événements clavier (crossterm) avec un timeout de 250 ms ; sans
// événement, on renvoie un Tick pour que la boucle continue à appliquer les
// résultats du worker.
//
// Les helpers `is_*_event` traduisent une touche en intention. Le contexte
// (écran courant) est géré par la boucle principale.
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Le terminal a changé de taille : il faut redessiner
    Resize,

    /// Pas d'événement pendant le timeout
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant au plus `tick_rate`)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS on reçoit Press ET Release : on garde Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                CrosstermEvent::Resize(_, _) => Ok(Event::Resize),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : touche → intention
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Resize | Event::Tick => None,
    }
}

fn is_char(event: &Event, expected: char) -> bool {
    matches!(key_code(event), Some(KeyCode::Char(c)) if c.eq_ignore_ascii_case(&expected))
}

/// 'q' (quitter, en deux temps)
pub fn is_quit_event(event: &Event) -> bool {
    is_char(event, 'q')
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

pub fn is_tab_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Tab))
}

/// Flèche haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Up)) || is_char(event, 'k')
}

/// Flèche bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Down)) || is_char(event, 'j')
}

/// Flèche droite ou 'n' : page suivante
pub fn is_next_page_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Right)) || is_char(event, 'n')
}

/// Flèche gauche ou 'p' : page précédente
pub fn is_previous_page_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Left)) || is_char(event, 'p')
}

/// 'l' : période plus longue (vue détail)
pub fn is_next_range_event(event: &Event) -> bool {
    is_char(event, 'l')
}

/// 'h' : période plus courte (vue détail)
pub fn is_previous_range_event(event: &Event) -> bool {
    is_char(event, 'h')
}

pub fn is_search_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('/')))
}

pub fn is_sort_event(event: &Event) -> bool {
    is_char(event, 's')
}

pub fn is_currency_event(event: &Event) -> bool {
    is_char(event, 'c')
}

pub fn is_favorite_event(event: &Event) -> bool {
    is_char(event, 'f')
}

pub fn is_theme_event(event: &Event) -> bool {
    is_char(event, 't')
}

pub fn is_refresh_event(event: &Event) -> bool {
    is_char(event, 'r')
}

/// '1', '2', '3' : accès direct aux écrans de liste
pub fn screen_shortcut(event: &Event) -> Option<u8> {
    match key_code(event) {
        Some(KeyCode::Char(c @ '1'..='3')) => c.to_digit(10).map(|d| d as u8),
        _ => None,
    }
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// Caractère acceptable dans la recherche
pub fn is_search_char_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char(c)) if !c.is_control())
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key_code(event) {
        Some(KeyCode::Char(c)) => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(is_quit_event(&key(KeyCode::Char('Q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
        assert!(!is_quit_event(&Event::Resize));
    }

    #[test]
    fn test_vim_and_arrow_navigation() {
        assert!(is_up_event(&key(KeyCode::Up)));
        assert!(is_up_event(&key(KeyCode::Char('k'))));
        assert!(is_down_event(&key(KeyCode::Char('j'))));
        assert!(is_next_page_event(&key(KeyCode::Right)));
        assert!(is_previous_page_event(&key(KeyCode::Char('p'))));
        assert!(!is_next_page_event(&key(KeyCode::Char('l'))));
    }

    #[test]
    fn test_screen_shortcuts() {
        assert_eq!(screen_shortcut(&key(KeyCode::Char('1'))), Some(1));
        assert_eq!(screen_shortcut(&key(KeyCode::Char('3'))), Some(3));
        assert_eq!(screen_shortcut(&key(KeyCode::Char('4'))), None);
        assert_eq!(screen_shortcut(&Event::Tick), None);
    }

    #[test]
    fn test_search_chars() {
        assert!(is_search_char_event(&key(KeyCode::Char(' '))));
        assert!(is_search_char_event(&key(KeyCode::Char('é'))));
        assert!(!is_search_char_event(&key(KeyCode::Enter)));
        assert_eq!(get_char_from_event(&key(KeyCode::Char('x'))), Some('x'));
    }
}
