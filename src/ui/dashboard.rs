// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Découpage de l'écran :
//   ┌ header : onglets, devise ┐
//   │ contenu de l'écran       │
//   └ footer : raccourcis      ┘
//
// Le contenu dépend de l'écran courant :
// - Markets / Favorites : liste des cryptomonnaies
// - Detail              : graphique + fiche (chart.rs)
// - Exchanges           : liste + fiche de plateforme (exchanges.rs)
// - InputMode           : la liste d'origine, avec la saisie dans le footer
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::error::FetchError;
use crate::loader::LoadState;
use crate::models::{CoinSummary, Currency};
use crate::query::Page;
use crate::ui::theme::Theme;
use crate::ui::{chart, exchanges};

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let theme = Theme::for_mode(app.state.dark_mode());
    let size = frame.size();

    frame.render_widget(Block::default().style(theme.base()), size);

    let chunks = create_layout(size);
    render_header(frame, app, &theme, chunks[0]);

    let content_screen = match app.current_screen {
        Screen::InputMode => app.return_screen,
        screen => screen,
    };

    match content_screen {
        Screen::Markets | Screen::Favorites => render_coin_list(frame, app, &theme, chunks[1]),
        Screen::Detail => chart::render_detail(frame, app, &theme, chunks[1]),
        Screen::Exchanges => exchanges::render_exchanges(frame, app, &theme, chunks[1]),
        Screen::InputMode => {}
    }

    if app.is_in_input_mode() {
        render_input_footer(frame, app, &theme, chunks[2]);
    } else {
        render_footer(frame, app, &theme, chunks[2]);
    }
}

/// Header, contenu, footer
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header : onglets
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border())
        .title(Span::styled(" LazyCoin ", theme.title()))
        .title_alignment(Alignment::Center);

    let active = match app.current_screen {
        Screen::InputMode | Screen::Detail => app.return_screen,
        screen => screen,
    };

    let mut spans = Vec::new();
    for (key, screen) in [
        ("1", Screen::Markets),
        ("2", Screen::Favorites),
        ("3", Screen::Exchanges),
    ] {
        let style = if screen == active {
            theme.title().add_modifier(Modifier::REVERSED)
        } else {
            theme.muted()
        };
        spans.push(Span::styled(format!(" [{}] {} ", key, screen.title()), style));
        spans.push(Span::raw("  "));
    }

    let currency = if app.is_on_detail() {
        app.detail.currency()
    } else {
        app.markets.currency()
    };
    spans.push(Span::styled(
        format!("{} ({})", currency.label(), currency.symbol()),
        theme.key(),
    ));
    if app.state.dark_mode() {
        spans.push(Span::styled("  ☾", theme.muted()));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Liste des cryptomonnaies (Markets et Favorites)
// ============================================================================

fn render_coin_list(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let on_favorites = match app.current_screen {
        Screen::InputMode => app.return_screen == Screen::Favorites,
        screen => screen == Screen::Favorites,
    };
    let currency = app.markets.currency();

    let title = if on_favorites {
        format!(" ★ Favorites ({}) ", app.state.favorites().set().len())
    } else {
        let page = app.markets.visible(app.state.coins());
        format!(
            " Markets · {} · {} ",
            page_label(&page),
            app.markets.query().sort_key.label()
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border())
        .title(Span::styled(title, theme.title()));

    match app.state.coins_loader().state() {
        LoadState::Idle | LoadState::Loading => {
            render_loading(frame, theme, block, area, "Loading coins...");
            return;
        }
        LoadState::Failed(e) => {
            render_fetch_error(frame, theme, block, area, e);
            return;
        }
        LoadState::Ready(_) => {}
    }

    let coins = app.visible_coins();
    if coins.is_empty() {
        let message = if on_favorites && app.state.favorites().set().is_empty() {
            "No favorites yet: press [f] on a coin"
        } else if on_favorites {
            // Favoris hors de la liste chargée (autre tri, autre page serveur)
            "None of your favorites are in the loaded list"
        } else if !app.search_text().is_empty() {
            "No coin matches the search"
        } else {
            "No coins"
        };
        render_message(frame, block, area, message, theme.muted());
        return;
    }

    let items: Vec<ListItem> = coins
        .iter()
        .enumerate()
        .map(|(index, coin)| {
            let line = coin_line(coin, app.state.is_favorite(&coin.id), currency, theme);
            let item = ListItem::new(line);
            if index == app.selected_index && !app.is_in_input_mode() {
                item.style(theme.selected())
            } else {
                item
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Une ligne de la liste : favori puis "BTC  Bitcoin  $67000.00  ▲ +2.11%"
fn coin_line(coin: &CoinSummary, favorite: bool, currency: Currency, theme: &Theme) -> Line<'static> {
    let star = if favorite {
        Span::styled(" ★ ", Style::default().fg(theme.favorite))
    } else {
        Span::styled(" ☆ ", theme.muted())
    };

    Line::from(vec![
        star,
        Span::styled(coin.display(currency), theme.change(coin.price_change_percentage_24h)),
    ])
}

// ============================================================================
// Panneaux partagés : chargement, erreur, message
// ============================================================================

/// "page 2/5" avec des flèches quand une page voisine existe
pub(crate) fn page_label<T>(page: &Page<'_, T>) -> String {
    format!(
        "{}page {}/{}{}",
        if page.has_previous() { "◀ " } else { "" },
        page.page,
        page.page_count,
        if page.has_next() { " ▶" } else { "" }
    )
}

pub(crate) fn render_loading(frame: &mut Frame, theme: &Theme, block: Block, area: Rect, message: &str) {
    render_message(frame, block, area, message, theme.muted().add_modifier(Modifier::ITALIC));
}

pub(crate) fn render_fetch_error(frame: &mut Frame, theme: &Theme, block: Block, area: Rect, error: &FetchError) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "⚠ Could not load data",
            theme.error().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(error.to_string(), theme.error())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[r]", theme.key()),
            Span::styled(" Retry", theme.muted()),
        ]),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

pub(crate) fn render_message(frame: &mut Frame, block: Block, area: Rect, message: &str, style: Style) {
    let text = vec![Line::from(""), Line::from(Span::styled(message.to_string(), style))];
    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : raccourcis
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border());

    let line = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Press ", theme.key()),
            Span::styled(
                "[q]",
                theme.error().add_modifier(Modifier::BOLD).add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(" again to quit, any other key to cancel ⚠", theme.key()),
        ])
    } else if let Some(status) = &app.status_message {
        Line::from(Span::styled(status.clone(), theme.error().add_modifier(Modifier::BOLD)))
    } else {
        shortcuts_line(app.current_screen, theme)
    };

    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn shortcuts_line(screen: Screen, theme: &Theme) -> Line<'static> {
    let shortcuts: &[(&str, &str)] = match screen {
        Screen::Markets => &[
            ("[q]", "Quit"),
            ("[↑↓]", "Move"),
            ("[←→]", "Page"),
            ("[Enter]", "Detail"),
            ("[/]", "Search"),
            ("[s]", "Sort"),
            ("[c]", "Currency"),
            ("[f]", "Favorite"),
            ("[t]", "Theme"),
        ],
        Screen::Favorites => &[
            ("[q]", "Quit"),
            ("[↑↓]", "Move"),
            ("[Enter]", "Detail"),
            ("[f]", "Unfavorite"),
            ("[c]", "Currency"),
            ("[Tab]", "Next"),
        ],
        Screen::Detail => &[
            ("[Esc]", "Back"),
            ("[h/l]", "Range"),
            ("[c]", "Currency"),
            ("[f]", "Favorite"),
            ("[r]", "Refresh"),
        ],
        Screen::Exchanges => &[
            ("[q]", "Quit"),
            ("[↑↓]", "Move"),
            ("[←→]", "Page"),
            ("[Enter]", "Open"),
            ("[Esc]", "Close"),
            ("[/]", "Search"),
            ("[s]", "Sort"),
        ],
        Screen::InputMode => &[],
    };

    let mut spans = Vec::new();
    for (key, label) in shortcuts {
        spans.push(Span::styled(key.to_string(), theme.key()));
        spans.push(Span::raw(format!(" {}  ", label)));
    }
    Line::from(spans)
}

/// Footer en mode saisie : prompt + buffer + curseur
fn render_input_footer(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.positive));

    let input_line = Line::from(vec![
        Span::styled(app.input_prompt.as_str(), theme.title()),
        Span::styled(app.input_buffer.as_str(), Style::default().fg(theme.text)),
        Span::styled("█", Style::default().fg(theme.text).add_modifier(Modifier::SLOW_BLINK)),
        Span::raw("   "),
        Span::styled("[Enter]", theme.key()),
        Span::raw(" Keep  "),
        Span::styled("[Esc]", theme.key()),
        Span::raw(" Clear"),
    ]);

    let paragraph = Paragraph::new(vec![input_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::config::Config;
    use crate::state::AppState;
    use crate::store::MemoryStore;
    use crate::worker::{Command, Outcome};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_loading_then_list() {
        let mut app = App::new(AppState::new(Box::new(MemoryStore::new())), &Config::default());
        let commands = app.start();
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();

        terminal.draw(|frame| render(frame, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("Loading coins"));

        let Command::FetchCoins(request) = &commands[0] else {
            panic!("expected a coin fetch");
        };
        app.apply(Outcome::Coins {
            generation: request.generation,
            result: Ok(vec![CoinSummary {
                id: "bitcoin".to_string(),
                symbol: "btc".to_string(),
                name: "Bitcoin".to_string(),
                image: String::new(),
                current_price: 42000.5,
                price_change_percentage_24h: -1.25,
                market_cap: 1.0,
            }]),
        });

        terminal.draw(|frame| render(frame, &app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Bitcoin"));
        assert!(text.contains("BTC"));
        assert!(text.contains("-1.25%"));
    }

    #[test]
    fn test_favorites_outside_loaded_list() {
        let mut app = App::new(AppState::new(Box::new(MemoryStore::new())), &Config::default());
        let commands = app.start();
        let Command::FetchCoins(request) = &commands[0] else {
            panic!("expected a coin fetch");
        };
        app.apply(Outcome::Coins {
            generation: request.generation,
            result: Ok(vec![CoinSummary {
                id: "bitcoin".to_string(),
                symbol: "btc".to_string(),
                name: "Bitcoin".to_string(),
                image: String::new(),
                current_price: 42000.0,
                price_change_percentage_24h: 0.0,
                market_cap: 1.0,
            }]),
        });
        app.show_favorites();

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("No favorites yet"));

        app.state.toggle_favorite("solana").unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("None of your favorites are in the loaded list"));
        assert!(!text.contains("No favorites yet"));
    }

    #[test]
    fn test_render_fetch_error_panel() {
        let mut app = App::new(AppState::new(Box::new(MemoryStore::new())), &Config::default());
        let commands = app.start();
        let Command::FetchCoins(request) = &commands[0] else {
            panic!("expected a coin fetch");
        };
        app.apply(Outcome::Coins {
            generation: request.generation,
            result: Err(FetchError::status(503)),
        });

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("HTTP 503"));
    }
}
