// ============================================================================
// Exchanges - Liste et fiche des plateformes d'échange
// ============================================================================
// Écran partagé en deux :
// - à gauche, la liste paginée (nom, volume 24h en BTC, trust score)
// - à droite, la fiche de la plateforme ouverte avec [Enter]
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::loader::LoadState;
use crate::models::Exchange;
use crate::ui::dashboard::{page_label, render_fetch_error, render_loading, render_message};
use crate::ui::theme::Theme;

pub fn render_exchanges(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area)
        .to_vec();

    render_exchange_list(frame, app, theme, chunks[0]);
    render_exchange_detail(frame, app, theme, chunks[1]);
}

fn render_exchange_list(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let page = app.exchanges.visible();
    let title = format!(
        " Exchanges · {} · {} ",
        page_label(&page),
        app.exchanges.query().sort_key.label()
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border())
        .title(Span::styled(title, theme.title()));

    match app.exchanges.list().state() {
        LoadState::Idle | LoadState::Loading => {
            render_loading(frame, theme, block, area, "Loading exchanges...");
            return;
        }
        LoadState::Failed(e) => {
            render_fetch_error(frame, theme, block, area, e);
            return;
        }
        LoadState::Ready(_) => {}
    }

    if page.is_empty() {
        render_message(frame, block, area, "No exchange matches the search", theme.muted());
        return;
    }

    let selected_id = app.exchanges.selected_id();
    let items: Vec<ListItem> = page
        .items
        .iter()
        .enumerate()
        .map(|(index, exchange)| {
            let marker = if selected_id == Some(exchange.id.as_str()) {
                "▶ "
            } else {
                "  "
            };

            let line = Line::from(vec![
                Span::styled(marker, theme.title()),
                Span::styled(format!("{:<22}", exchange.name), Style::default().fg(theme.text)),
                Span::styled(
                    format!("{:>14.2} BTC", exchange.trade_volume_24h_btc),
                    Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  trust {:>2}/10", exchange.trust_score), trust_style(exchange, theme)),
            ]);

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

fn trust_style(exchange: &Exchange, theme: &Theme) -> Style {
    match exchange.trust_score {
        8.. => Style::default().fg(theme.positive),
        5..=7 => Style::default().fg(theme.key),
        _ => Style::default().fg(theme.negative),
    }
}

fn render_exchange_detail(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border())
        .title(Span::styled(" Details ", theme.title()));

    let exchange = match app.exchanges.detail().state() {
        LoadState::Ready(exchange) => exchange,
        LoadState::Loading => {
            let message = format!("Loading {}...", app.exchanges.selected_id().unwrap_or("?"));
            render_loading(frame, theme, block, area, &message);
            return;
        }
        LoadState::Failed(e) => {
            render_fetch_error(frame, theme, block, area, e);
            return;
        }
        LoadState::Idle => {
            render_message(frame, block, area, "Press [Enter] to open an exchange", theme.muted());
            return;
        }
    };

    let label = |text: &'static str| Span::styled(text, theme.muted());
    let value = |text: String| Span::styled(text, Style::default().fg(theme.text));
    let or_na = |v: Option<String>| v.unwrap_or_else(|| "N/A".to_string());

    let mut lines = vec![
        Line::from(Span::styled(exchange.name.clone(), theme.title())),
        Line::from(""),
        Line::from(vec![label("Country: "), value(or_na(exchange.country.clone()))]),
        Line::from(vec![
            label("Established: "),
            value(or_na(exchange.year_established.map(|y| y.to_string()))),
        ]),
        Line::from(vec![
            label("Trust score: "),
            Span::styled(format!("{}/10", exchange.trust_score), trust_style(exchange, theme)),
            label("   Rank: "),
            value(format!("#{}", exchange.trust_score_rank)),
        ]),
        Line::from(vec![
            label("Volume 24h: "),
            value(format!("{:.2} BTC", exchange.trade_volume_24h_btc)),
        ]),
        Line::from(""),
    ];

    for (name, url) in exchange.social_links() {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<10}", name), theme.key()),
            value(url),
        ]));
    }

    if let Some(description) = exchange.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(value(description.trim().to_string())));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
