// ============================================================================
// Chart - Vue détaillée d'une cryptomonnaie
// ============================================================================
// Trois zones :
// - header : nom, prix, tendance 24h, période
// - graphique ligne de l'historique des prix
// - statistiques : capitalisation, volume, ATH, rang, offre en circulation
//
// La couleur du graphique suit la tendance 24h de la fiche, pas la pente
// de la courbe affichée.
// ============================================================================

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::detail::DetailViewModel;
use crate::loader::LoadState;
use crate::models::{Currency, DayRange};
use crate::ui::dashboard::{render_fetch_error, render_loading, render_message};
use crate::ui::theme::Theme;

/// Dessine la vue détail de la crypto ouverte
pub fn render_detail(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border())
        .title(Span::styled(
            format!(" {} ", app.detail.id().unwrap_or("?")),
            theme.title(),
        ));

    let view = match app.detail.view().state() {
        LoadState::Ready(view) => view,
        LoadState::Loading => {
            let message = format!(
                "Loading {} ({}, {})...",
                app.detail.id().unwrap_or("?"),
                app.detail.currency().label(),
                app.detail.day_range().label()
            );
            render_loading(frame, theme, block, area, &message);
            return;
        }
        LoadState::Failed(e) => {
            render_fetch_error(frame, theme, block, area, e);
            return;
        }
        LoadState::Idle => {
            render_message(frame, block, area, "No coin selected", theme.muted());
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(5),
        ])
        .split(area)
        .to_vec();

    let favorite = app.state.is_favorite(&view.coin.id);
    render_detail_header(frame, view, favorite, theme, chunks[0]);
    render_price_chart(frame, view, theme, chunks[1]);
    render_stats(frame, view, theme, chunks[2]);
}

// ============================================================================
// Header
// ============================================================================

fn render_detail_header(
    frame: &mut Frame,
    view: &DetailViewModel,
    favorite: bool,
    theme: &Theme,
    area: Rect,
) {
    let star = if favorite { "★ " } else { "" };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border())
        .title(Span::styled(
            format!(" {}{} ({}) ", star, view.coin.name, view.coin.symbol.to_uppercase()),
            theme.title(),
        ));

    let change = view.coin.change_24h();
    let color = if view.trend.is_up() {
        theme.positive
    } else {
        theme.negative
    };

    let price = view
        .price()
        .map(|p| view.currency.format(p))
        .unwrap_or_else(|| "N/A".to_string());

    let line = Line::from(vec![
        Span::raw("Price: "),
        Span::styled(price, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            format!("{} {:+.2}% (24h)", view.trend.arrow(), change),
            Style::default().fg(color),
        ),
        Span::raw("  "),
        Span::styled(format!("[{}]", view.day_range.label()), theme.key()),
    ]);

    let paragraph = Paragraph::new(line).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Graphique
// ============================================================================

fn render_price_chart(frame: &mut Frame, view: &DetailViewModel, theme: &Theme, area: Rect) {
    let points = view.chart_points();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border())
        .title(Span::styled(
            format!(" Price ({}) · {} ", view.currency.code().to_uppercase(), view.day_range.label()),
            theme.title(),
        ));

    let (Some(first), Some(last), Some((min_price, max_price))) = (
        view.series.first(),
        view.series.last(),
        view.series.price_bounds(),
    ) else {
        render_message(frame, block, area, "No price history for this period", theme.muted());
        return;
    };

    // Marge de 5% pour que la courbe ne touche pas les bords
    let margin = ((max_price - min_price) * 0.05).max(max_price.abs() * 0.001);
    let y_min = (min_price - margin).max(0.0);
    let y_max = max_price + margin;

    let x_min = first.timestamp_ms as f64 / 1000.0;
    let x_max = (last.timestamp_ms as f64 / 1000.0).max(x_min + 1.0);

    let color = if view.trend.is_up() {
        theme.positive
    } else {
        theme.negative
    };

    let datasets = vec![Dataset::default()
        .name(view.coin.symbol.to_uppercase())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let x_axis = Axis::default()
        .style(theme.muted())
        .bounds([x_min, x_max])
        .labels(
            [x_min, (x_min + x_max) / 2.0, x_max]
                .into_iter()
                .map(|ts| Span::raw(axis_date(ts, view.day_range)))
                .collect(),
        );

    let y_axis = Axis::default()
        .style(theme.muted())
        .bounds([y_min, y_max])
        .labels(
            [y_min, (y_min + y_max) / 2.0, y_max]
                .into_iter()
                .map(|price| Span::raw(axis_price(price, view.currency)))
                .collect(),
        );

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Date d'un label de l'axe X (timestamp en secondes)
fn axis_date(timestamp_secs: f64, range: DayRange) -> String {
    let format = match range {
        DayRange::Week => "%d %b %H:%M",
        DayRange::Month | DayRange::Quarter => "%d %b",
    };
    DateTime::<Utc>::from_timestamp(timestamp_secs as i64, 0)
        .map(|dt| dt.format(format).to_string())
        .unwrap_or_default()
}

/// Prix d'un label de l'axe Y : moins de décimales pour les gros montants
fn axis_price(price: f64, currency: Currency) -> String {
    if price >= 100.0 {
        format!("{}{:.0}", currency.symbol(), price)
    } else if price >= 1.0 {
        format!("{}{:.2}", currency.symbol(), price)
    } else {
        format!("{}{:.6}", currency.symbol(), price)
    }
}

// ============================================================================
// Statistiques
// ============================================================================

fn render_stats(frame: &mut Frame, view: &DetailViewModel, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border());

    let amount = |value: Option<f64>| {
        value
            .map(|v| view.currency.format(v))
            .unwrap_or_else(|| "N/A".to_string())
    };

    let rank = view
        .coin
        .market_cap_rank
        .map(|r| format!("#{}", r))
        .unwrap_or_else(|| "N/A".to_string());

    let supply = view
        .coin
        .market_data
        .circulating_supply
        .map(|s| format!("{:.0}", s))
        .unwrap_or_else(|| "N/A".to_string());

    let last_quote = view
        .series
        .last()
        .and_then(|p| p.datetime())
        .map(|dt| dt.format("%d %b %H:%M UTC").to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let label = |text: &'static str| Span::styled(text, theme.muted());
    let value = |text: String| Span::styled(text, Style::default().fg(theme.text).add_modifier(Modifier::BOLD));

    let lines = vec![
        Line::from(vec![
            label("Market cap: "),
            value(amount(view.coin.market_cap(view.currency))),
            label("   Volume 24h: "),
            value(amount(view.coin.total_volume(view.currency))),
            label("   Rank: "),
            value(rank),
        ]),
        Line::from(vec![
            label("All-time high: "),
            value(amount(view.coin.all_time_high(view.currency))),
            label("   Circulating supply: "),
            value(supply),
        ]),
        Line::from(vec![label("Last quote: "), value(last_quote)]),
    ];

    let paragraph = Paragraph::new(lines).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_date_format_depends_on_range() {
        // 2023-11-14 22:13:20 UTC
        let ts = 1_700_000_000.0;
        assert_eq!(axis_date(ts, DayRange::Month), "14 Nov");
        assert_eq!(axis_date(ts, DayRange::Week), "14 Nov 22:13");
    }

    #[test]
    fn test_axis_price_precision() {
        assert_eq!(axis_price(42000.4, Currency::Usd), "$42000");
        assert_eq!(axis_price(1.5, Currency::Eur), "€1.50");
        assert_eq!(axis_price(0.000123, Currency::Gbp), "£0.000123");
    }
}
