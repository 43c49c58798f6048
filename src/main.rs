// ============================================================================
// LazyCoin - Tableau de bord des marchés crypto dans le terminal
// ============================================================================
// Branche ensemble :
// - le logging (fichier rotatif, le terminal est occupé par le TUI)
// - la configuration et le magasin de préférences
// - le client CoinGecko et le worker d'arrière-plan
// - la boucle d'événements (render → input → résultats du worker)
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use lazycoin::api::CoinGeckoClient;
use lazycoin::app::App;
use lazycoin::config::{self, Config};
use lazycoin::state::AppState;
use lazycoin::store::FileStore;
use lazycoin::ui::{render, Event, EventHandler};
use lazycoin::worker::{spawn_worker, Command, Outcome};

// ============================================================================
// Initialisation du logging
// ============================================================================

/// Initialise le logging vers ./logs/lazycoin.log (rotation quotidienne)
///
/// ```bash
/// tail -f logs/lazycoin.log
/// RUST_LOG=lazycoin=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazycoin.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazycoin=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(version = env!("CARGO_PKG_VERSION"), "LazyCoin starting up");

    let data_dir = config::data_dir();
    let config = Config::load(&data_dir);
    let store = FileStore::in_dir(&data_dir);
    info!(preferences = %store.path().display(), "Preference store opened");

    let gateway = CoinGeckoClient::new(&config).context("Échec de l'initialisation du client CoinGecko")?;

    let (command_tx, command_rx) = mpsc::channel::<Command>();
    let (outcome_tx, outcome_rx) = mpsc::channel::<Outcome>();

    info!("Spawning background worker thread");
    let worker = spawn_worker(Arc::new(gateway), command_rx, outcome_tx)?;

    let mut app = App::new(AppState::new(Box::new(store)), &config);
    send_all(&command_tx, app.start());

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    info!("Starting event loop");
    let events = EventHandler::new();
    let result = run(&mut terminal, &mut app, &events, &command_tx, &outcome_rx);

    // Restaure le terminal même en cas d'erreur
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    // Ferme le channel : le worker sort de sa boucle
    drop(command_tx);
    if worker.join().is_err() {
        error!("Worker thread panicked");
    }

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event Loop Principal
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<Command>,
    outcome_rx: &mpsc::Receiver<Outcome>,
) -> Result<()> {
    while app.is_running() {
        // 0. RÉSULTATS : applique tout ce que le worker a terminé
        loop {
            match outcome_rx.try_recv() {
                Ok(outcome) => app.apply(outcome),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    break;
                }
            }
        }

        // 1. RENDER : seulement si quelque chose a changé depuis le dernier dessin
        if app.needs_redraw() {
            terminal.draw(|frame| render(frame, app))?;
        }

        // 2. INPUT
        match events.next() {
            Ok(Event::Tick) => {}
            Ok(event) => {
                let commands = handle_event(app, &event);
                send_all(command_tx, commands);
                app.mark_dirty();
            }
            Err(e) => debug!(error = %e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

fn send_all(command_tx: &mpsc::Sender<Command>, commands: Vec<Command>) {
    for command in commands {
        if command_tx.send(command).is_err() {
            error!("Worker channel closed, command dropped");
        }
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement ; retourne les commandes à envoyer au worker
fn handle_event(app: &mut App, event: &Event) -> Vec<Command> {
    use lazycoin::ui::events::{
        get_char_from_event, is_backspace_event, is_currency_event, is_down_event,
        is_enter_event, is_escape_event, is_favorite_event, is_next_page_event,
        is_next_range_event, is_previous_page_event, is_previous_range_event, is_quit_event,
        is_refresh_event, is_search_char_event, is_search_event, is_sort_event, is_tab_event,
        is_theme_event, is_up_event, screen_shortcut,
    };

    if !matches!(event, Event::Key(_)) {
        return Vec::new();
    }

    // ========================================
    // Saisie de la recherche : capture toutes les touches
    // ========================================
    if app.is_in_input_mode() {
        if is_escape_event(event) {
            debug!("User cleared search");
            app.cancel_input();
        } else if is_enter_event(event) {
            let search = app.submit_input();
            info!(search = %search, "User submitted search");
        } else if is_backspace_event(event) {
            app.backspace();
        } else if is_search_char_event(event) {
            if let Some(c) = get_char_from_event(event) {
                app.append_char(c);
            }
        }
        return Vec::new();
    }

    // Quit en deux temps ; toute autre touche annule la confirmation
    if is_quit_event(event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return Vec::new();
    }
    app.cancel_quit();

    if let Some(n) = screen_shortcut(event) {
        return match n {
            1 => {
                app.show_markets();
                Vec::new()
            }
            2 => {
                app.show_favorites();
                Vec::new()
            }
            _ => app.show_exchanges().into_iter().collect(),
        };
    }

    if is_tab_event(event) {
        app.next_screen().into_iter().collect()
    } else if is_up_event(event) {
        app.navigate_up();
        Vec::new()
    } else if is_down_event(event) {
        app.navigate_down();
        Vec::new()
    } else if is_next_page_event(event) {
        app.next_page();
        Vec::new()
    } else if is_previous_page_event(event) {
        app.previous_page();
        Vec::new()
    } else if is_enter_event(event) {
        if app.is_on_exchanges() {
            app.open_exchange().into_iter().collect()
        } else {
            app.open_detail().into_iter().collect()
        }
    } else if is_escape_event(event) {
        debug!(screen = ?app.current_screen, "User pressed back");
        app.back();
        Vec::new()
    } else if is_next_range_event(event) {
        app.next_day_range().into_iter().collect()
    } else if is_previous_range_event(event) {
        app.previous_day_range().into_iter().collect()
    } else if is_search_event(event) {
        app.start_search();
        Vec::new()
    } else if is_sort_event(event) {
        app.cycle_sort().into_iter().collect()
    } else if is_currency_event(event) {
        app.cycle_currency().into_iter().collect()
    } else if is_favorite_event(event) {
        app.toggle_favorite();
        Vec::new()
    } else if is_theme_event(event) {
        app.toggle_theme();
        Vec::new()
    } else if is_refresh_event(event) {
        info!(screen = ?app.current_screen, "User requested refresh");
        app.refresh()
    } else {
        Vec::new()
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
