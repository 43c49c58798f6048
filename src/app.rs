// ============================================================================
// Structure : App
// ============================================================================
// État de l'interface : écran courant, sélection, saisie, confirmations.
//
// Les données elles-mêmes vivent ailleurs :
// - AppState               : liste des cryptos, favoris, mode sombre
// - MarketsController      : devise, recherche, tri, page de l'accueil
// - DetailController       : vue détail (id, devise, période)
// - ExchangeListController : plateformes d'échange
//
// Les méthodes qui nécessitent un appel réseau retournent des `Command` ;
// c'est la boucle principale qui les envoie au worker. Les `Outcome`
// revenus du worker repassent par `apply`.
// ============================================================================

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::detail::DetailController;
use crate::exchanges::ExchangeListController;
use crate::markets::MarketsController;
use crate::models::{CoinSummary, Exchange};
use crate::state::{AppState, Revision};
use crate::worker::{Command, Outcome};

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Accueil : liste des cryptomonnaies
    Markets,

    /// Cryptomonnaies en favoris
    Favorites,

    /// Graphique et fiche d'une cryptomonnaie
    Detail,

    /// Plateformes d'échange (liste + fiche)
    Exchanges,

    /// Saisie de la recherche (modal, revient à l'écran précédent)
    InputMode,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Markets => "Markets",
            Screen::Favorites => "Favorites",
            Screen::Detail => "Detail",
            Screen::Exchanges => "Exchanges",
            Screen::InputMode => "Search",
        }
    }
}

/// État principal de l'application
pub struct App {
    pub running: bool,

    pub current_screen: Screen,

    /// Écran de liste d'où vient la vue détail ou la saisie
    pub return_screen: Screen,

    /// Index sélectionné dans la liste visible
    pub selected_index: usize,

    /// Première pression de 'q' : on attend la seconde
    pub confirm_quit: bool,

    pub input_buffer: String,
    pub input_prompt: String,

    /// Message affiché dans le pied de page (erreur d'écriture, etc.)
    pub status_message: Option<String>,

    pub state: AppState,

    /// Abonnement aux révisions de `state`
    revisions: watch::Receiver<Revision>,

    /// Un résultat ou une touche a modifié l'affichage
    dirty: bool,

    pub markets: MarketsController,
    pub detail: DetailController,
    pub exchanges: ExchangeListController,
}

impl App {
    pub fn new(state: AppState, config: &Config) -> Self {
        let revisions = state.subscribe();
        Self {
            running: true,
            current_screen: Screen::Markets,
            return_screen: Screen::Markets,
            selected_index: 0,
            confirm_quit: false,
            input_buffer: String::new(),
            input_prompt: String::new(),
            status_message: None,
            state,
            revisions,
            dirty: true,
            markets: MarketsController::new(config.markets_per_fetch, config.coins_per_page),
            detail: DetailController::new(),
            exchanges: ExchangeListController::new(config.exchanges_per_page),
        }
    }

    /// Commandes à lancer au démarrage
    pub fn start(&mut self) -> Vec<Command> {
        vec![self.fetch_coins()]
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Redessin
    // ========================================================================

    /// Force un redessin au prochain tour de boucle
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// true si l'écran doit être redessiné ; consomme l'indicateur
    ///
    /// CONCEPT : canal `watch`
    /// - l'émetteur ne garde que la DERNIÈRE valeur, pas une file de messages
    /// - `has_changed` dit si une valeur a été publiée depuis notre dernière
    ///   lecture, `borrow_and_update` la marque comme vue
    /// - plusieurs écritures entre deux tours de boucle = un seul redessin
    pub fn needs_redraw(&mut self) -> bool {
        // Err seulement si l'émetteur est détruit : il vit dans self.state
        let state_changed = self.revisions.has_changed().unwrap_or(true);
        if state_changed {
            let revision = *self.revisions.borrow_and_update();
            debug!(?revision, "Shared state changed");
        }
        std::mem::take(&mut self.dirty) || state_changed
    }

    // ========================================================================
    // Résultats du worker
    // ========================================================================

    /// Applique un résultat du worker ; les réponses périmées sont ignorées
    pub fn apply(&mut self, outcome: Outcome) {
        self.dirty = true;
        match outcome {
            Outcome::Coins { generation, result } => {
                if self.state.apply_coins(generation, result) {
                    self.markets.source_replaced();
                    if matches!(self.current_screen, Screen::Markets | Screen::Favorites) {
                        self.selected_index = 0;
                    }
                }
            }
            Outcome::Detail { generation, result } => {
                self.detail.apply(generation, result);
            }
            Outcome::Exchanges { generation, result } => {
                if self.exchanges.apply_list(generation, result)
                    && self.current_screen == Screen::Exchanges
                {
                    self.selected_index = 0;
                }
            }
            Outcome::ExchangeDetail { generation, result } => {
                self.exchanges.apply_detail(generation, result);
            }
        }
    }

    // ========================================================================
    // Navigation entre écrans
    // ========================================================================

    pub fn show_markets(&mut self) {
        self.leave_current_screen();
        self.current_screen = Screen::Markets;
        self.selected_index = 0;
    }

    pub fn show_favorites(&mut self) {
        self.leave_current_screen();
        self.current_screen = Screen::Favorites;
        self.selected_index = 0;
    }

    /// Ouvre l'écran des plateformes ; la liste est chargée à la première visite
    pub fn show_exchanges(&mut self) -> Option<Command> {
        self.leave_current_screen();
        self.current_screen = Screen::Exchanges;
        self.selected_index = 0;

        if self.exchanges.list().is_idle() {
            Some(self.fetch_exchanges())
        } else {
            None
        }
    }

    /// Tab : Markets → Favorites → Exchanges → Markets
    pub fn next_screen(&mut self) -> Option<Command> {
        match self.current_screen {
            Screen::Markets => {
                self.show_favorites();
                None
            }
            Screen::Favorites => self.show_exchanges(),
            Screen::Exchanges | Screen::Detail => {
                self.show_markets();
                None
            }
            Screen::InputMode => None,
        }
    }

    /// Ouvre la vue détail de la crypto sélectionnée
    pub fn open_detail(&mut self) -> Option<Command> {
        let id = self.selected_coin()?.id.clone();
        self.return_screen = self.current_screen;
        self.current_screen = Screen::Detail;

        let request = self.detail.open(&id, self.markets.currency());
        Some(Command::AssembleDetail(request))
    }

    /// Ouvre la fiche de la plateforme sélectionnée
    pub fn open_exchange(&mut self) -> Option<Command> {
        let id = self.selected_exchange()?.id.clone();
        let request = self.exchanges.select(&id);
        Some(Command::FetchExchangeDetail(request))
    }

    /// Esc : ferme la vue détail ou la fiche de plateforme
    pub fn back(&mut self) {
        match self.current_screen {
            Screen::Detail => {
                self.detail.close();
                self.current_screen = self.return_screen;
            }
            Screen::Exchanges => self.exchanges.clear_selection(),
            _ => {}
        }
    }

    /// Abandonne les requêtes de l'écran qu'on quitte
    fn leave_current_screen(&mut self) {
        match self.current_screen {
            Screen::Detail => self.detail.close(),
            Screen::Exchanges => self.exchanges.clear_selection(),
            _ => {}
        }
    }

    pub fn is_on_detail(&self) -> bool {
        self.current_screen == Screen::Detail
    }

    pub fn is_on_exchanges(&self) -> bool {
        self.current_screen == Screen::Exchanges
    }

    // ========================================================================
    // Listes visibles et sélection
    // ========================================================================

    /// Cryptos visibles sur l'écran courant (ou l'écran de retour)
    pub fn visible_coins(&self) -> Vec<&CoinSummary> {
        match self.list_screen() {
            Screen::Favorites => self.state.favorite_coins(),
            _ => self.markets.visible(self.state.coins()).items,
        }
    }

    pub fn visible_exchanges(&self) -> Vec<&Exchange> {
        self.exchanges.visible().items
    }

    pub fn selected_coin(&self) -> Option<&CoinSummary> {
        match self.current_screen {
            Screen::Markets | Screen::Favorites => {
                self.visible_coins().get(self.selected_index).copied()
            }
            _ => None,
        }
    }

    pub fn selected_exchange(&self) -> Option<&Exchange> {
        if self.current_screen != Screen::Exchanges {
            return None;
        }
        self.visible_exchanges().get(self.selected_index).copied()
    }

    fn visible_len(&self) -> usize {
        match self.current_screen {
            Screen::Markets | Screen::Favorites => self.visible_coins().len(),
            Screen::Exchanges => self.visible_exchanges().len(),
            _ => 0,
        }
    }

    /// Écran de liste concerné par la recherche et la pagination
    fn list_screen(&self) -> Screen {
        match self.current_screen {
            Screen::InputMode | Screen::Detail => self.return_screen,
            screen => screen,
        }
    }

    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max_index = self.visible_len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    pub fn next_page(&mut self) {
        match self.current_screen {
            Screen::Markets => self.markets.next_page(self.state.coins()),
            Screen::Exchanges => self.exchanges.next_page(),
            _ => return,
        }
        self.selected_index = 0;
    }

    pub fn previous_page(&mut self) {
        match self.current_screen {
            Screen::Markets => self.markets.previous_page(),
            Screen::Exchanges => self.exchanges.previous_page(),
            _ => return,
        }
        self.selected_index = 0;
    }

    // ========================================================================
    // Paramètres : tri, devise, période
    // ========================================================================

    /// 's' : tri suivant ; sur l'accueil le tri change l'ordre serveur
    pub fn cycle_sort(&mut self) -> Option<Command> {
        self.selected_index = 0;
        match self.current_screen {
            Screen::Markets => {
                self.markets.cycle_sort();
                Some(self.fetch_coins())
            }
            Screen::Exchanges => {
                self.exchanges.cycle_sort();
                None
            }
            _ => None,
        }
    }

    /// 'c' : devise suivante
    ///
    /// Sur la vue détail, seule la devise de la vue change : la liste de
    /// l'accueil, sa devise et sa page restent intactes.
    pub fn cycle_currency(&mut self) -> Option<Command> {
        match self.current_screen {
            Screen::Markets | Screen::Favorites => {
                let currency = self.markets.cycle_currency();
                info!(currency = currency.code(), "User changed currency");
                Some(self.fetch_coins())
            }
            Screen::Detail => {
                let currency = self.detail.currency().next();
                info!(currency = currency.code(), "User changed detail currency");
                self.detail.set_currency(currency).map(Command::AssembleDetail)
            }
            Screen::Exchanges | Screen::InputMode => None,
        }
    }

    /// 'l' : période plus longue
    pub fn next_day_range(&mut self) -> Option<Command> {
        if !self.is_on_detail() {
            return None;
        }
        let range = self.detail.day_range().next();
        self.detail.set_day_range(range).map(Command::AssembleDetail)
    }

    /// 'h' : période plus courte
    pub fn previous_day_range(&mut self) -> Option<Command> {
        if !self.is_on_detail() {
            return None;
        }
        let range = self.detail.day_range().previous();
        self.detail.set_day_range(range).map(Command::AssembleDetail)
    }

    /// 'r' : relance le chargement de l'écran courant
    pub fn refresh(&mut self) -> Vec<Command> {
        match self.current_screen {
            Screen::Markets | Screen::Favorites => vec![self.fetch_coins()],
            Screen::Detail => self
                .detail
                .refresh()
                .map(Command::AssembleDetail)
                .into_iter()
                .collect(),
            Screen::Exchanges => {
                let mut commands = vec![self.fetch_exchanges()];
                if let Some(id) = self.exchanges.selected_id().map(str::to_string) {
                    commands.push(Command::FetchExchangeDetail(self.exchanges.select(&id)));
                }
                commands
            }
            Screen::InputMode => Vec::new(),
        }
    }

    fn fetch_coins(&mut self) -> Command {
        let generation = self.state.begin_coins_fetch();
        Command::FetchCoins(self.markets.request(generation))
    }

    fn fetch_exchanges(&mut self) -> Command {
        Command::FetchExchanges {
            generation: self.exchanges.refresh(),
        }
    }

    // ========================================================================
    // Préférences
    // ========================================================================

    /// 'f' : bascule le favori de la crypto sélectionnée (ou affichée)
    pub fn toggle_favorite(&mut self) {
        let id = match self.current_screen {
            Screen::Detail => self.detail.id().map(str::to_string),
            _ => self.selected_coin().map(|c| c.id.clone()),
        };
        let Some(id) = id else {
            return;
        };

        match self.state.toggle_favorite(&id) {
            Ok(now_favorite) => {
                self.status_message = None;
                if self.current_screen == Screen::Favorites && !now_favorite {
                    let max_index = self.visible_len().saturating_sub(1);
                    self.selected_index = self.selected_index.min(max_index);
                }
            }
            Err(e) => {
                warn!(coin = %id, error = %e, "Could not save favorites");
                self.status_message = Some(format!("Could not save favorites: {}", e));
            }
        }
    }

    /// 't' : bascule le mode sombre
    pub fn toggle_theme(&mut self) {
        if let Err(e) = self.state.toggle_dark_mode() {
            warn!(error = %e, "Could not save theme");
            self.status_message = Some(format!("Could not save theme: {}", e));
        }
    }

    // ========================================================================
    // Saisie de la recherche
    // ========================================================================

    /// '/' : ouvre la saisie, pré-remplie avec la recherche courante
    pub fn start_search(&mut self) {
        if !matches!(self.current_screen, Screen::Markets | Screen::Exchanges) {
            return;
        }
        self.return_screen = self.current_screen;
        self.input_buffer = self.search_text().to_string();
        self.input_prompt = "Search: ".to_string();
        self.current_screen = Screen::InputMode;
    }

    /// Esc : efface la recherche et revient à la liste
    pub fn cancel_input(&mut self) {
        self.input_buffer.clear();
        self.apply_search();
        self.close_input();
    }

    /// Enter : garde la recherche et revient à la liste
    pub fn submit_input(&mut self) -> String {
        let value = self.input_buffer.clone();
        debug!(search = %value, "Search submitted");
        self.close_input();
        value
    }

    /// Chaque caractère met à jour la liste immédiatement
    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
        self.apply_search();
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
        self.apply_search();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::InputMode
    }

    /// Recherche courante de l'écran de liste
    pub fn search_text(&self) -> &str {
        match self.list_screen() {
            Screen::Exchanges => &self.exchanges.query().search_text,
            _ => &self.markets.query().search_text,
        }
    }

    fn apply_search(&mut self) {
        match self.return_screen {
            Screen::Exchanges => self.exchanges.set_search_text(&self.input_buffer),
            _ => self.markets.set_search_text(&self.input_buffer),
        }
        self.selected_index = 0;
    }

    fn close_input(&mut self) {
        self.current_screen = self.return_screen;
        self.input_prompt.clear();
        self.input_buffer.clear();
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
