// ============================================================================
// Contrôleur de la liste des cryptomonnaies (écran Markets)
// ============================================================================
// Garde la devise et les paramètres de requête de l'écran d'accueil.
//
// - Changer la devise ou le tri relance le fetch de la liste (l'ordre
//   serveur dépend du tri)
// - La recherche et la pagination restent locales (derive)
// ============================================================================

use tracing::debug;

use crate::loader::Generation;
use crate::models::{CoinSummary, Currency};
use crate::query::{derive, CoinSort, Page, QueryParams};

/// Requête de fetch de la liste, étiquetée par sa génération
#[derive(Debug, Clone, PartialEq)]
pub struct CoinsRequest {
    pub generation: Generation,
    pub currency: Currency,
    pub order: CoinSort,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone)]
pub struct MarketsController {
    currency: Currency,
    per_fetch: u32,
    query: QueryParams<CoinSort>,
}

impl MarketsController {
    pub fn new(per_fetch: u32, page_size: usize) -> Self {
        Self {
            currency: Currency::default(),
            per_fetch: per_fetch.max(1),
            query: QueryParams::new(CoinSort::default(), page_size),
        }
    }

    /// Construit la requête de la liste pour la génération donnée
    ///
    /// Toujours la première page du serveur : la pagination est locale.
    pub fn request(&self, generation: Generation) -> CoinsRequest {
        CoinsRequest {
            generation,
            currency: self.currency,
            order: self.query.sort_key,
            page: 1,
            per_page: self.per_fetch,
        }
    }

    /// Passe à la devise suivante ; il faut relancer le fetch
    pub fn cycle_currency(&mut self) -> Currency {
        self.currency = self.currency.next();
        self.query.reset_page();
        debug!(currency = self.currency.code(), "Currency changed");
        self.currency
    }

    /// Passe au tri suivant ; il faut relancer le fetch
    pub fn cycle_sort(&mut self) -> CoinSort {
        let next = self.query.sort_key.next();
        self.query.set_sort_key(next);
        debug!(sort = next.key(), "Coin sort changed");
        next
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.query.set_search_text(text);
    }

    /// La liste source vient d'être remplacée
    pub fn source_replaced(&mut self) {
        self.query.reset_page();
    }

    pub fn next_page(&mut self, coins: &[CoinSummary]) {
        let page_count = self.visible(coins).page_count;
        self.query.next_page(page_count);
    }

    pub fn previous_page(&mut self) {
        self.query.previous_page();
    }

    /// Tranche visible de la liste
    pub fn visible<'a>(&self, coins: &'a [CoinSummary]) -> Page<'a, CoinSummary> {
        derive(coins, &self.query)
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn query(&self) -> &QueryParams<CoinSort> {
        &self.query
    }
}
