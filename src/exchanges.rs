// ============================================================================
// Contrôleur de la liste des plateformes d'échange
// ============================================================================
// Deux allers-retours :
// 1. /exchanges        : la liste (recherche, tri, pagination locales)
// 2. /exchanges/{id}   : la fiche complète de la plateforme sélectionnée
//
// Une seule fiche affichée à la fois. Une nouvelle sélection remplace la
// précédente ; la réponse d'une sélection antérieure est ignorée. Pas de
// cache : resélectionner une plateforme relance la requête.
// ============================================================================

use tracing::{debug, info};

use crate::error::FetchError;
use crate::loader::{Generation, Loader};
use crate::models::Exchange;
use crate::query::{derive, ExchangeSort, Page, QueryParams};

/// Requête de la fiche d'une plateforme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeDetailRequest {
    pub generation: Generation,
    pub id: String,
}

#[derive(Debug)]
pub struct ExchangeListController {
    list: Loader<Vec<Exchange>>,
    query: QueryParams<ExchangeSort>,
    detail: Loader<Exchange>,
    selected_id: Option<String>,
}

impl ExchangeListController {
    pub fn new(page_size: usize) -> Self {
        Self {
            list: Loader::new(),
            query: QueryParams::new(ExchangeSort::default(), page_size),
            detail: Loader::new(),
            selected_id: None,
        }
    }

    // ========================================================================
    // Liste
    // ========================================================================

    /// Démarre le fetch de la liste
    pub fn refresh(&mut self) -> Generation {
        self.list.begin()
    }

    /// Applique la liste reçue ; la pagination repart de la page 1
    pub fn apply_list(
        &mut self,
        generation: Generation,
        result: Result<Vec<Exchange>, FetchError>,
    ) -> bool {
        let accepted = self.list.complete(generation, result);
        if accepted {
            self.query.reset_page();
            if let Some(list) = self.list.ready() {
                info!(count = list.len(), "Exchange list updated");
            }
        }
        accepted
    }

    /// Liste complète (vide tant qu'elle n'est pas chargée)
    pub fn exchanges(&self) -> &[Exchange] {
        self.list.ready().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn list(&self) -> &Loader<Vec<Exchange>> {
        &self.list
    }

    /// Tranche visible de la liste
    pub fn visible(&self) -> Page<'_, Exchange> {
        derive(self.exchanges(), &self.query)
    }

    pub fn query(&self) -> &QueryParams<ExchangeSort> {
        &self.query
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.query.set_search_text(text);
    }

    pub fn cycle_sort(&mut self) -> ExchangeSort {
        let next = self.query.sort_key.next();
        self.query.set_sort_key(next);
        debug!(sort = next.key(), "Exchange sort changed");
        next
    }

    pub fn next_page(&mut self) {
        let page_count = self.visible().page_count;
        self.query.next_page(page_count);
    }

    pub fn previous_page(&mut self) {
        self.query.previous_page();
    }

    // ========================================================================
    // Fiche détaillée
    // ========================================================================

    /// Sélectionne une plateforme ; toute sélection précédente devient obsolète
    pub fn select(&mut self, id: &str) -> ExchangeDetailRequest {
        info!(exchange = %id, "Exchange selected");
        self.selected_id = Some(id.to_string());
        ExchangeDetailRequest {
            generation: self.detail.begin(),
            id: id.to_string(),
        }
    }

    pub fn apply_detail(
        &mut self,
        generation: Generation,
        result: Result<Exchange, FetchError>,
    ) -> bool {
        self.detail.complete(generation, result)
    }

    /// Ferme la fiche (et abandonne la requête en vol)
    pub fn clear_selection(&mut self) {
        self.selected_id = None;
        self.detail.invalidate();
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn detail(&self) -> &Loader<Exchange> {
        &self.detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(id: &str, name: &str, volume: f64, trust: u32) -> Exchange {
        Exchange {
            id: id.to_string(),
            name: name.to_string(),
            trade_volume_24h_btc: volume,
            trust_score: trust,
            ..Exchange::default()
        }
    }

    fn loaded(exchanges: Vec<Exchange>) -> ExchangeListController {
        let mut controller = ExchangeListController::new(9);
        let g = controller.refresh();
        assert!(controller.apply_list(g, Ok(exchanges)));
        controller
    }

    #[test]
    fn test_default_sort_is_volume_desc() {
        let controller = loaded(vec![
            exchange("small", "Small", 10.0, 9),
            exchange("big", "Big", 500.0, 7),
            exchange("mid", "Mid", 100.0, 10),
        ]);

        let ids: Vec<&str> = controller.visible().items.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["big", "mid", "small"]);
    }

    #[test]
    fn test_trust_desc_non_increasing() {
        let mut controller = loaded(vec![
            exchange("a", "A", 1.0, 7),
            exchange("b", "B", 2.0, 10),
            exchange("c", "C", 3.0, 8),
        ]);
        // volume_desc → volume_asc → trust_desc
        controller.cycle_sort();
        assert_eq!(controller.cycle_sort(), ExchangeSort::TrustDesc);

        let scores: Vec<u32> = controller.visible().items.iter().map(|e| e.trust_score).collect();
        assert_eq!(scores, vec![10, 8, 7]);
    }

    #[test]
    fn test_new_list_returns_to_first_page() {
        let list: Vec<Exchange> = (0..20)
            .map(|i| exchange(&format!("ex{}", i), &format!("Ex {}", i), i as f64, 5))
            .collect();
        let mut controller = loaded(list.clone());
        controller.next_page();
        assert_eq!(controller.query().page, 2);

        let g = controller.refresh();
        controller.apply_list(g, Ok(list));
        assert_eq!(controller.query().page, 1);
        assert_eq!(controller.visible().page_count, 3);
    }

    #[test]
    fn test_latest_selection_wins() {
        let mut controller = loaded(Vec::new());
        let first = controller.select("binance");
        let second = controller.select("kraken");

        assert!(controller.apply_detail(second.generation, Ok(exchange("kraken", "Kraken", 1.0, 10))));
        assert!(!controller.apply_detail(first.generation, Ok(exchange("binance", "Binance", 2.0, 10))));

        assert_eq!(controller.selected_id(), Some("kraken"));
        assert_eq!(controller.detail().ready().map(|e| e.id.as_str()), Some("kraken"));
    }

    #[test]
    fn test_reselect_fetches_again() {
        let mut controller = loaded(Vec::new());
        let first = controller.select("kraken");
        controller.apply_detail(first.generation, Ok(exchange("kraken", "Kraken", 1.0, 10)));

        let again = controller.select("kraken");
        assert!(again.generation > first.generation);
        assert!(controller.detail().is_loading());
    }

    #[test]
    fn test_list_failure_shows_nothing() {
        let mut controller = ExchangeListController::new(9);
        let g = controller.refresh();
        controller.apply_list(g, Err(FetchError::status(429)));

        assert!(controller.exchanges().is_empty());
        assert_eq!(controller.list().error(), Some(&FetchError::status(429)));
        assert_eq!(controller.visible().page_count, 1);
    }

    #[test]
    fn test_clear_selection_drops_in_flight_detail() {
        let mut controller = loaded(Vec::new());
        let request = controller.select("kraken");
        controller.clear_selection();

        assert!(!controller.apply_detail(request.generation, Ok(Exchange::default())));
        assert!(controller.detail().is_idle());
        assert_eq!(controller.selected_id(), None);
    }
}
