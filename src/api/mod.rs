// ============================================================================
// Module : api
// ============================================================================
// Passerelle vers l'API de données de marché (lecture seule).
//
// Le trait MarketDataGateway isole le reste de l'application du transport
// HTTP : le worker et l'assembleur de détail travaillent sur le trait, les
// tests sur des implémentations simulées.
// ============================================================================

pub mod coingecko; // Client CoinGecko v3

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{CoinDetail, CoinSummary, Currency, DayRange, Exchange, PriceSeries};
use crate::query::CoinSort;

// Re-export du client principal
pub use coingecko::CoinGeckoClient;

/// Source de données de marché
///
/// Toutes les opérations peuvent échouer ; aucune ne réessaie.
///
/// CONCEPT RUST : async_trait
/// - une `async fn` de trait utilisée via `dyn MarketDataGateway` doit
///   retourner un type de taille connue
/// - la macro réécrit chaque méthode en `Pin<Box<dyn Future + Send>>`
/// - `Send + Sync` : le trait objet est partagé (Arc) entre tâches tokio
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Liste paginée des cryptomonnaies (`page` commence à 1)
    async fn list_coins(
        &self,
        currency: Currency,
        order: CoinSort,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CoinSummary>, FetchError>;

    /// Fiche détaillée d'une cryptomonnaie
    async fn coin_detail(&self, id: &str) -> Result<CoinDetail, FetchError>;

    /// Historique des prix sur la période demandée
    async fn price_history(
        &self,
        id: &str,
        currency: Currency,
        range: DayRange,
    ) -> Result<PriceSeries, FetchError>;

    /// Liste des plateformes d'échange (résumés)
    async fn list_exchanges(&self) -> Result<Vec<Exchange>, FetchError>;

    /// Fiche complète d'une plateforme
    async fn exchange_detail(&self, id: &str) -> Result<Exchange, FetchError>;
}
