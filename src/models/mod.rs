// ============================================================================
// Module : models
// ============================================================================
// Structures de données renvoyées par l'API de marché (CoinGecko) et
// paramètres de requête partagés (devise, période)
// ============================================================================

pub mod coin;         // Résumé et détail d'une cryptomonnaie
pub mod exchange;     // Plateformes d'échange
pub mod params;       // Devise et période du graphique
pub mod price_series; // Historique des prix

mod de;               // Helpers serde internes

// Re-export des structures principales pour simplifier les imports
pub use coin::{CoinDetail, CoinImage, CoinSummary, MarketData};
pub use exchange::Exchange;
pub use params::{Currency, DayRange};
pub use price_series::{PricePoint, PriceSeries};
