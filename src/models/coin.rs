// ============================================================================
// Structures : CoinSummary, CoinDetail
// ============================================================================
// - CoinSummary : une ligne de `/coins/markets` (liste principale)
// - CoinDetail : la fiche complète de `/coins/{id}` (vue détail)
//
// Les deux sont des snapshots immuables : un nouveau fetch les remplace en
// entier, on ne fusionne jamais.
// ============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::de::null_as_default;
use super::Currency;
use crate::query::Searchable;

/// Une cryptomonnaie dans la liste des marchés
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSummary {
    /// Identifiant CoinGecko (ex: "bitcoin"), unique
    pub id: String,

    /// Symbole (ex: "btc")
    pub symbol: String,

    /// Nom affiché (ex: "Bitcoin")
    pub name: String,

    /// URL du logo
    #[serde(default)]
    pub image: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub current_price: f64,

    /// Variation sur 24h en pourcentage
    #[serde(default, deserialize_with = "null_as_default")]
    pub price_change_percentage_24h: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub market_cap: f64,
}

impl CoinSummary {
    /// Retourne true si la variation 24h est positive ou nulle
    pub fn is_positive(&self) -> bool {
        self.price_change_percentage_24h >= 0.0
    }

    /// Formatte la ligne pour l'affichage dans la liste
    ///
    /// Format : "BTC      Bitcoin              $67000.00  ▲ +2.11%"
    ///
    /// Le nom est tronqué à 20 caractères pour éviter le débordement
    pub fn display(&self, currency: Currency) -> String {
        let arrow = if self.is_positive() { "▲" } else { "▼" };

        let truncated_name = if self.name.chars().count() <= 20 {
            self.name.clone()
        } else {
            let truncated: String = self.name.chars().take(19).collect();
            format!("{}…", truncated)
        };

        format!(
            "{:<8} {:<20} {:>14}  {} {:+.2}%",
            self.symbol.to_uppercase(),
            truncated_name,
            currency.format(self.current_price),
            arrow,
            self.price_change_percentage_24h
        )
    }
}

impl Searchable for CoinSummary {
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Logos d'une cryptomonnaie en plusieurs tailles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinImage {
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    pub small: String,
    #[serde(default)]
    pub large: String,
}

/// Données de marché d'une fiche détaillée
///
/// Les montants sont indexés par code devise ("usd", "eur", ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_price: HashMap<String, f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub market_cap: HashMap<String, f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub total_volume: HashMap<String, f64>,

    /// Plus haut historique (All-Time High)
    #[serde(default, deserialize_with = "null_as_default")]
    pub ath: HashMap<String, f64>,

    #[serde(default)]
    pub circulating_supply: Option<f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub price_change_percentage_24h: f64,
}

/// Fiche détaillée d'une cryptomonnaie (`/coins/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub image: CoinImage,

    #[serde(default)]
    pub market_cap_rank: Option<u32>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub market_data: MarketData,
}

impl CoinDetail {
    pub fn price(&self, currency: Currency) -> Option<f64> {
        self.market_data.current_price.get(currency.code()).copied()
    }

    pub fn market_cap(&self, currency: Currency) -> Option<f64> {
        self.market_data.market_cap.get(currency.code()).copied()
    }

    pub fn total_volume(&self, currency: Currency) -> Option<f64> {
        self.market_data.total_volume.get(currency.code()).copied()
    }

    pub fn all_time_high(&self, currency: Currency) -> Option<f64> {
        self.market_data.ath.get(currency.code()).copied()
    }

    pub fn change_24h(&self) -> f64 {
        self.market_data.price_change_percentage_24h
    }
}
