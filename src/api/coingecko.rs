// ============================================================================
// API Client : CoinGecko v3
// ============================================================================
// Récupère les données de marché depuis l'API publique CoinGecko
//
// Endpoints utilisés :
// - /coins/markets            : liste des cryptomonnaies
// - /coins/{id}               : fiche détaillée
// - /coins/{id}/market_chart  : historique des prix
// - /exchanges                : liste des plateformes
// - /exchanges/{id}           : fiche d'une plateforme
//
// Les erreurs sont classées en deux familles (voir error.rs) :
// - Network : pas de réponse, ou statut HTTP hors 2xx
// - Decode  : le JSON reçu n'a pas la forme attendue
// ============================================================================

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::MarketDataGateway;
use crate::config::Config;
use crate::error::FetchError;
use crate::models::{
    CoinDetail, CoinSummary, Currency, DayRange, Exchange, PricePoint, PriceSeries,
};
use crate::query::CoinSort;

// ============================================================================
// Structures pour parser les réponses JSON
// ============================================================================

/// Réponse de `/coins/{id}/market_chart`
///
/// Chaque entrée de `prices` est une paire [timestamp_ms, prix].
/// `market_caps` et `total_volumes` sont ignorés.
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(f64, f64)>,
}

impl MarketChartResponse {
    fn into_series(self) -> PriceSeries {
        let points = self
            .prices
            .into_iter()
            .map(|(ts, price)| PricePoint::new(ts as i64, price))
            .collect();
        PriceSeries::new(points)
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client HTTP pour CoinGecko
///
/// Le `reqwest::Client` est créé une seule fois et réutilisé (pool de
/// connexions partagé entre toutes les requêtes).
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    /// Crée un client à partir de la configuration
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client pointant vers une autre URL de base (serveur de test)
    pub fn with_base_url(base_url: &str) -> anyhow::Result<Self> {
        let config = Config {
            api_base_url: base_url.to_string(),
            ..Config::default()
        };
        Self::new(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}{path}?{query}` et désérialise le JSON en `T`
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, ?query, "Sending HTTP request to CoinGecko");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "CoinGecko request failed");
                FetchError::transport(e.to_string())
            })?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, url = %url, "CoinGecko returned error status");
            return Err(FetchError::status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| {
            warn!(url = %url, error = %e, "Unexpected JSON shape");
            FetchError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl MarketDataGateway for CoinGeckoClient {
    #[instrument(skip(self, currency, order), fields(currency = currency.code(), order = order.api_order()))]
    async fn list_coins(
        &self,
        currency: Currency,
        order: CoinSort,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CoinSummary>, FetchError> {
        let query = [
            ("vs_currency", currency.code().to_string()),
            ("order", order.api_order().to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
            ("sparkline", "false".to_string()),
        ];

        let coins: Vec<CoinSummary> = self.get_json("/coins/markets", &query).await?;
        info!(count = coins.len(), "Fetched coin list");
        Ok(coins)
    }

    #[instrument(skip(self))]
    async fn coin_detail(&self, id: &str) -> Result<CoinDetail, FetchError> {
        let query = [
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("market_data", "true".to_string()),
            ("community_data", "false".to_string()),
            ("developer_data", "false".to_string()),
            ("sparkline", "false".to_string()),
        ];

        let detail: CoinDetail = self.get_json(&format!("/coins/{}", id), &query).await?;
        info!(rank = ?detail.market_cap_rank, "Fetched coin detail");
        Ok(detail)
    }

    #[instrument(skip(self, currency, range), fields(currency = currency.code(), days = range.days()))]
    async fn price_history(
        &self,
        id: &str,
        currency: Currency,
        range: DayRange,
    ) -> Result<PriceSeries, FetchError> {
        let query = [
            ("vs_currency", currency.code().to_string()),
            ("days", range.days().to_string()),
        ];

        let response: MarketChartResponse = self
            .get_json(&format!("/coins/{}/market_chart", id), &query)
            .await?;

        let series = response.into_series();
        info!(points = series.len(), "Fetched price history");
        Ok(series)
    }

    #[instrument(skip(self))]
    async fn list_exchanges(&self) -> Result<Vec<Exchange>, FetchError> {
        let exchanges: Vec<Exchange> = self.get_json("/exchanges", &[]).await?;
        info!(count = exchanges.len(), "Fetched exchange list");
        Ok(exchanges)
    }

    #[instrument(skip(self))]
    async fn exchange_detail(&self, id: &str) -> Result<Exchange, FetchError> {
        let mut exchange: Exchange = self.get_json(&format!("/exchanges/{}", id), &[]).await?;

        // La fiche complète ne renvoie pas son identifiant
        if exchange.id.is_empty() {
            exchange.id = id.to_string();
        }

        info!(name = %exchange.name, "Fetched exchange detail");
        Ok(exchange)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
// Les appels HTTP sont testés contre un serveur simulé dans
// tests/coingecko_api_test.rs
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_removed() {
        let client = CoinGeckoClient::with_base_url("http://localhost:1234/api/v3/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234/api/v3");
    }

    #[test]
    fn test_market_chart_sorted_ascending() {
        let json = r#"{
            "prices": [[1700000200000, 3.0], [1700000000000, 1.0], [1700000100000, 2.0]],
            "market_caps": [],
            "total_volumes": []
        }"#;

        let response: MarketChartResponse = serde_json::from_str(json).unwrap();
        let series = response.into_series();
        let prices: Vec<f64> = series.points().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![1.0, 2.0, 3.0]);
    }
}
