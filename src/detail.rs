// ============================================================================
// Vue détaillée d'une cryptomonnaie
// ============================================================================
// Assemble les données de la vue détail à partir de deux requêtes lancées
// en parallèle :
// - l'historique des prix (graphique)
// - la fiche de la cryptomonnaie (prix, capitalisation, volume, ATH)
//
// Si l'une des deux échoue, l'assemblage entier échoue : jamais de vue
// à moitié remplie.
//
// Le DetailController garde le triplet (id, devise, période). Chaque
// changement lance une nouvelle génération ; une réponse d'une génération
// antérieure est ignorée (voir loader.rs).
// ============================================================================

use tracing::{debug, info};

use crate::api::MarketDataGateway;
use crate::error::FetchError;
use crate::loader::{Generation, Loader};
use crate::models::{CoinDetail, Currency, DayRange, PriceSeries};

/// Tendance sur 24h, dérivée de la fiche (pas de l'historique)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Une variation nulle compte comme hausse
    pub fn from_change(change_pct: f64) -> Self {
        if change_pct >= 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, Trend::Up)
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
        }
    }
}

/// Données complètes de la vue détail
#[derive(Debug, Clone, PartialEq)]
pub struct DetailViewModel {
    pub coin: CoinDetail,
    pub series: PriceSeries,
    pub trend: Trend,
    pub currency: Currency,
    pub day_range: DayRange,
}

impl DetailViewModel {
    /// Points du graphique : (timestamp en secondes, prix)
    pub fn chart_points(&self) -> Vec<(f64, f64)> {
        self.series
            .points()
            .iter()
            .map(|p| (p.timestamp_ms as f64 / 1000.0, p.price))
            .collect()
    }

    pub fn price(&self) -> Option<f64> {
        self.coin.price(self.currency)
    }
}

/// Requête d'assemblage, étiquetée par sa génération
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRequest {
    pub generation: Generation,
    pub id: String,
    pub currency: Currency,
    pub day_range: DayRange,
}

/// Lance les deux requêtes en parallèle et assemble le résultat
///
/// CONCEPT RUST : tokio::try_join!
/// - les deux futures sont pollées dans la MÊME tâche, à tour de rôle :
///   les deux requêtes HTTP sont en vol en même temps
/// - dès que l'une retourne Err, try_join! retourne cette erreur et
///   abandonne (drop) l'autre future
/// - tout ou rien : jamais une vue avec le graphique sans la fiche
pub async fn assemble(
    gateway: &dyn MarketDataGateway,
    request: &DetailRequest,
) -> Result<DetailViewModel, FetchError> {
    debug!(
        coin = %request.id,
        currency = request.currency.code(),
        days = request.day_range.days(),
        "Assembling detail view"
    );

    let (series, coin) = tokio::try_join!(
        gateway.price_history(&request.id, request.currency, request.day_range),
        gateway.coin_detail(&request.id),
    )?;

    let trend = Trend::from_change(coin.change_24h());

    Ok(DetailViewModel {
        coin,
        series,
        trend,
        currency: request.currency,
        day_range: request.day_range,
    })
}

// ============================================================================
// Contrôleur de la vue détail
// ============================================================================

#[derive(Debug, Default)]
pub struct DetailController {
    id: Option<String>,
    currency: Currency,
    day_range: DayRange,
    view: Loader<DetailViewModel>,
}

impl DetailController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ouvre la vue détail de `id` avec la devise donnée
    ///
    /// Les paramètres sont propres à la vue : chaque ouverture repart de la
    /// période par défaut, quelle que soit celle de la crypto précédente.
    pub fn open(&mut self, id: &str, currency: Currency) -> DetailRequest {
        info!(coin = %id, "Opening detail view");
        self.id = Some(id.to_string());
        self.currency = currency;
        self.day_range = DayRange::default();
        self.request()
    }

    /// None si aucune vue n'est ouverte
    pub fn set_currency(&mut self, currency: Currency) -> Option<DetailRequest> {
        self.currency = currency;
        self.id.as_ref()?;
        Some(self.request())
    }

    pub fn set_day_range(&mut self, day_range: DayRange) -> Option<DetailRequest> {
        self.day_range = day_range;
        self.id.as_ref()?;
        Some(self.request())
    }

    /// Relance la requête courante (touche `r`)
    pub fn refresh(&mut self) -> Option<DetailRequest> {
        self.id.as_ref()?;
        Some(self.request())
    }

    /// Applique le résultat d'un assemblage ; false s'il est périmé
    pub fn apply(
        &mut self,
        generation: Generation,
        result: Result<DetailViewModel, FetchError>,
    ) -> bool {
        self.view.complete(generation, result)
    }

    /// Quitte la vue : les données et les requêtes en vol sont abandonnées
    pub fn close(&mut self) {
        debug!(coin = ?self.id, "Closing detail view");
        self.id = None;
        self.view.invalidate();
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn day_range(&self) -> DayRange {
        self.day_range
    }

    pub fn view(&self) -> &Loader<DetailViewModel> {
        &self.view
    }

    fn request(&mut self) -> DetailRequest {
        let generation = self.view.begin();
        DetailRequest {
            generation,
            id: self.id.clone().unwrap_or_default(),
            currency: self.currency,
            day_range: self.day_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Barrier;

    use super::*;
    use crate::models::{CoinImage, CoinSummary, Exchange, MarketData, PricePoint};
    use crate::query::CoinSort;

    fn detail(id: &str, change: f64) -> CoinDetail {
        CoinDetail {
            id: id.to_string(),
            symbol: id.to_string(),
            name: id.to_uppercase(),
            image: CoinImage::default(),
            market_cap_rank: Some(1),
            market_data: MarketData {
                current_price: HashMap::from([("usd".to_string(), 100.0)]),
                price_change_percentage_24h: change,
                ..MarketData::default()
            },
        }
    }

    /// Passerelle simulée pour la vue détail
    ///
    /// Avec une barrière, chaque requête attend que l'autre soit partie :
    /// le test ne se termine que si les deux sont en vol en même temps.
    struct FakeGateway {
        barrier: Option<Arc<Barrier>>,
        change: f64,
        fail_history: bool,
        fail_detail: bool,
    }

    impl FakeGateway {
        fn ok(change: f64) -> Self {
            Self {
                barrier: None,
                change,
                fail_history: false,
                fail_detail: false,
            }
        }

        async fn rendezvous(&self) {
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
        }
    }

    #[async_trait]
    impl MarketDataGateway for FakeGateway {
        async fn list_coins(
            &self,
            _currency: Currency,
            _order: CoinSort,
            _page: u32,
            _per_page: u32,
        ) -> Result<Vec<CoinSummary>, FetchError> {
            Ok(Vec::new())
        }

        async fn coin_detail(&self, id: &str) -> Result<CoinDetail, FetchError> {
            self.rendezvous().await;
            if self.fail_detail {
                return Err(FetchError::status(404));
            }
            Ok(detail(id, self.change))
        }

        async fn price_history(
            &self,
            _id: &str,
            _currency: Currency,
            _range: DayRange,
        ) -> Result<PriceSeries, FetchError> {
            self.rendezvous().await;
            if self.fail_history {
                return Err(FetchError::transport("connection reset"));
            }
            // Série en baisse : la tendance ne doit pas en dépendre
            Ok(PriceSeries::new(vec![
                PricePoint::new(1_700_000_000_000, 200.0),
                PricePoint::new(1_700_003_600_000, 100.0),
            ]))
        }

        async fn list_exchanges(&self) -> Result<Vec<Exchange>, FetchError> {
            Ok(Vec::new())
        }

        async fn exchange_detail(&self, _id: &str) -> Result<Exchange, FetchError> {
            Ok(Exchange::default())
        }
    }

    fn request(id: &str) -> DetailRequest {
        DetailRequest {
            generation: Generation::default(),
            id: id.to_string(),
            currency: Currency::Usd,
            day_range: DayRange::Month,
        }
    }

    #[test]
    fn test_trend_from_change() {
        assert_eq!(Trend::from_change(2.5), Trend::Up);
        assert_eq!(Trend::from_change(0.0), Trend::Up);
        assert_eq!(Trend::from_change(-0.01), Trend::Down);
    }

    #[tokio::test]
    async fn test_assemble_combines_both_fetches() {
        let gateway = FakeGateway::ok(3.2);
        let view = assemble(&gateway, &request("bitcoin")).await.unwrap();

        assert_eq!(view.coin.id, "bitcoin");
        assert_eq!(view.series.len(), 2);
        assert_eq!(view.trend, Trend::Up);
        assert_eq!(view.price(), Some(100.0));
        assert_eq!(view.chart_points()[0], (1_700_000_000.0, 200.0));
    }

    #[tokio::test]
    async fn test_requests_are_in_flight_together() {
        let gateway = FakeGateway {
            barrier: Some(Arc::new(Barrier::new(2))),
            ..FakeGateway::ok(-1.0)
        };

        // En séquentiel, la première requête attendrait la seconde à jamais
        let view = tokio::time::timeout(
            Duration::from_secs(5),
            assemble(&gateway, &request("ethereum")),
        )
        .await
        .expect("both requests should run concurrently")
        .unwrap();

        assert_eq!(view.trend, Trend::Down);
    }

    #[tokio::test]
    async fn test_either_failure_fails_assembly() {
        let gateway = FakeGateway {
            fail_history: true,
            ..FakeGateway::ok(1.0)
        };
        let err = assemble(&gateway, &request("bitcoin")).await.unwrap_err();
        assert_eq!(err, FetchError::transport("connection reset"));

        let gateway = FakeGateway {
            fail_detail: true,
            ..FakeGateway::ok(1.0)
        };
        let err = assemble(&gateway, &request("bitcoin")).await.unwrap_err();
        assert_eq!(err, FetchError::status(404));
    }

    #[tokio::test]
    async fn test_stale_coin_never_overwrites_newer_one() {
        let gateway = FakeGateway::ok(1.0);
        let mut controller = DetailController::new();

        let a = controller.open("coin-a", Currency::Usd);
        let b = controller.open("coin-b", Currency::Usd);

        // B répond d'abord, A ensuite
        let result_b = assemble(&gateway, &b).await;
        let result_a = assemble(&gateway, &a).await;
        assert!(controller.apply(b.generation, result_b));
        assert!(!controller.apply(a.generation, result_a));

        let view = controller.view().ready().unwrap();
        assert_eq!(view.coin.id, "coin-b");
    }

    #[test]
    fn test_parameter_change_issues_new_generation() {
        let mut controller = DetailController::new();
        assert!(controller.set_day_range(DayRange::Week).is_none());

        let first = controller.open("bitcoin", Currency::Usd);
        let second = controller.set_day_range(DayRange::Quarter).unwrap();
        let third = controller.set_currency(Currency::Eur).unwrap();

        assert!(second.generation > first.generation);
        assert!(third.generation > second.generation);
        assert_eq!(third.id, "bitcoin");
        assert_eq!(third.day_range, DayRange::Quarter);
        assert_eq!(third.currency, Currency::Eur);
    }

    #[test]
    fn test_open_resets_day_range() {
        let mut controller = DetailController::new();
        controller.open("bitcoin", Currency::Usd);
        controller.set_day_range(DayRange::Quarter).unwrap();
        controller.close();

        let request = controller.open("ethereum", Currency::Usd);
        assert_eq!(request.day_range, DayRange::Month);
        assert_eq!(controller.day_range(), DayRange::Month);
    }

    #[tokio::test]
    async fn test_close_discards_in_flight_result() {
        let gateway = FakeGateway::ok(1.0);
        let mut controller = DetailController::new();
        let req = controller.open("bitcoin", Currency::Gbp);
        controller.close();

        let result = assemble(&gateway, &req).await;
        assert!(!controller.apply(req.generation, result));
        assert!(controller.view().is_idle());
        assert_eq!(controller.id(), None);
    }
}
