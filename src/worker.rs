// ============================================================================
// Worker d'arrière-plan
// ============================================================================
// Thread séparé qui exécute les appels réseau sans bloquer l'UI :
// - reçoit des Command via un channel (command_rx)
// - lance chaque commande dans sa propre tâche tokio (les requêtes tournent
//   en parallèle et peuvent se terminer dans le désordre)
// - renvoie des Outcome, étiquetés par leur génération, via un autre
//   channel (outcome_tx)
//
// Le worker ne touche jamais à l'état de l'application : c'est le thread UI
// qui décide d'accepter ou d'ignorer chaque résultat.
// ============================================================================

use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::api::MarketDataGateway;
use crate::detail::{assemble, DetailRequest, DetailViewModel};
use crate::error::FetchError;
use crate::exchanges::ExchangeDetailRequest;
use crate::loader::Generation;
use crate::markets::CoinsRequest;
use crate::models::{CoinSummary, Exchange};

/// Commandes envoyées au worker
#[derive(Debug, Clone)]
pub enum Command {
    FetchCoins(CoinsRequest),
    AssembleDetail(DetailRequest),
    FetchExchanges { generation: Generation },
    FetchExchangeDetail(ExchangeDetailRequest),
}

/// Résultats renvoyés par le worker
#[derive(Debug)]
pub enum Outcome {
    Coins {
        generation: Generation,
        result: Result<Vec<CoinSummary>, FetchError>,
    },
    Detail {
        generation: Generation,
        result: Result<DetailViewModel, FetchError>,
    },
    Exchanges {
        generation: Generation,
        result: Result<Vec<Exchange>, FetchError>,
    },
    ExchangeDetail {
        generation: Generation,
        result: Result<Exchange, FetchError>,
    },
}

/// Démarre le worker dans un thread dédié
///
/// Le thread s'arrête quand tous les `Sender<Command>` sont fermés.
pub fn spawn_worker(
    gateway: Arc<dyn MarketDataGateway>,
    command_rx: mpsc::Receiver<Command>,
    outcome_tx: mpsc::Sender<Outcome>,
) -> Result<JoinHandle<()>> {
    // CONCEPT RUST : runtime tokio explicite
    // - main() reste synchrone (boucle ratatui), pas de #[tokio::main]
    // - le runtime est construit ici puis déplacé (move) dans le thread
    // - Builder + `?` au lieu de Runtime::new().unwrap() : l'échec remonte
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name("lazycoin-worker")
        .build()
        .context("Échec de la création du runtime tokio")?;

    let handle = std::thread::Builder::new()
        .name("lazycoin-dispatch".to_string())
        .spawn(move || {
            while let Ok(command) = command_rx.recv() {
                debug!(?command, "Worker received command");
                let gateway = Arc::clone(&gateway);
                let outcome_tx = outcome_tx.clone();

                // CONCEPT : une tâche par commande
                // - `spawn` rend la main tout de suite, la boucle lit la
                //   commande suivante sans attendre la réponse
                // - `async move` : la tâche possède ses clones de `gateway`
                //   (Arc) et de `outcome_tx`, d'où le 'static exigé par spawn
                // - l'ordre d'arrivée des Outcome n'est donc pas garanti :
                //   c'est la génération qui trie côté UI
                runtime.spawn(async move {
                    let outcome = execute(gateway.as_ref(), command).await;
                    if outcome_tx.send(outcome).is_err() {
                        debug!("UI gone, dropping outcome");
                    }
                });
            }

            info!("Worker thread exiting (channel closed)");
            // Le runtime est détruit ici : les tâches en vol sont abandonnées
        })
        .context("Échec du lancement du thread worker")?;

    Ok(handle)
}

/// Exécute une commande contre la passerelle
pub async fn execute(gateway: &dyn MarketDataGateway, command: Command) -> Outcome {
    match command {
        Command::FetchCoins(request) => {
            let result = gateway
                .list_coins(request.currency, request.order, request.page, request.per_page)
                .await;
            log_failure("coins", &result);
            Outcome::Coins {
                generation: request.generation,
                result,
            }
        }

        Command::AssembleDetail(request) => {
            let result = assemble(gateway, &request).await;
            log_failure("detail", &result);
            Outcome::Detail {
                generation: request.generation,
                result,
            }
        }

        Command::FetchExchanges { generation } => {
            let result = gateway.list_exchanges().await;
            log_failure("exchanges", &result);
            Outcome::Exchanges { generation, result }
        }

        Command::FetchExchangeDetail(request) => {
            let result = gateway.exchange_detail(&request.id).await;
            log_failure("exchange_detail", &result);
            Outcome::ExchangeDetail {
                generation: request.generation,
                result,
            }
        }
    }
}

fn log_failure<T>(what: &str, result: &Result<T, FetchError>) {
    if let Err(e) = result {
        error!(request = what, error = %e, "Background fetch failed");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::models::{CoinDetail, Currency, DayRange, PriceSeries};
    use crate::query::CoinSort;

    /// Passerelle simulée : la requête "slow" répond après les autres
    struct FakeGateway;

    #[async_trait]
    impl MarketDataGateway for FakeGateway {
        async fn list_coins(
            &self,
            currency: Currency,
            _order: CoinSort,
            _page: u32,
            per_page: u32,
        ) -> Result<Vec<CoinSummary>, FetchError> {
            if currency == Currency::Usd {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Ok((0..per_page)
                .map(|i| CoinSummary {
                    id: format!("{}-{}", currency.code(), i),
                    symbol: String::new(),
                    name: String::new(),
                    image: String::new(),
                    current_price: 1.0,
                    price_change_percentage_24h: 0.0,
                    market_cap: 1.0,
                })
                .collect())
        }

        async fn coin_detail(&self, _id: &str) -> Result<CoinDetail, FetchError> {
            Err(FetchError::status(404))
        }

        async fn price_history(
            &self,
            _id: &str,
            _currency: Currency,
            _range: DayRange,
        ) -> Result<PriceSeries, FetchError> {
            Ok(PriceSeries::default())
        }

        async fn list_exchanges(&self) -> Result<Vec<Exchange>, FetchError> {
            Err(FetchError::Decode("expected array".to_string()))
        }

        async fn exchange_detail(&self, id: &str) -> Result<Exchange, FetchError> {
            Ok(Exchange {
                id: id.to_string(),
                ..Exchange::default()
            })
        }
    }

    fn coins_request(generation: Generation, currency: Currency) -> Command {
        Command::FetchCoins(CoinsRequest {
            generation,
            currency,
            order: CoinSort::default(),
            page: 1,
            per_page: 3,
        })
    }

    #[tokio::test]
    async fn test_execute_tags_outcome_with_generation() {
        let generation = crate::loader::Loader::<()>::new().begin();
        let outcome = execute(
            &FakeGateway,
            Command::FetchExchangeDetail(ExchangeDetailRequest {
                generation,
                id: "kraken".to_string(),
            }),
        )
        .await;

        match outcome {
            Outcome::ExchangeDetail { generation: g, result } => {
                assert_eq!(g, generation);
                assert_eq!(result.unwrap().id, "kraken");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_reports_failures() {
        let outcome = execute(&FakeGateway, Command::FetchExchanges {
            generation: Generation::default(),
        })
        .await;

        match outcome {
            Outcome::Exchanges { result, .. } => assert!(result.unwrap_err().is_decode()),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_commands_run_concurrently() {
        let (command_tx, command_rx) = mpsc::channel();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let handle = spawn_worker(Arc::new(FakeGateway), command_rx, outcome_tx).unwrap();

        let mut loader = crate::loader::Loader::<Vec<CoinSummary>>::new();
        let usd = loader.begin();
        let eur = loader.begin();
        command_tx.send(coins_request(usd, Currency::Usd)).unwrap();
        command_tx.send(coins_request(eur, Currency::Eur)).unwrap();

        // La requête EUR, envoyée en second, revient en premier
        let mut order = Vec::new();
        for _ in 0..2 {
            match outcome_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                Outcome::Coins { generation, result } => {
                    order.push(generation);
                    loader.complete(generation, result);
                }
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
        assert_eq!(order, vec![eur, usd]);
        assert_eq!(loader.ready().unwrap()[0].id, "eur-0");

        drop(command_tx);
        handle.join().unwrap();
    }
}
