//! CoinGecko client tests against a wiremock server.
//!
//! These tests check the query strings sent to each endpoint and how HTTP
//! failures and unexpected bodies are classified.

use lazycoin::api::{CoinGeckoClient, MarketDataGateway};
use lazycoin::detail::{assemble, DetailRequest, Trend};
use lazycoin::error::FetchError;
use lazycoin::loader::Loader;
use lazycoin::models::{Currency, DayRange};
use lazycoin::query::CoinSort;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> CoinGeckoClient {
    CoinGeckoClient::with_base_url(&server.uri()).unwrap()
}

fn bitcoin_detail() -> serde_json::Value {
    json!({
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin",
        "image": {
            "thumb": "https://example.com/thumb.png",
            "small": "https://example.com/small.png",
            "large": "https://example.com/large.png"
        },
        "market_cap_rank": 1,
        "market_data": {
            "current_price": { "usd": 67000.0, "eur": 61000.0 },
            "market_cap": { "usd": 1.3e12 },
            "total_volume": { "usd": 2.5e10 },
            "ath": { "usd": 73000.0 },
            "circulating_supply": 19700000.0,
            "price_change_percentage_24h": -2.4
        }
    })
}

#[tokio::test]
async fn test_list_coins_sends_market_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .and(query_param("vs_currency", "eur"))
        .and(query_param("order", "market_cap_desc"))
        .and(query_param("per_page", "100"))
        .and(query_param("page", "1"))
        .and(query_param("sparkline", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "bitcoin",
                "symbol": "btc",
                "name": "Bitcoin",
                "image": "https://example.com/btc.png",
                "current_price": 61000.0,
                "price_change_percentage_24h": 1.5,
                "market_cap": 1.2e12
            },
            {
                "id": "new-coin",
                "symbol": "new",
                "name": "New Coin",
                "image": "https://example.com/new.png",
                "current_price": 0.01,
                "price_change_percentage_24h": null,
                "market_cap": null
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    // Le tri par prix demande l'ordre par capitalisation au serveur
    let coins = client(&server)
        .list_coins(Currency::Eur, CoinSort::PriceAsc, 1, 100)
        .await
        .unwrap();

    assert_eq!(coins.len(), 2);
    assert_eq!(coins[0].name, "Bitcoin");
    assert_eq!(coins[1].market_cap, 0.0);
    assert_eq!(coins[1].price_change_percentage_24h, 0.0);
}

#[tokio::test]
async fn test_server_error_is_network_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server)
        .list_coins(Currency::Usd, CoinSort::MarketCapDesc, 1, 100)
        .await
        .unwrap_err();

    assert_eq!(err, FetchError::status(500));
    assert!(!err.is_decode());
}

#[tokio::test]
async fn test_unexpected_body_is_decode_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/exchanges"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "rate limited" })))
        .mount(&server)
        .await;

    let err = client(&server).list_exchanges().await.unwrap_err();
    assert!(err.is_decode(), "expected a decode failure, got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_server_is_network_failure() {
    // Port fermé : aucune réponse
    let client = CoinGeckoClient::with_base_url("http://127.0.0.1:1").unwrap();
    let err = client.list_exchanges().await.unwrap_err();

    assert!(matches!(err, FetchError::Network { status: None, .. }));
}

#[tokio::test]
async fn test_exchange_detail_fills_missing_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/exchanges/kraken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Kraken",
            "year_established": 2011,
            "country": "United States",
            "description": "",
            "url": "https://www.kraken.com",
            "image": "https://example.com/kraken.png",
            "facebook_url": "https://www.facebook.com/KrakenFX",
            "reddit_url": "",
            "twitter_handle": "krakenfx",
            "trust_score": 10,
            "trust_score_rank": 2,
            "trade_volume_24h_btc": 12345.6
        })))
        .mount(&server)
        .await;

    let exchange = client(&server).exchange_detail("kraken").await.unwrap();

    assert_eq!(exchange.id, "kraken");
    assert_eq!(exchange.year_established, Some(2011));
    // L'URL Reddit vide est ignorée
    let names: Vec<&str> = exchange.social_links().iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["Website", "Facebook", "Twitter"]);
}

#[tokio::test]
async fn test_detail_assembly_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/coins/bitcoin"))
        .and(query_param("market_data", "true"))
        .and(query_param("tickers", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bitcoin_detail()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/coins/bitcoin/market_chart"))
        .and(query_param("vs_currency", "usd"))
        .and(query_param("days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "prices": [[1700000000000.0, 60000.0], [1700086400000.0, 67000.0]],
            "market_caps": [],
            "total_volumes": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = client(&server);
    let mut loader = Loader::new();
    let request = DetailRequest {
        generation: loader.begin(),
        id: "bitcoin".to_string(),
        currency: Currency::Usd,
        day_range: DayRange::Week,
    };

    let result = assemble(&gateway, &request).await;
    assert!(loader.complete(request.generation, result));

    let view = loader.ready().unwrap();
    assert_eq!(view.series.len(), 2);
    assert_eq!(view.price(), Some(67000.0));
    // La série monte mais la variation 24h de la fiche est négative
    assert_eq!(view.trend, Trend::Down);
}

#[tokio::test]
async fn test_detail_assembly_fails_when_chart_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/coins/bitcoin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bitcoin_detail()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/coins/bitcoin/market_chart"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let request = DetailRequest {
        generation: Loader::<()>::new().begin(),
        id: "bitcoin".to_string(),
        currency: Currency::Usd,
        day_range: DayRange::Month,
    };

    let err = assemble(&client(&server), &request).await.unwrap_err();
    assert_eq!(err, FetchError::status(429));
}
