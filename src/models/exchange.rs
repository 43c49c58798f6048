// ============================================================================
// Structure : Exchange
// ============================================================================
// Une plateforme d'échange. La même structure sert pour :
// - le résumé renvoyé par `/exchanges` (liste)
// - la fiche complète de `/exchanges/{id}` (réseaux sociaux, description)
//
// La fiche complète ne contient pas l'identifiant : le client le renseigne
// à partir de la requête.
// ============================================================================

use serde::{Deserialize, Serialize};

use super::de::null_as_default;
use crate::query::Searchable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,

    /// Volume échangé sur 24h, en BTC
    #[serde(default, deserialize_with = "null_as_default")]
    pub trade_volume_24h_btc: f64,

    /// Score de confiance CoinGecko (1-10)
    #[serde(default, deserialize_with = "null_as_default")]
    pub trust_score: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub trust_score_rank: u32,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub year_established: Option<u32>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub facebook_url: Option<String>,

    #[serde(default)]
    pub twitter_handle: Option<String>,

    #[serde(default)]
    pub reddit_url: Option<String>,
}

impl Exchange {
    /// Liens vers les réseaux sociaux renseignés (les chaînes vides sont ignorées)
    pub fn social_links(&self) -> Vec<(&'static str, String)> {
        let mut links = Vec::new();

        if let Some(url) = non_empty(&self.url) {
            links.push(("Website", url.to_string()));
        }
        if let Some(url) = non_empty(&self.facebook_url) {
            links.push(("Facebook", url.to_string()));
        }
        if let Some(handle) = non_empty(&self.twitter_handle) {
            links.push(("Twitter", format!("https://twitter.com/{}", handle)));
        }
        if let Some(url) = non_empty(&self.reddit_url) {
            links.push(("Reddit", url.to_string()));
        }

        links
    }
}

impl Searchable for Exchange {
    fn display_name(&self) -> &str {
        &self.name
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_entry_with_nulls() {
        let json = r#"{
            "id": "binance",
            "name": "Binance",
            "year_established": 2017,
            "country": "Cayman Islands",
            "description": "",
            "url": "https://www.binance.com/",
            "image": "https://example.com/binance.png",
            "has_trading_incentive": false,
            "trust_score": null,
            "trust_score_rank": 1,
            "trade_volume_24h_btc": 150000.5
        }"#;

        let exchange: Exchange = serde_json::from_str(json).unwrap();
        assert_eq!(exchange.id, "binance");
        assert_eq!(exchange.trust_score, 0);
        assert_eq!(exchange.year_established, Some(2017));
        assert_eq!(exchange.facebook_url, None);
    }

    #[test]
    fn test_social_links_skip_blank_values() {
        let exchange = Exchange {
            id: "kraken".to_string(),
            name: "Kraken".to_string(),
            url: Some("https://kraken.com".to_string()),
            facebook_url: Some("".to_string()),
            twitter_handle: Some("krakenfx".to_string()),
            ..Default::default()
        };

        let links = exchange.social_links();
        assert_eq!(
            links,
            vec![
                ("Website", "https://kraken.com".to_string()),
                ("Twitter", "https://twitter.com/krakenfx".to_string()),
            ]
        );
    }
}
