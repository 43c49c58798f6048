// Helpers de désérialisation partagés par les modèles

use serde::{Deserialize, Deserializer};

/// Désérialise `null` (ou une valeur absente avec `#[serde(default)]`) en
/// valeur par défaut du type
///
/// CoinGecko renvoie régulièrement `null` pour les champs numériques des
/// petites capitalisations (market_cap, variation 24h, trust_score...).
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
