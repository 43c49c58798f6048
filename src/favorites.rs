// ============================================================================
// Gestion des favoris
// ============================================================================
// Ensemble d'identifiants de cryptomonnaies marqués comme favoris.
//
// Règles :
// - toggle(id) ajoute un id absent, retire un id présent (jamais de doublon)
// - chaque toggle est écrit dans le magasin de préférences AVANT de devenir
//   l'état en mémoire ; si l'écriture échoue, rien ne change
// - au démarrage, une valeur absente ou illisible donne un ensemble vide
// - les favoris sont indépendants de la liste chargée (un id peut ne pas y
//   figurer)
// ============================================================================

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::CoinSummary;
use crate::store::{PreferenceStore, FAVORITES_KEY};

/// Ensemble des identifiants favoris
///
/// Sérialisé en liste JSON : `["bitcoin","ethereum"]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesSet(BTreeSet<String>);

impl FavoritesSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Copie de l'ensemble avec `id` basculé
    pub fn toggled(&self, id: &str) -> Self {
        let mut next = self.0.clone();
        if !next.remove(id) {
            next.insert(id.to_string());
        }
        Self(next)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl<S: Into<String>> FromIterator<S> for FavoritesSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Seul point d'écriture de l'ensemble des favoris
#[derive(Debug, Clone, Default)]
pub struct FavoritesManager {
    set: FavoritesSet,
}

impl FavoritesManager {
    /// Charge les favoris depuis le magasin
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let set = match store.get(FAVORITES_KEY) {
            Some(raw) => match FavoritesSet::from_json(&raw) {
                Ok(set) => {
                    info!(count = set.len(), "Favorites loaded");
                    set
                }
                Err(e) => {
                    warn!(error = %e, "Malformed favorites preference, starting empty");
                    FavoritesSet::new()
                }
            },
            None => {
                debug!("No favorites stored yet");
                FavoritesSet::new()
            }
        };

        Self { set }
    }

    pub fn set(&self) -> &FavoritesSet {
        &self.set
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.set.contains(id)
    }

    /// Bascule `id` et persiste le nouvel ensemble
    ///
    /// L'ensemble en mémoire n'est remplacé qu'une fois l'écriture réussie.
    ///
    /// CONCEPT : Écrire avant de valider
    /// - `toggled` construit un NOUVEL ensemble, `self.set` n'est pas touché
    /// - `?` sur `store.set` : en cas d'échec on sort avant l'affectation
    /// - la mémoire ne peut donc jamais contenir un état que le disque n'a pas
    ///
    /// CONCEPT RUST : `?` et From
    /// - `to_json()` retourne une `serde_json::Error`
    /// - `StoreError` implémente `From<serde_json::Error>` (#[from])
    /// - `?` fait la conversion tout seul
    pub fn toggle(
        &mut self,
        store: &mut dyn PreferenceStore,
        id: &str,
    ) -> Result<&FavoritesSet, StoreError> {
        let next = self.set.toggled(id);
        store.set(FAVORITES_KEY, next.to_json()?)?;

        info!(coin = %id, favorite = next.contains(id), count = next.len(), "Favorite toggled");
        self.set = next;
        Ok(&self.set)
    }

    /// Cryptomonnaies chargées qui sont en favoris, dans l'ordre de la liste
    pub fn filter_coins<'a>(&self, coins: &'a [CoinSummary]) -> Vec<&'a CoinSummary> {
        coins.iter().filter(|c| self.set.contains(&c.id)).collect()
    }
}
