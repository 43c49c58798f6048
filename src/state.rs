// ============================================================================
// Conteneur d'état partagé
// ============================================================================
// État global partagé entre les écrans :
// - la liste des cryptomonnaies (et son état de chargement)
// - l'ensemble des favoris
// - le mode sombre
//
// Contrat de lecture / écriture :
// - seul le fetch de la liste écrit la liste (begin_coins_fetch / apply_coins)
// - seul le FavoritesManager écrit les favoris (toggle_favorite)
// - les lecteurs voient toujours la dernière valeur validée
// - chaque écriture incrémente un compteur de révision diffusé par un canal
//   `watch` : un abonné sait qu'il doit recalculer sa vue (App s'abonne et
//   ne redessine que s'il y a du nouveau, voir App::needs_redraw)
//
// Tout est possédé par le thread UI : pas de verrou.
// ============================================================================

use tokio::sync::watch;
use tracing::info;

use crate::error::{FetchError, StoreError};
use crate::favorites::FavoritesManager;
use crate::loader::{Generation, Loader};
use crate::models::CoinSummary;
use crate::store::{load_dark_mode, save_dark_mode, PreferenceStore};

/// Compteurs de modifications, un par donnée partagée
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Revision {
    pub coins: u64,
    pub favorites: u64,
    pub dark_mode: u64,
}

pub struct AppState {
    store: Box<dyn PreferenceStore>,
    coins: Loader<Vec<CoinSummary>>,
    favorites: FavoritesManager,
    dark_mode: bool,
    revision: watch::Sender<Revision>,
}

impl AppState {
    /// Initialise l'état depuis le magasin de préférences
    pub fn new(store: Box<dyn PreferenceStore>) -> Self {
        let favorites = FavoritesManager::load(store.as_ref());
        let dark_mode = load_dark_mode(store.as_ref());
        let (revision, _) = watch::channel(Revision::default());

        info!(favorites = favorites.set().len(), dark_mode, "Application state initialized");

        Self {
            store,
            coins: Loader::new(),
            favorites,
            dark_mode,
            revision,
        }
    }

    /// S'abonne aux modifications de l'état
    pub fn subscribe(&self) -> watch::Receiver<Revision> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> Revision {
        *self.revision.borrow()
    }

    // ========================================================================
    // Liste des cryptomonnaies
    // ========================================================================

    /// Liste courante (vide tant qu'aucun fetch n'a abouti)
    pub fn coins(&self) -> &[CoinSummary] {
        self.coins.ready().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn coins_loader(&self) -> &Loader<Vec<CoinSummary>> {
        &self.coins
    }

    /// Démarre un nouveau fetch de la liste (l'ancienne liste est abandonnée)
    pub fn begin_coins_fetch(&mut self) -> Generation {
        let generation = self.coins.begin();
        self.revision.send_modify(|r| r.coins += 1);
        generation
    }

    /// Applique le résultat d'un fetch ; false si la réponse est périmée
    pub fn apply_coins(
        &mut self,
        generation: Generation,
        result: Result<Vec<CoinSummary>, FetchError>,
    ) -> bool {
        let accepted = self.coins.complete(generation, result);
        if accepted {
            self.revision.send_modify(|r| r.coins += 1);
        }
        accepted
    }

    // ========================================================================
    // Favoris
    // ========================================================================

    pub fn favorites(&self) -> &FavoritesManager {
        &self.favorites
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.is_favorite(id)
    }

    /// Bascule un favori ; retourne true si `id` est désormais en favori
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool, StoreError> {
        let set = self.favorites.toggle(self.store.as_mut(), id)?;
        let now_favorite = set.contains(id);
        self.revision.send_modify(|r| r.favorites += 1);
        Ok(now_favorite)
    }

    /// Cryptomonnaies chargées qui sont en favoris
    pub fn favorite_coins(&self) -> Vec<&CoinSummary> {
        self.favorites.filter_coins(self.coins())
    }

    // ========================================================================
    // Mode sombre
    // ========================================================================

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Bascule le mode sombre ; la valeur n'est changée qu'après écriture
    pub fn toggle_dark_mode(&mut self) -> Result<bool, StoreError> {
        let next = !self.dark_mode;
        save_dark_mode(self.store.as_mut(), next)?;
        self.dark_mode = next;
        self.revision.send_modify(|r| r.dark_mode += 1);
        info!(dark_mode = next, "Theme changed");
        Ok(next)
    }

    pub fn store(&self) -> &dyn PreferenceStore {
        self.store.as_ref()
    }
}
