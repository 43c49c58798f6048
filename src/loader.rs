// ============================================================================
// Chargement asynchrone étiqueté par génération
// ============================================================================
// Problème : les réponses réseau n'arrivent pas forcément dans l'ordre où
// les requêtes sont parties. Si l'utilisateur passe de A à B, la réponse de
// A peut arriver après celle de B et écraser l'affichage.
//
// Solution : chaque requête reçoit un numéro de génération croissant.
// Seule la réponse portant la génération courante est acceptée ; les autres
// sont ignorées (annulation logique).
// ============================================================================

use tracing::debug;

use crate::error::FetchError;

/// Numéro de génération d'une requête (strictement croissant par Loader)
///
/// CONCEPT RUST : Newtype pattern
/// - `Generation(u64)` n'est pas un `u64` : impossible de le confondre avec
///   un index ou un timestamp, le compilateur refuse le mélange
/// - `Copy` : on le passe par valeur, aussi léger qu'un entier
/// - `Ord` dérivé : on peut comparer deux générations (`a < b`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

/// État de chargement d'une donnée
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    /// Rien n'a été demandé (ou la vue a été quittée)
    Idle,

    /// Une requête de la génération courante est en cours
    Loading,

    Ready(T),

    /// La requête courante a échoué ; pas de données partielles
    Failed(FetchError),
}

/// Conteneur d'une donnée chargée en arrière-plan
#[derive(Debug, Clone)]
pub struct Loader<T> {
    current: Generation,
    state: LoadState<T>,
}

impl<T> Loader<T> {
    pub fn new() -> Self {
        Self {
            current: Generation::default(),
            state: LoadState::Idle,
        }
    }

    /// Démarre une nouvelle requête
    ///
    /// Les données précédentes sont abandonnées (pas d'affichage périmé) et
    /// toute requête encore en vol devient obsolète.
    pub fn begin(&mut self) -> Generation {
        self.current = self.current.next();
        self.state = LoadState::Loading;
        self.current
    }

    /// Applique le résultat d'une requête
    ///
    /// Retourne false si la génération n'est plus la courante (réponse
    /// ignorée).
    ///
    /// CONCEPT : Garde de génération
    /// - `begin()` et `invalidate()` incrémentent la génération courante
    /// - une réponse ne porte que la génération de SA requête
    /// - égalité stricte : toute réponse plus ancienne est rejetée, même si
    ///   elle arrive en dernier
    /// - rien n'est annulé côté réseau, la réponse est juste ignorée
    pub fn complete(&mut self, generation: Generation, result: Result<T, FetchError>) -> bool {
        if generation != self.current {
            debug!(
                stale = generation.value(),
                current = self.current.value(),
                "Discarding stale response"
            );
            return false;
        }

        // Une génération courante déjà résolue ne se résout pas deux fois
        if !matches!(self.state, LoadState::Loading) {
            debug!(generation = generation.value(), "Ignoring duplicate response");
            return false;
        }

        self.state = match result {
            Ok(value) => LoadState::Ready(value),
            Err(e) => LoadState::Failed(e),
        };
        true
    }

    /// Abandonne la donnée et toute requête en vol (sortie de la vue)
    pub fn invalidate(&mut self) {
        self.current = self.current.next();
        self.state = LoadState::Idle;
    }

    pub fn generation(&self) -> Generation {
        self.current
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn ready(&self) -> Option<&T> {
        match &self.state {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.state {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, LoadState::Idle)
    }
}

impl<T> Default for Loader<T> {
    fn default() -> Self {
        Self::new()
    }
}
