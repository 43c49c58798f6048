// ============================================================================
// Magasin de préférences
// ============================================================================
// Stockage clé → valeur synchrone (équivalent d'un localStorage) :
// - get(key) -> Option<String>
// - set(key, value) -> Result<(), StoreError>
//
// Deux clés sont utilisées :
// - "favorites" : liste JSON d'identifiants
// - "darkMode"  : booléen JSON
//
// Une valeur absente ou illisible n'est jamais une erreur pour l'appelant :
// on log un warning et on retombe sur la valeur par défaut.
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreError;

/// Clé des favoris
pub const FAVORITES_KEY: &str = "favorites";

/// Clé du mode sombre
pub const DARK_MODE_KEY: &str = "darkMode";

/// Nom du fichier de préférences dans le répertoire de données
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Stockage clé → valeur synchrone
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Écrit la valeur ; quand la fonction retourne Ok, la valeur est persistée
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

// ============================================================================
// FileStore : fichier JSON sur disque
// ============================================================================

/// Magasin persistant : un objet JSON { clé: valeur } dans un fichier
///
/// Le fichier est lu une fois à l'ouverture puis réécrit en entier à chaque
/// `set` (fichier temporaire + rename).
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Ouvre (ou prépare) le fichier de préférences
    ///
    /// Un fichier absent donne un magasin vide. Un fichier illisible aussi :
    /// il sera écrasé à la prochaine écriture.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => {
                    debug!(path = %path.display(), keys = entries.len(), "Loaded preferences");
                    entries
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Malformed preferences file, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No preferences file yet");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable preferences file, starting empty");
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    /// Ouvre `preferences.json` dans le répertoire donné
    pub fn in_dir(dir: &Path) -> Self {
        Self::open(dir.join(PREFERENCES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// CONCEPT : Écriture atomique
    /// - on écrit d'abord un fichier temporaire complet
    /// - `rename` dans le même répertoire remplace le fichier d'un coup
    /// - un crash pendant l'écriture laisse l'ancien fichier intact
    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value);

        // Écrit d'abord le disque, puis la copie en mémoire
        self.flush(&next)?;
        self.entries = next;

        debug!(key, path = %self.path.display(), "Preference saved");
        Ok(())
    }
}

// ============================================================================
// MemoryStore : en mémoire (tests, mode sans disque)
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crée un magasin prérempli
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

// ============================================================================
// Mode sombre
// ============================================================================

/// Lit le mode sombre ; absent ou illisible → false (mode clair)
pub fn load_dark_mode(store: &dyn PreferenceStore) -> bool {
    match store.get(DARK_MODE_KEY) {
        Some(raw) => match serde_json::from_str::<bool>(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(value = %raw, error = %e, "Malformed darkMode preference, using light mode");
                false
            }
        },
        None => false,
    }
}

pub fn save_dark_mode(store: &mut dyn PreferenceStore, enabled: bool) -> Result<(), StoreError> {
    store.set(DARK_MODE_KEY, serde_json::to_string(&enabled)?)
}
