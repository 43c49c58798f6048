// ============================================================================
// Configuration
// ============================================================================
// Valeurs par défaut raisonnables, surchargées par un fichier optionnel :
//   <data_dir>/lazycoin/config.json
//
// Exemple :
// { "api_base_url": "https://api.coingecko.com/api/v3", "coins_per_page": 15 }
//
// Tous les champs sont optionnels. Un fichier absent ou invalide n'empêche
// pas le démarrage : on log et on garde les valeurs par défaut.
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Nom du répertoire de l'application dans le répertoire de données
pub const APP_DIR: &str = "lazycoin";

/// Nom du fichier de configuration
pub const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_BASE_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL de base de l'API CoinGecko (sans slash final)
    pub api_base_url: String,

    /// User-Agent envoyé avec chaque requête
    pub user_agent: String,

    /// Nombre de cryptomonnaies demandées par fetch de la liste
    pub markets_per_fetch: u32,

    /// Taille de page de la liste des cryptomonnaies
    pub coins_per_page: usize,

    /// Taille de page de la liste des plateformes d'échange
    pub exchanges_per_page: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: format!("lazycoin/{}", env!("CARGO_PKG_VERSION")),
            markets_per_fetch: 100,
            coins_per_page: 10,
            exchanges_per_page: 9,
        }
    }
}

impl Config {
    /// Lit un fichier de configuration (erreur si illisible ou invalide)
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Échec de la lecture de {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Configuration invalide dans {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Charge la configuration depuis le répertoire de données
    ///
    /// Ne retourne jamais d'erreur : retombe sur `Config::default()`.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                info!(path = %path.display(), api = %config.api_base_url, "Configuration loaded");
                config
            }
            Err(e) => {
                warn!(error = ?e, "Invalid configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Corrige les valeurs incohérentes (taille de page nulle, slash final)
    fn normalized(mut self) -> Self {
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self.coins_per_page = self.coins_per_page.max(1);
        self.exchanges_per_page = self.exchanges_per_page.max(1);
        self.markets_per_fetch = self.markets_per_fetch.clamp(1, 250);
        self
    }
}

/// Répertoire de données de l'application
///
/// - Linux : ~/.local/share/lazycoin
/// - macOS : ~/Library/Application Support/lazycoin
/// - Windows : C:\Users\<user>\AppData\Roaming\lazycoin
///
/// Repli sur ./data si le système ne fournit pas de répertoire de données.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./data"))
}
