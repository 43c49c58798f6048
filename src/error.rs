// ============================================================================
// Erreurs de la bibliothèque
// ============================================================================
// Deux familles d'erreurs typées :
// - FetchError : un appel à l'API de marché a échoué (réseau ou décodage)
// - StoreError : l'écriture du fichier de préférences a échoué
//
// Les erreurs de LECTURE des préférences ne sont pas des erreurs : une valeur
// absente ou illisible retombe sur la valeur par défaut (voir store.rs).
// ============================================================================

use thiserror::Error;

/// Échec d'un appel à la passerelle de données de marché
///
/// Aucune de ces erreurs n'est fatale : elle est attachée à la vue qui a
/// lancé la requête, et seulement à elle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Passerelle injoignable, ou statut HTTP hors 2xx
    #[error("network failure: {message}")]
    Network {
        /// Statut HTTP si le serveur a répondu
        status: Option<u16>,
        message: String,
    },

    /// Le corps de la réponse n'a pas la forme attendue
    #[error("decode failure: {0}")]
    Decode(String),
}

impl FetchError {
    /// Erreur de transport (pas de réponse du serveur)
    pub fn transport(message: impl Into<String>) -> Self {
        FetchError::Network {
            status: None,
            message: message.into(),
        }
    }

    /// Réponse reçue avec un statut d'erreur
    pub fn status(status: u16) -> Self {
        FetchError::Network {
            status: Some(status),
            message: format!("HTTP {}", status),
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, FetchError::Decode(_))
    }
}

/// Échec d'écriture dans le magasin de préférences
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write preferences: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_keeps_code() {
        let err = FetchError::status(429);
        assert_eq!(
            err,
            FetchError::Network {
                status: Some(429),
                message: "HTTP 429".to_string()
            }
        );
        assert_eq!(err.to_string(), "network failure: HTTP 429");
        assert!(!err.is_decode());
    }

    #[test]
    fn test_decode_error_display() {
        let err = FetchError::Decode("missing field `id`".to_string());
        assert!(err.is_decode());
        assert!(err.to_string().contains("missing field"));
    }
}
