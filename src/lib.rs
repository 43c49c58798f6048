// ============================================================================
// LazyCoin - Library
// ============================================================================
// Toute la logique de synchronisation des données vit ici ; le binaire
// (main.rs) ne fait que brancher le terminal et le worker.
// ============================================================================

pub mod api;       // Passerelle vers l'API CoinGecko
pub mod app;       // État de l'interface
pub mod config;    // Configuration (fichier optionnel)
pub mod detail;    // Vue détail : assemblage + contrôleur
pub mod error;     // Erreurs typées (réseau, décodage, écriture)
pub mod exchanges; // Contrôleur des plateformes d'échange
pub mod favorites; // Favoris persistés
pub mod loader;    // Chargement étiqueté par génération
pub mod markets;   // Contrôleur de la liste des cryptos
pub mod models;    // Structures de données
pub mod query;     // Recherche, tri, pagination
pub mod state;     // Conteneur d'état partagé
pub mod store;     // Magasin de préférences
pub mod ui;        // Interface utilisateur
pub mod worker;    // Worker d'arrière-plan
