// ============================================================================
// Module : ui
// ============================================================================
// Interface terminal (ratatui + crossterm)
// ============================================================================

pub mod chart;     // Vue détail : graphique + statistiques
pub mod dashboard; // Routage, header, liste des cryptos, footer
pub mod events;    // Gestion des événements clavier
pub mod exchanges; // Plateformes d'échange
pub mod theme;     // Palettes claire / sombre

pub use dashboard::render;
pub use events::{Event, EventHandler};
