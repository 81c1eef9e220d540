// ============================================================================
// Module : ui
// ============================================================================
// Mise en forme de la ligne tournante (ticker) et rendu terminal (panel)
// ============================================================================

pub mod events; // Gestion des événements clavier
pub mod panel;  // Rendu ratatui de l'indicateur
pub mod ticker; // Rotation + mise en forme alignée

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use panel::render;
pub use ticker::{build_entries, DisplayEntry, Rotation, TickerLine};
