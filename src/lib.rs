// ============================================================================
// MetalWatch - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;     // Sources de prix et fetcher
pub mod app;     // État de l'indicateur
pub mod config;  // Fichier de réglages + CLI
pub mod logging; // Logs vers fichier
pub mod models;  // Structures de données
pub mod ui;      // Rotation, mise en forme et rendu terminal
