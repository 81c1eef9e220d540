// ============================================================================
// Module : models
// ============================================================================
// Structures de données de l'application : métaux, cotations, unités de
// poids, devises et réglages.
// ============================================================================

pub mod asset;    // Métaux précieux (or, argent, ...)
pub mod currency; // Table ISO 4217
pub mod quote;    // Cotation normalisée
pub mod settings; // Instantané des réglages
pub mod units;    // Conversion d'unités de poids

// Re-export des structures principales pour simplifier les imports
pub use asset::Asset;
pub use quote::{NormalizedQuote, QuoteMap};
pub use settings::Settings;
pub use units::WeightUnit;
