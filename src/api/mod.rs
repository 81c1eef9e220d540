// ============================================================================
// Module : api
// ============================================================================
// Récupération des prix : registre des sources, transport HTTP, fetcher
// (requête -> décodage -> normalisation) et erreurs associées.
// ============================================================================

pub mod error;     // Erreurs du pipeline
pub mod fetcher;   // Fetch + normalisation
pub mod source;    // Registre des sources (goldprice.org, kitco.com)
pub mod transport; // Aller-retour HTTP (reqwest)

// Re-export des éléments principaux
pub use error::{FailureKind, FetchError, FieldError};
pub use fetcher::{FetchOutcome, Fetcher};
pub use source::{resolve, Source};
pub use transport::{HttpTransport, Transport};
