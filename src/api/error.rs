// ============================================================================
// Erreurs du pipeline de récupération
// ============================================================================
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère l'implémentation de std::error::Error
// - #[error("...")] définit le message Display de chaque variant
//
// Deux niveaux d'erreur :
// - FetchError : fait échouer tout le fetch (réseau, HTTP, parsing, ...)
// - FieldError : un champ manque pour UNE commodité, qui est ignorée
// ============================================================================

use thiserror::Error;

use crate::api::source::BodyFormat;

/// Famille d'erreur, pour les logs et l'affichage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NetworkFailure,
    MalformedResponse,
    UnsupportedFormat,
    Cancelled,
}

/// Erreur fatale pour une tentative de fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("remote server error: HTTP {status}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response contains no items")]
    EmptyItems,

    #[error("source {source_name} cannot handle {format:?} bodies")]
    UnsupportedFormat {
        source_name: String,
        format: BodyFormat,
    },

    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Network(_) | FetchError::HttpStatus { .. } => FailureKind::NetworkFailure,
            FetchError::Malformed(_) | FetchError::EmptyItems => FailureKind::MalformedResponse,
            FetchError::UnsupportedFormat { .. } => FailureKind::UnsupportedFormat,
            FetchError::Cancelled => FailureKind::Cancelled,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        FetchError::Network(error.to_string())
    }
}

/// Champ introuvable ou inexploitable dans l'item brut d'une commodité
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{commodity}: field `{field}` not found")]
    MissingField { commodity: String, field: &'static str },

    #[error("{commodity}: field `{field}` is not a number ({raw})")]
    NotNumeric {
        commodity: String,
        field: &'static str,
        raw: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(FetchError::Network("timeout".into()).kind(), FailureKind::NetworkFailure);
        assert_eq!(
            FetchError::HttpStatus { status: 404, body: String::new() }.kind(),
            FailureKind::NetworkFailure
        );
        assert_eq!(FetchError::EmptyItems.kind(), FailureKind::MalformedResponse);
        assert_eq!(FetchError::Cancelled.kind(), FailureKind::Cancelled);
    }

    #[test]
    fn test_messages() {
        let err = FetchError::HttpStatus { status: 503, body: "down".into() };
        assert_eq!(err.to_string(), "remote server error: HTTP 503");

        let err = FieldError::MissingField { commodity: "gold".into(), field: "price" };
        assert_eq!(err.to_string(), "gold: field `price` not found");
    }
}
