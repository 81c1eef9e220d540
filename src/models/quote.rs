// ============================================================================
// Structure : NormalizedQuote
// ============================================================================
// Cotation normalisée d'une commodité, quelle que soit la source.
//
// Toutes les valeurs sont exprimées à l'once : c'est le rôle du registre de
// sources de produire cette forme. Le convertisseur d'unités ne voit jamais
// les chaînes brutes renvoyées par les APIs.
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Cotation d'une commodité (prix à l'once)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedQuote {
    /// Prix spot par once
    pub price: f64,

    /// Variation absolue depuis la clôture précédente
    pub change: f64,

    /// Variation en pourcentage
    pub pchange: f64,

    /// Clôture précédente, si la source la publie
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<f64>,

    /// Unité annoncée par la source (ex: "ounce")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Ratio or/métal, si la source le publie
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gold_ratio: Option<f64>,
}

impl NormalizedQuote {
    pub fn new(price: f64, change: f64, pchange: f64) -> Self {
        Self {
            price,
            change,
            pchange,
            ..Default::default()
        }
    }

    /// Vrai si la variation est strictement positive
    pub fn is_up(&self) -> bool {
        self.change > 0.0
    }
}

/// Résultat d'un fetch : nom de commodité -> cotation
///
/// CONCEPT RUST : BTreeMap
/// - Ordre des clés déterministe (logs et tests stables)
pub type QuoteMap = BTreeMap<String, NormalizedQuote>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_direction() {
        assert!(NormalizedQuote::new(2000.0, 1.2, 0.06).is_up());
        assert!(!NormalizedQuote::new(2000.0, 0.0, 0.0).is_up());
        assert!(!NormalizedQuote::new(2000.0, -3.0, -0.15).is_up());
    }

    #[test]
    fn test_optional_fields_not_serialized() {
        let json = serde_json::to_value(NormalizedQuote::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(json, serde_json::json!({"price": 1.0, "change": 2.0, "pchange": 3.0}));
    }
}
