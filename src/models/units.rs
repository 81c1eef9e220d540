// ============================================================================
// Conversion d'unités de poids
// ============================================================================
// Les sources publient des prix à l'once troy. L'utilisateur peut vouloir
// afficher le prix au gramme, au kilo ou au tola.
//
// Les fonctions convertissent un PRIX PAR UNITÉ (et non une quantité) :
// - 1 once = 31.1034768 grammes  => prix/g  = prix/oz ÷ 31.1034768
// - 1 kg   = 1000 grammes        => prix/kg = prix/g × 1000
// - 1 tola = 3/8 once            => prix/tola = prix/oz × 3/8
//
// CONCEPT RUST : fonctions pures
// - Pas d'état, pas d'I/O : faciles à tester
// - L'once sert d'unité pivot pour toutes les conversions
// ============================================================================

use serde::{Deserialize, Serialize};

/// Grammes dans une once troy
pub const GRAMS_PER_OUNCE: f64 = 31.1034768;

/// Onces troy dans un tola
pub const OUNCES_PER_TOLA: f64 = 3.0 / 8.0;

/// Unités de poids supportées
///
/// L'ordre des variants correspond aux index 0..=3 des réglages
/// (`gold-weight-unit`, `silver-ownership-unit`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WeightUnit {
    #[default]
    Ounce,
    Gram,
    Kilogram,
    Tola,
}

impl WeightUnit {
    pub const ALL: [WeightUnit; 4] = [
        WeightUnit::Ounce,
        WeightUnit::Gram,
        WeightUnit::Kilogram,
        WeightUnit::Tola,
    ];

    /// Construit une unité depuis son index de réglage (0..=3)
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u8 {
        match self {
            WeightUnit::Ounce => 0,
            WeightUnit::Gram => 1,
            WeightUnit::Kilogram => 2,
            WeightUnit::Tola => 3,
        }
    }

    /// Symbole court affiché à côté du prix
    pub fn symbol(self) -> &'static str {
        match self {
            WeightUnit::Ounce => "℥",
            WeightUnit::Gram => "g",
            WeightUnit::Kilogram => "kg",
            WeightUnit::Tola => "tola",
        }
    }
}

impl TryFrom<u8> for WeightUnit {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        WeightUnit::from_index(value)
            .ok_or_else(|| format!("unité de poids invalide : {} (attendu 0..=3)", value))
    }
}

impl From<WeightUnit> for u8 {
    fn from(unit: WeightUnit) -> Self {
        unit.index()
    }
}

/// Convertit un prix exprimé par `from` en prix par once
pub fn to_ounce(value: f64, from: WeightUnit) -> f64 {
    match from {
        WeightUnit::Ounce => value,
        WeightUnit::Gram => value * GRAMS_PER_OUNCE,
        WeightUnit::Kilogram => value / 1000.0 * GRAMS_PER_OUNCE,
        WeightUnit::Tola => value / OUNCES_PER_TOLA,
    }
}

/// Convertit un prix par once en prix par `to`
pub fn from_ounce(value: f64, to: WeightUnit) -> f64 {
    match to {
        WeightUnit::Ounce => value,
        WeightUnit::Gram => value / GRAMS_PER_OUNCE,
        WeightUnit::Kilogram => value / GRAMS_PER_OUNCE * 1000.0,
        WeightUnit::Tola => value * OUNCES_PER_TOLA,
    }
}

/// Convertit un prix d'une unité à une autre en passant par l'once
///
/// Même unité en entrée et en sortie : la valeur est rendue telle quelle,
/// sans aller-retour flottant.
pub fn convert(value: f64, from: WeightUnit, to: WeightUnit) -> f64 {
    if from == to {
        return value;
    }
    from_ounce(to_ounce(value, from), to)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn close_to(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_identity_is_exact() {
        for unit in WeightUnit::ALL {
            for x in [0.0, 1.0, 0.1, 2000.5, 123456.789, -3.3] {
                assert_eq!(convert(x, unit, unit), x);
            }
        }
    }

    #[test]
    fn test_round_trip_through_each_unit() {
        for unit in WeightUnit::ALL {
            for x in [0.01, 1.0, 31.1034768, 2000.5, 98765.4321] {
                let back = convert(convert(x, WeightUnit::Ounce, unit), unit, WeightUnit::Ounce);
                assert!(close_to(back, x), "{:?}: {} != {}", unit, back, x);
            }
        }
    }

    #[test]
    fn test_known_factors() {
        assert!(close_to(from_ounce(2000.0, WeightUnit::Gram), 64.30149313));
        assert!(close_to(from_ounce(2000.0, WeightUnit::Kilogram), 64301.49313));
        assert_eq!(from_ounce(2000.0, WeightUnit::Tola), 750.0);
        assert_eq!(to_ounce(750.0, WeightUnit::Tola), 2000.0);
    }

    #[test]
    fn test_kilogram_is_thousand_grams() {
        let per_gram = convert(2000.0, WeightUnit::Ounce, WeightUnit::Gram);
        let per_kilo = convert(2000.0, WeightUnit::Ounce, WeightUnit::Kilogram);
        assert!(close_to(per_kilo, per_gram * 1000.0));
    }

    #[test]
    fn test_index_mapping() {
        assert_eq!(WeightUnit::from_index(0), Some(WeightUnit::Ounce));
        assert_eq!(WeightUnit::from_index(3), Some(WeightUnit::Tola));
        assert_eq!(WeightUnit::from_index(4), None);
        assert_eq!(WeightUnit::try_from(2u8), Ok(WeightUnit::Kilogram));
        assert!(WeightUnit::try_from(9u8).is_err());
        assert_eq!(WeightUnit::Gram.symbol(), "g");
    }
}
