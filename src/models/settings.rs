// ============================================================================
// Structure : Settings
// ============================================================================
// Instantané des réglages lus par le cœur (source, devise, unités, avoirs).
//
// Le cœur ne fait que LIRE ces valeurs : elles arrivent déjà validées.
// Le chargement (fichier TOML + arguments) vit dans `crate::config`.
//
// CONCEPT RUST : #[serde(rename_all = "kebab-case")]
// - Les clés du fichier sont "enabled-source", "gold-weight-unit", ...
// - Les champs Rust restent en snake_case
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::{Asset, WeightUnit};

/// Réglages de l'application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Clé de la source de prix (ex: "goldprice.org")
    pub enabled_source: String,

    /// Code ISO 4217 de la devise (ex: "USD")
    pub currency: String,

    pub gold_weight_unit: WeightUnit,
    pub silver_weight_unit: WeightUnit,
    pub platinum_weight_unit: WeightUnit,
    pub palladium_weight_unit: WeightUnit,
    pub rhodium_weight_unit: WeightUnit,

    /// Quantité d'or détenue (0 = pas d'entrée "valeur détenue")
    pub gold_ownership: f64,
    pub gold_ownership_unit: WeightUnit,

    /// Quantité d'argent détenue
    pub silver_ownership: f64,
    pub silver_ownership_unit: WeightUnit,

    /// Intervalle entre deux fetchs, en minutes
    pub refresh_interval: u64,

    pub enable_debug_logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled_source: "goldprice.org".to_string(),
            currency: "USD".to_string(),
            gold_weight_unit: WeightUnit::Ounce,
            silver_weight_unit: WeightUnit::Ounce,
            platinum_weight_unit: WeightUnit::Ounce,
            palladium_weight_unit: WeightUnit::Ounce,
            rhodium_weight_unit: WeightUnit::Ounce,
            gold_ownership: 0.0,
            gold_ownership_unit: WeightUnit::Ounce,
            silver_ownership: 0.0,
            silver_ownership_unit: WeightUnit::Ounce,
            refresh_interval: 5,
            enable_debug_logging: false,
        }
    }
}

impl Settings {
    /// Unité d'affichage du prix d'un métal (`<asset>-weight-unit`)
    pub fn weight_unit(&self, asset: Asset) -> WeightUnit {
        match asset {
            Asset::Gold => self.gold_weight_unit,
            Asset::Silver => self.silver_weight_unit,
            Asset::Platinum => self.platinum_weight_unit,
            Asset::Palladium => self.palladium_weight_unit,
            Asset::Rhodium => self.rhodium_weight_unit,
        }
    }

    /// Quantité détenue et son unité, pour les métaux qui en ont une
    ///
    /// Seuls l'or et l'argent ont des réglages de détention.
    pub fn ownership(&self, asset: Asset) -> Option<(f64, WeightUnit)> {
        match asset {
            Asset::Gold => Some((self.gold_ownership, self.gold_ownership_unit)),
            Asset::Silver => Some((self.silver_ownership, self.silver_ownership_unit)),
            _ => None,
        }
    }
}
