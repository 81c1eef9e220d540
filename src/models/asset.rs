// ============================================================================
// Enum : Asset
// ============================================================================
// Les cinq métaux précieux connus de l'application.
//
// CONCEPT RUST : Enum + match exhaustif
// - Nom de commodité côté source ("gold"), symbole affiché ("AU"),
//   couleur d'affichage : tout est dérivé du variant
// - Ajouter un métal force à compléter chaque match
// ============================================================================

use serde::{Deserialize, Serialize};

/// Métal précieux
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Gold,
    Silver,
    Platinum,
    Palladium,
    Rhodium,
}

impl Asset {
    /// Ordre de rotation de l'affichage
    pub const ALL: [Asset; 5] = [
        Asset::Gold,
        Asset::Silver,
        Asset::Platinum,
        Asset::Palladium,
        Asset::Rhodium,
    ];

    /// Nom de la commodité tel que publié par les sources
    pub fn name(self) -> &'static str {
        match self {
            Asset::Gold => "gold",
            Asset::Silver => "silver",
            Asset::Platinum => "platinum",
            Asset::Palladium => "palladium",
            Asset::Rhodium => "rhodium",
        }
    }

    /// Symbole chimique sur deux lettres (AU, AG, ...)
    pub fn label(self) -> &'static str {
        match self {
            Asset::Gold => "AU",
            Asset::Silver => "AG",
            Asset::Platinum => "PT",
            Asset::Palladium => "PD",
            Asset::Rhodium => "RH",
        }
    }

    /// Couleur RGB du libellé
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Asset::Gold => (0xFF, 0xD7, 0x00),
            Asset::Silver => (0xC0, 0xC0, 0xC0),
            Asset::Platinum => (0xE5, 0xE4, 0xE2),
            Asset::Palladium => (0xCE, 0xD0, 0xDD),
            Asset::Rhodium => (0xB8, 0xB8, 0xD0),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|asset| asset.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for asset in Asset::ALL {
            assert_eq!(Asset::from_name(asset.name()), Some(asset));
        }
        assert_eq!(Asset::from_name("copper"), None);
    }

    #[test]
    fn test_labels_are_two_letters() {
        for asset in Asset::ALL {
            assert_eq!(asset.label().len(), 2);
        }
        assert_eq!(Asset::Gold.color(), (0xFF, 0xD7, 0x00));
    }
}
