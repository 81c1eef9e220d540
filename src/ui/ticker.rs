// ============================================================================
// Ticker : rotation et mise en forme de la ligne affichée
// ============================================================================
// Une seule ligne est visible à la fois. Toutes les 2 secondes (tick), on
// passe au métal suivant :
//
//   :AU: 2000.50 +1.20 +0.06%
//   :AG: 25.10   -0.30 -1.18%
//
// - libellé sur 2 lettres dans la couleur du métal
// - montants à 2 décimales, complétés à droite par des espaces jusqu'à la
//   largeur du plus grand montant de TOUTE la rotation (colonnes alignées)
// - variation et variation en % en vert (> 0) ou rouge (<= 0), le même
//   signe étant répété devant les deux
//
// Les largeurs sont recalculées à chaque rendu : une entrée "valeur détenue"
// ajoutée change immédiatement l'alignement.
// ============================================================================

use crate::models::units::from_ounce;
use crate::models::{Asset, NormalizedQuote, QuoteMap, Settings, WeightUnit};

/// Une entrée de la rotation
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayEntry {
    /// Libellé sur 2 lettres (AU, AG, GV, ...)
    pub label: &'static str,
    pub color: (u8, u8, u8),
    /// Prix dans l'unité d'affichage (ou valeur détenue)
    pub price: f64,
    pub change: f64,
    pub pchange: f64,
}

impl DisplayEntry {
    /// Entrée de cotation d'un métal, convertie dans son unité d'affichage
    pub fn for_quote(asset: Asset, quote: &NormalizedQuote, unit: WeightUnit) -> Self {
        Self {
            label: asset.label(),
            color: asset.color(),
            price: from_ounce(quote.price, unit),
            change: from_ounce(quote.change, unit),
            pchange: quote.pchange,
        }
    }

    /// Entrée "valeur détenue" : quantité × prix converti dans l'unité détenue
    ///
    /// La variation en % est reprise telle quelle : elle ne dépend pas de
    /// l'unité ni de la quantité. Seuls l'or et l'argent ont une valeur détenue.
    pub fn owned_value(asset: Asset, quote: &NormalizedQuote, quantity: f64, unit: WeightUnit) -> Option<Self> {
        Some(Self {
            label: owned_label(asset)?,
            color: asset.color(),
            price: quantity * from_ounce(quote.price, unit),
            change: quantity * from_ounce(quote.change, unit),
            pchange: quote.pchange,
        })
    }

    pub fn is_up(&self) -> bool {
        self.change > 0.0
    }
}

fn owned_label(asset: Asset) -> Option<&'static str> {
    match asset {
        Asset::Gold => Some("GV"),
        Asset::Silver => Some("SV"),
        _ => None,
    }
}

/// Construit l'ensemble de rotation à partir des cotations
///
/// Ordre : les métaux dans l'ordre de `Asset::ALL`, puis les valeurs
/// détenues (quantité > 0 uniquement).
pub fn build_entries(quotes: &QuoteMap, settings: &Settings) -> Vec<DisplayEntry> {
    let mut entries: Vec<DisplayEntry> = Asset::ALL
        .into_iter()
        .filter_map(|asset| {
            let quote = quotes.get(asset.name())?;
            Some(DisplayEntry::for_quote(asset, quote, settings.weight_unit(asset)))
        })
        .collect();

    for asset in Asset::ALL {
        let (Some((quantity, unit)), Some(quote)) = (settings.ownership(asset), quotes.get(asset.name())) else {
            continue;
        };
        if quantity > 0.0 {
            entries.extend(DisplayEntry::owned_value(asset, quote, quantity, unit));
        }
    }

    entries
}

// ============================================================================
// Ligne rendue
// ============================================================================

/// Ligne prête à afficher, champs déjà alignés
#[derive(Debug, Clone, PartialEq)]
pub struct TickerLine {
    pub label: &'static str,
    pub color: (u8, u8, u8),
    pub price: String,
    pub change: String,
    pub pchange: String,
    pub up: bool,
}

impl TickerLine {
    pub fn sign(&self) -> char {
        if self.up {
            '+'
        } else {
            '-'
        }
    }

    /// Texte brut, sans couleurs
    pub fn plain_text(&self) -> String {
        format!(
            ":{}: {} {}{} {}{}%",
            self.label,
            self.price,
            self.sign(),
            self.change,
            self.sign(),
            self.pchange
        )
    }

    /// Texte balisé (markup Pango) pour un panneau de bureau
    pub fn to_markup(&self) -> String {
        let (r, g, b) = self.color;
        let trend = if self.up { "green" } else { "red" };
        format!(
            "<span font_family=\"monospace\">:<span foreground=\"#{:02X}{:02X}{:02X}\">{}</span>: {} <span foreground=\"{}\">{}{} {}{}%</span></span>",
            r,
            g,
            b,
            self.label,
            self.price,
            trend,
            self.sign(),
            self.change,
            self.sign(),
            self.pchange
        )
    }
}

/// Montant absolu à 2 décimales
fn magnitude(value: f64) -> String {
    format!("{:.2}", value.abs())
}

fn widest(entries: &[DisplayEntry], field: impl Fn(&DisplayEntry) -> f64) -> usize {
    entries
        .iter()
        .map(|entry| magnitude(field(entry)).len())
        .max()
        .unwrap_or(0)
}

/// Rend l'entrée `index` en alignant ses colonnes sur toute la rotation
pub fn render_entry(entries: &[DisplayEntry], index: usize) -> Option<TickerLine> {
    let entry = entries.get(index)?;

    let price_width = widest(entries, |e| e.price);
    let change_width = widest(entries, |e| e.change);
    let pchange_width = widest(entries, |e| e.pchange);

    Some(TickerLine {
        label: entry.label,
        color: entry.color,
        price: format!("{:<width$}", magnitude(entry.price), width = price_width),
        change: format!("{:<width$}", magnitude(entry.change), width = change_width),
        pchange: format!("{:<width$}", magnitude(entry.pchange), width = pchange_width),
        up: entry.is_up(),
    })
}

// ============================================================================
// Rotation
// ============================================================================

/// Rotation des entrées affichées
///
/// CONCEPT : machine à états
/// - `displaying == None` : rien n'a encore été affiché (idle)
/// - `displaying == Some(i)` : l'entrée i est à l'écran
/// - Le tick est piloté de l'extérieur (timer de 2 s)
#[derive(Debug, Default)]
pub struct Rotation {
    entries: Vec<DisplayEntry>,
    turn: usize,
    displaying: Option<usize>,
}

impl Rotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace tout l'ensemble de rotation d'un coup
    pub fn replace(&mut self, entries: Vec<DisplayEntry>) {
        self.entries = entries;
        self.displaying = None;
    }

    pub fn entries(&self) -> &[DisplayEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn displaying(&self) -> Option<usize> {
        self.displaying
    }

    /// Passe à l'entrée suivante et la rend
    ///
    /// Sans entrée : None, le texte précédent reste à l'écran.
    pub fn tick(&mut self) -> Option<TickerLine> {
        if self.entries.is_empty() {
            return None;
        }

        let index = self.turn % self.entries.len();
        self.turn = self.turn.wrapping_add(1);
        self.displaying = Some(index);
        render_entry(&self.entries, index)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
