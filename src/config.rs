// ============================================================================
// Configuration : fichier TOML + arguments de ligne de commande
// ============================================================================
// Ordre de priorité :
// 1. arguments (--source, --currency, --refresh-interval, --debug)
// 2. fichier de réglages (~/.config/metalwatch/settings.toml)
// 3. valeurs par défaut de Settings
//
// Exemple de fichier :
//
//   enabled-source = "kitco.com"
//   currency = "EUR"
//   gold-weight-unit = 1        # 0=once 1=gramme 2=kilo 3=tola
//   gold-ownership = 10.0
//   gold-ownership-unit = 1
//   refresh-interval = 5
// ============================================================================

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueHint};
use tracing::warn;

use crate::api::source;
use crate::models::currency::is_known_currency;
use crate::models::Settings;

/// Intervalle maximal entre deux fetchs : une semaine
pub const MAX_REFRESH_INTERVAL: u64 = 7 * 24 * 60;

/// Arguments de la ligne de commande
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Precious-metal spot prices in your terminal")]
pub struct Cli {
    /// Fichier de réglages (défaut : ~/.config/metalwatch/settings.toml)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Source de prix (voir --list-sources)
    #[arg(long)]
    pub source: Option<String>,

    /// Code devise ISO 4217 (voir --list-currencies)
    #[arg(long)]
    pub currency: Option<String>,

    /// Intervalle entre deux fetchs, en minutes
    #[arg(long)]
    pub refresh_interval: Option<u64>,

    /// Active les logs de debug
    #[arg(long)]
    pub debug: bool,

    /// Un seul fetch, affiche les lignes en texte brut et quitte
    #[arg(long)]
    pub once: bool,

    /// Liste les sources disponibles
    #[arg(long)]
    pub list_sources: bool,

    /// Liste les devises connues
    #[arg(long)]
    pub list_currencies: bool,
}

impl Cli {
    /// Applique les arguments par-dessus les réglages du fichier
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(source) = &self.source {
            settings.enabled_source = source.clone();
        }
        if let Some(currency) = &self.currency {
            settings.currency = currency.to_uppercase();
        }
        if let Some(interval) = self.refresh_interval {
            settings.refresh_interval = interval;
        }
        if self.debug {
            settings.enable_debug_logging = true;
        }
    }

    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(default_config_path)
    }
}

/// Emplacement par défaut du fichier de réglages
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("metalwatch").join("settings.toml"))
}

/// Lit le fichier de réglages ; fichier absent => valeurs par défaut
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Échec de la lecture de {}", path.display()))?;
    parse_settings(&text).with_context(|| format!("Réglages invalides dans {}", path.display()))
}

pub fn parse_settings(text: &str) -> Result<Settings> {
    Ok(toml::from_str(text)?)
}

/// Réglages effectifs : fichier + arguments
pub fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match cli.config_path() {
        Some(path) => load_settings(&path)?,
        None => Settings::default(),
    };
    cli.apply_overrides(&mut settings);
    Ok(settings)
}

/// Vérifie la cohérence des réglages
///
/// Devise ou source inconnue : simple avertissement (la source peut
/// accepter d'autres codes). Intervalle nul ou supérieur à une semaine : erreur.
pub fn validate(settings: &Settings) -> Result<()> {
    if settings.refresh_interval == 0 {
        bail!("refresh-interval doit être d'au moins 1 minute");
    }
    if settings.refresh_interval > MAX_REFRESH_INTERVAL {
        bail!("refresh-interval ne peut pas dépasser {} minutes", MAX_REFRESH_INTERVAL);
    }
    if !is_known_currency(&settings.currency) {
        warn!(currency = %settings.currency, "Unknown currency code");
    }
    if source::resolve(&settings.enabled_source).is_none() {
        warn!(source = %settings.enabled_source, "Unknown source");
    }
    if settings.gold_ownership < 0.0 || settings.silver_ownership < 0.0 {
        bail!("les quantités détenues ne peuvent pas être négatives");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::models::WeightUnit;

    use super::*;

    #[test]
    fn test_parse_settings_file() {
        let settings = parse_settings(
            r#"
            enabled-source = "kitco.com"
            currency = "EUR"
            gold-weight-unit = 1
            gold-ownership = 10.0
            gold-ownership-unit = 1
            refresh-interval = 15
            "#,
        )
        .unwrap();

        assert_eq!(settings.enabled_source, "kitco.com");
        assert_eq!(settings.gold_weight_unit, WeightUnit::Gram);
        assert_eq!(settings.gold_ownership, 10.0);
        assert_eq!(settings.silver_weight_unit, WeightUnit::Ounce);
        assert_eq!(settings.refresh_interval, 15);
    }

    #[test]
    fn test_parse_rejects_bad_unit() {
        assert!(parse_settings("gold-weight-unit = 12").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = load_settings(Path::new("/nonexistent/metalwatch/settings.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "metalwatch",
            "--source",
            "kitco.com",
            "--currency",
            "eur",
            "--refresh-interval",
            "2",
            "--debug",
        ]);
        let mut settings = Settings::default();
        cli.apply_overrides(&mut settings);

        assert_eq!(settings.enabled_source, "kitco.com");
        assert_eq!(settings.currency, "EUR");
        assert_eq!(settings.refresh_interval, 2);
        assert!(settings.enable_debug_logging);
    }

    #[test]
    fn test_validate() {
        assert!(validate(&Settings::default()).is_ok());
        assert!(validate(&Settings { refresh_interval: 0, ..Settings::default() }).is_err());
        assert!(validate(&Settings { refresh_interval: MAX_REFRESH_INTERVAL, ..Settings::default() }).is_ok());
        assert!(validate(&Settings { refresh_interval: MAX_REFRESH_INTERVAL + 1, ..Settings::default() }).is_err());
        assert!(validate(&Settings { refresh_interval: 1_000_000_000_000, ..Settings::default() }).is_err());
        assert!(validate(&Settings { gold_ownership: -1.0, ..Settings::default() }).is_err());
        // Devise inconnue : avertissement seulement
        assert!(validate(&Settings { currency: "XYZ".into(), ..Settings::default() }).is_ok());
    }
}
