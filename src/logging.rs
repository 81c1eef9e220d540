// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
//
// Les logs sont écrits dans :
// - Linux : ~/.local/share/metalwatch/logs/metalwatch.log
// - macOS : ~/Library/Application Support/metalwatch/logs/metalwatch.log
// - Sinon : ./logs/metalwatch.log
//
// # Utilisation
// ```bash
// tail -f ~/.local/share/metalwatch/logs/metalwatch.log
// RUST_LOG=metalwatch=trace metalwatch
// ```
// ============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Répertoire de logs par défaut
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("metalwatch").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Filtre utilisé quand RUST_LOG n'est pas défini
///
/// `enable-debug-logging` active le niveau debug pour la crate.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "metalwatch=debug,info"
    } else {
        "metalwatch=info,warn"
    }
}

/// Initialise le système de logging vers fichier
///
/// CONCEPT RUST : Tracing subscriber
/// - Registry : point central des logs
/// - Layer : transforme et route les logs
/// - EnvFilter : filtre par niveau (RUST_LOG env var)
/// - RollingFileAppender : rotation automatique
pub fn init_logging(debug_logging: bool, log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "metalwatch.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(debug_logging))),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(log_dir = %log_dir.display(), debug_logging, "Logging initialisé");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(true), "metalwatch=debug,info");
        assert_eq!(default_directive(false), "metalwatch=info,warn");
        assert!(EnvFilter::try_new(default_directive(true)).is_ok());
    }

    #[test]
    fn test_init_logging_creates_log_dir() {
        let dir = std::env::temp_dir().join(format!("metalwatch-logs-{}", std::process::id()));

        assert!(init_logging(true, &dir).is_ok());
        assert!(dir.is_dir());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_default_log_dir_ends_with_logs() {
        assert!(default_log_dir().ends_with("logs"));
    }
}
