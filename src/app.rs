// ============================================================================
// Structure : App
// ============================================================================
// État de l'indicateur : dernières cotations valides, rotation affichée,
// horodatages "Last update" / "Next update".
//
// PATTERN : "Application State"
// - L'interface lit depuis App
// - Toutes les modifications passent par les méthodes de App
//
// Règles :
// - La rotation n'est remplacée qu'après un fetch entièrement réussi
//   (apply_quotes). Un échec (apply_failure) ne touche à rien d'affiché.
// - tick() ne fait que relire le dernier état valide, jamais le réseau.
// ============================================================================

use chrono::{DateTime, Duration, Local};
use tracing::{debug, info};

use crate::api::FetchError;
use crate::models::{QuoteMap, Settings};
use crate::ui::ticker::{build_entries, Rotation, TickerLine};

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Réglages en vigueur (lecture seule pour le cœur)
    pub settings: Settings,

    /// Dernières cotations valides
    quotes: QuoteMap,

    /// Entrées en rotation
    rotation: Rotation,

    /// Dernière ligne rendue : reste affichée tant qu'aucun tick ne la remplace
    current_line: Option<TickerLine>,

    /// "Last update: HH:MM:SS"
    last_update: Option<String>,

    /// "Next update: HH:MM:SS"
    next_update: Option<String>,

    /// Un fetch a été demandé et pas encore résolu
    pub is_fetching: bool,

    /// Dernière erreur de fetch (affichée discrètement)
    pub last_error: Option<String>,

    /// Quit en deux temps : première pression de 'q' => true
    pub confirm_quit: bool,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            running: true,
            settings,
            quotes: QuoteMap::new(),
            rotation: Rotation::new(),
            current_line: None,
            last_update: None,
            next_update: None,
            is_fetching: false,
            last_error: None,
            confirm_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    /// Un fetch vient d'être demandé
    pub fn start_fetch(&mut self) {
        self.is_fetching = true;
    }

    /// Applique un fetch réussi
    ///
    /// Remplace d'un bloc l'ensemble de rotation, met à jour les horodatages
    /// et rend immédiatement la première ligne.
    pub fn apply_quotes(&mut self, quotes: QuoteMap, now: DateTime<Local>) {
        let entries = build_entries(&quotes, &self.settings);
        info!(commodities = quotes.len(), entries = entries.len(), "Applying fresh quotes");

        self.quotes = quotes;
        self.rotation.replace(entries);
        self.is_fetching = false;
        self.last_error = None;

        // Intervalle hors de la plage de chrono : pas de "Next update"
        let next = i64::try_from(self.settings.refresh_interval)
            .ok()
            .and_then(Duration::try_minutes)
            .and_then(|interval| now.checked_add_signed(interval));
        self.last_update = Some(format!("Last update: {}", now.format("%H:%M:%S")));
        self.next_update = next.map(|next| format!("Next update: {}", next.format("%H:%M:%S")));

        self.tick();
    }

    /// Enregistre un fetch en échec : l'affichage reste inchangé
    pub fn apply_failure(&mut self, error: &FetchError) {
        debug!(error = %error, "Keeping stale state after failed fetch");
        self.is_fetching = false;
        self.last_error = Some(error.to_string());
    }

    /// Tick de rotation : affiche l'entrée suivante
    ///
    /// Rotation vide : la ligne précédente reste.
    pub fn tick(&mut self) {
        if let Some(line) = self.rotation.tick() {
            self.current_line = Some(line);
        }
    }

    pub fn quotes(&self) -> &QuoteMap {
        &self.quotes
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    pub fn current_line(&self) -> Option<&TickerLine> {
        self.current_line.as_ref()
    }

    pub fn last_update(&self) -> Option<&str> {
        self.last_update.as_deref()
    }

    pub fn next_update(&self) -> Option<&str> {
        self.next_update.as_deref()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::NormalizedQuote;

    fn quotes(gold: f64) -> QuoteMap {
        let mut quotes = QuoteMap::new();
        quotes.insert("gold".into(), NormalizedQuote::new(gold, 1.2, 0.06));
        quotes.insert("silver".into(), NormalizedQuote::new(25.1, -0.3, -1.18));
        quotes
    }

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_app_creation() {
        let app = App::new(Settings::default());
        assert!(app.is_running());
        assert!(app.current_line().is_none());
        assert!(app.rotation().is_empty());
        assert!(app.last_update().is_none());
    }

    #[test]
    fn test_app_quit() {
        let mut app = App::new(Settings::default());
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_apply_quotes_renders_and_timestamps() {
        let mut app = App::new(Settings::default());
        app.start_fetch();
        app.apply_quotes(quotes(2000.5), at(9, 30));

        assert!(!app.is_fetching);
        assert_eq!(app.current_line().unwrap().label, "AU");
        assert_eq!(app.last_update(), Some("Last update: 09:30:00"));
        assert_eq!(app.next_update(), Some("Next update: 09:35:00"));

        app.tick();
        assert_eq!(app.current_line().unwrap().label, "AG");
    }

    #[test]
    fn test_huge_interval_skips_next_update() {
        let settings = Settings { refresh_interval: 1_000_000_000_000, ..Settings::default() };
        let mut app = App::new(settings);
        app.apply_quotes(quotes(2000.5), at(9, 30));

        assert_eq!(app.last_update(), Some("Last update: 09:30:00"));
        assert_eq!(app.next_update(), None);
        assert_eq!(app.current_line().unwrap().label, "AU");
    }

    #[test]
    fn test_failure_keeps_previous_state() {
        let mut app = App::new(Settings::default());
        app.apply_quotes(quotes(2000.5), at(9, 30));
        let line_before = app.current_line().cloned();

        app.start_fetch();
        app.apply_failure(&FetchError::HttpStatus { status: 404, body: String::new() });

        assert!(!app.is_fetching);
        assert_eq!(app.current_line().cloned(), line_before);
        assert_eq!(app.quotes()["gold"].price, 2000.5);
        assert_eq!(app.rotation().entries().len(), 2);
        assert_eq!(app.last_update(), Some("Last update: 09:30:00"));
        assert_eq!(app.last_error.as_deref(), Some("remote server error: HTTP 404"));
    }

    #[test]
    fn test_tick_without_entries_keeps_text() {
        let mut app = App::new(Settings::default());
        app.tick();
        assert!(app.current_line().is_none());
    }
}
