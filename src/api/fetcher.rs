// ============================================================================
// Fetcher : requête -> décodage -> normalisation
// ============================================================================
// Pour une source et un instantané de réglages :
// 1. construit la requête (URL, en-têtes, corps) depuis la Source
// 2. fait UN aller-retour réseau via le Transport
// 3. décode le corps selon le format déclaré (JSON ou texte tabulé)
// 4. extrait chaque champ déclaré pour chaque commodité
//
// Aucune erreur ne traverse la frontière du fetch : l'appelant reçoit un
// FetchOutcome (Fresh / NoData / Busy) et décide quoi faire.
//
// CONCEPT RUST : état explicite + garde RAII
// - FetchStatus::Idle / FetchStatus::Fetching(token)
// - Un seul fetch à la fois par instance : un second appel reçoit Busy
// - La garde InFlight remet l'état à Idle quand le fetch se termine,
//   même si la future est abandonnée en cours de route
// ============================================================================

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::api::error::{FetchError, FieldError};
use crate::api::source::{lookup, BodyFormat, Decoded, FieldMap, FieldPath, Source};
use crate::api::transport::{HttpTransport, PreparedRequest, RawResponse, Transport};
use crate::models::{NormalizedQuote, QuoteMap, Settings};

/// Résultat d'un appel à `Fetcher::fetch`
#[derive(Debug)]
pub enum FetchOutcome {
    /// Nouvelles cotations
    Fresh(QuoteMap),

    /// Le fetch a échoué : l'état affiché ne doit pas changer
    NoData(FetchError),

    /// Un fetch était déjà en cours : appel ignoré
    Busy,
}

/// État du fetcher
///
/// Le jeton d'annulation n'existe que pendant un fetch.
#[derive(Debug)]
enum FetchStatus {
    Idle,
    Fetching(CancellationToken),
}

/// Récupère et normalise les cotations d'une source
pub struct Fetcher<T = HttpTransport> {
    source: Source,
    transport: T,
    status: Mutex<FetchStatus>,
}

impl Fetcher<HttpTransport> {
    /// Crée un fetcher qui parle au vrai réseau
    pub fn new(source: Source) -> Result<Self, FetchError> {
        Ok(Self::with_transport(source, HttpTransport::new()?))
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn with_transport(source: Source, transport: T) -> Self {
        Self {
            source,
            transport,
            status: Mutex::new(FetchStatus::Idle),
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_fetching(&self) -> bool {
        matches!(*self.lock_status(), FetchStatus::Fetching(_))
    }

    /// Lance un fetch complet
    ///
    /// Retourne `Busy` sans rien faire si un fetch est déjà en cours.
    #[instrument(skip_all, fields(source = self.source.name))]
    pub async fn fetch(&self, settings: &Settings) -> FetchOutcome {
        let Some(token) = self.begin() else {
            debug!("Fetch already in flight, request dropped");
            return FetchOutcome::Busy;
        };
        let _in_flight = InFlight { status: &self.status };

        let request = self.build_request(settings, Utc::now().timestamp());
        debug!(url = %request.url, "Built request");

        // CONCEPT : tokio::select!
        // - Attend le premier des deux : annulation ou réponse
        // - La branche perdante est abandonnée (la requête est annulée)
        let result = tokio::select! {
            _ = token.cancelled() => Err(FetchError::Cancelled),
            response = self.transport.send(&request) => {
                response.and_then(|response| self.parse_response(response))
            }
        };

        match result {
            Ok(quotes) => {
                info!(commodities = quotes.len(), "Successfully fetched quotes");
                FetchOutcome::Fresh(quotes)
            }
            Err(error) => {
                warn!(error = %error, kind = ?error.kind(), "Fetch failed, keeping previous state");
                FetchOutcome::NoData(error)
            }
        }
    }

    /// Annule le fetch en cours
    ///
    /// Sans fetch en cours, ne fait rien.
    pub fn abort(&self) {
        if let FetchStatus::Fetching(token) = &*self.lock_status() {
            info!(source = self.source.name, "Aborting in-flight fetch");
            token.cancel();
        }
    }

    /// Construit la requête HTTP à partir de la source
    pub fn build_request(&self, settings: &Settings, timestamp: i64) -> PreparedRequest {
        PreparedRequest {
            method: self.source.method(),
            url: self.source.url(settings),
            headers: self.source.headers(settings, timestamp),
            body: self
                .source
                .body(settings, timestamp)
                .map(|payload| payload.to_string()),
        }
    }

    /// Transforme une réponse brute en cotations normalisées
    pub fn parse_response(&self, response: RawResponse) -> Result<QuoteMap, FetchError> {
        if response.status > 299 {
            let body = String::from_utf8_lossy(&response.body).into_owned();
            warn!(status = response.status, body = %body, "Remote server error");
            return Err(FetchError::HttpStatus {
                status: response.status,
                body,
            });
        }

        if response.body.is_empty() {
            return Err(FetchError::Malformed("empty body".to_string()));
        }

        let text = String::from_utf8(response.body)
            .map_err(|e| FetchError::Malformed(format!("body is not UTF-8: {}", e)))?;

        let decoded = decode(self.source.format, &text)?;
        let items = self.source.items(&decoded)?;

        let mut quotes = QuoteMap::new();
        for binding in self.source.commodities {
            for &name in binding.names {
                let Some(item) = items.get(name) else {
                    debug!(commodity = name, "Not found in response");
                    continue;
                };

                match extract_quote(name, item, &binding.fields) {
                    Ok(quote) => {
                        quotes.insert(name.to_string(), quote);
                    }
                    Err(error) => warn!(error = %error, "Skipping commodity"),
                }
            }
        }

        if quotes.is_empty() {
            return Err(FetchError::Malformed(
                "no commodity could be extracted".to_string(),
            ));
        }

        Ok(quotes)
    }

    /// Passe de Idle à Fetching ; None si déjà en cours
    fn begin(&self) -> Option<CancellationToken> {
        let mut status = self.lock_status();
        match *status {
            FetchStatus::Fetching(_) => None,
            FetchStatus::Idle => {
                let token = CancellationToken::new();
                *status = FetchStatus::Fetching(token.clone());
                Some(token)
            }
        }
    }

    fn lock_status(&self) -> MutexGuard<'_, FetchStatus> {
        lock_status(&self.status)
    }
}

fn lock_status(status: &Mutex<FetchStatus>) -> MutexGuard<'_, FetchStatus> {
    // Un panic pendant la section critique ne laisse qu'un enum cohérent
    status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Remet le fetcher à Idle à la fin du fetch (RAII)
struct InFlight<'a> {
    status: &'a Mutex<FetchStatus>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *lock_status(self.status) = FetchStatus::Idle;
    }
}

// ============================================================================
// Décodage et extraction
// ============================================================================

/// Décode le texte selon le format déclaré par la source
pub fn decode(format: BodyFormat, text: &str) -> Result<Decoded, FetchError> {
    match format {
        BodyFormat::Json => serde_json::from_str(text)
            .map(Decoded::Json)
            .map_err(|e| FetchError::Malformed(format!("invalid JSON: {}", e))),

        BodyFormat::DelimitedText => {
            let rows: Vec<Vec<String>> = text
                .split('\n')
                .map(|row| row.trim_end_matches('\r'))
                .filter(|row| !row.trim().is_empty())
                .map(|row| row.split('\t').map(str::to_string).collect())
                .collect();

            if rows.is_empty() {
                return Err(FetchError::EmptyItems);
            }
            Ok(Decoded::Rows(rows))
        }
    }
}

/// Extrait les champs déclarés d'un item brut
///
/// Prix et variations sont obligatoires : absents, la commodité est
/// ignorée. `close`, `unit` et `gold_ratio` restent à None s'ils manquent.
pub fn extract_quote(
    commodity: &str,
    item: &Value,
    fields: &FieldMap,
) -> Result<NormalizedQuote, FieldError> {
    let number = |path: FieldPath, field: &'static str| read_number(commodity, item, path, field);

    Ok(NormalizedQuote {
        price: number(fields.price, "price")?,
        change: number(fields.change, "change")?,
        pchange: number(fields.pchange, "pchange")?,
        close: optional(fields.close, |path| number(path, "close"))?,
        unit: optional(fields.unit, |path| read_text(commodity, item, path, "unit"))?,
        gold_ratio: optional(fields.gold_ratio, |path| number(path, "gratio"))?,
    })
}

/// Champ facultatif : non déclaré, absent ou null => None
fn optional<T>(
    path: Option<FieldPath>,
    read: impl Fn(FieldPath) -> Result<T, FieldError>,
) -> Result<Option<T>, FieldError> {
    match path.map(read) {
        Some(Err(FieldError::MissingField { .. })) | None => Ok(None),
        Some(result) => result.map(Some),
    }
}

fn read_value<'a>(
    commodity: &str,
    item: &'a Value,
    path: FieldPath,
    field: &'static str,
) -> Result<&'a Value, FieldError> {
    match lookup(item, path) {
        Some(Value::Null) | None => Err(FieldError::MissingField {
            commodity: commodity.to_string(),
            field,
        }),
        Some(value) => Ok(value),
    }
}

/// Lit un nombre : les sources publient tantôt des nombres, tantôt des chaînes
fn read_number(
    commodity: &str,
    item: &Value,
    path: FieldPath,
    field: &'static str,
) -> Result<f64, FieldError> {
    let value = read_value(commodity, item, path, field)?;
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| FieldError::NotNumeric {
        commodity: commodity.to_string(),
        field,
        raw: value.to_string(),
    })
}

fn read_text(
    commodity: &str,
    item: &Value,
    path: FieldPath,
    field: &'static str,
) -> Result<String, FieldError> {
    match read_value(commodity, item, path, field)? {
        Value::String(text) => Ok(text.clone()),
        other => Ok(other.to_string()),
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
