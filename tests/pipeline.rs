// ============================================================================
// Tests d'intégration : registre -> fetcher -> App -> ligne affichée
// ============================================================================
// Le réseau est remplacé par un Transport en mémoire qui garde une copie
// des requêtes reçues.
// ============================================================================

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Local, TimeZone};
use serde_json::{json, Value};

use metalwatch::api::transport::{PreparedRequest, RawResponse};
use metalwatch::api::{self, FailureKind, FetchError, FetchOutcome, Fetcher, Transport};
use metalwatch::app::App;
use metalwatch::models::{Settings, WeightUnit};

struct RecordingTransport {
    status: u16,
    body: String,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl RecordingTransport {
    fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn last_request(&self) -> PreparedRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request sent")
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(RawResponse {
            status: self.status,
            body: self.body.clone().into_bytes(),
        })
    }
}

const GOLDPRICE_BODY: &str = r#"{"ts":1760000000,"items":[{"curr":"USD","xauPrice":2000.5,"xagPrice":25.1,"chgXau":1.2,"chgXag":-0.3,"pcXau":0.06,"pcXag":-1.18,"xauClose":1999.3,"xagClose":25.4}]}"#;

fn fetcher_for(key: &str, transport: RecordingTransport) -> Fetcher<RecordingTransport> {
    let source = api::resolve(key).expect("source registered");
    Fetcher::with_transport(*source, transport)
}

fn noon() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn goldprice_quotes_reach_the_ticker() {
    let settings = Settings {
        currency: "EUR".to_string(),
        ..Settings::default()
    };
    let fetcher = fetcher_for("goldprice.org", RecordingTransport::new(200, GOLDPRICE_BODY));

    let quotes = match fetcher.fetch(&settings).await {
        FetchOutcome::Fresh(quotes) => quotes,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(fetcher.transport().last_request().url, "https://data-asg.goldprice.org/dbXRates/EUR");
    assert_eq!(quotes["gold"].close, Some(1999.3));

    let mut app = App::new(settings);
    app.apply_quotes(quotes, noon());

    assert_eq!(app.current_line().unwrap().plain_text(), ":AU: 2000.50 +1.20 +0.06%");
    app.tick();
    assert_eq!(app.current_line().unwrap().plain_text(), ":AG: 25.10   -0.30 -1.18%");
    assert_eq!(app.last_update(), Some("Last update: 12:00:00"));
    assert_eq!(app.next_update(), Some("Next update: 12:05:00"));
}

#[tokio::test]
async fn failed_fetch_keeps_previous_line() {
    let settings = Settings::default();
    let mut app = App::new(settings.clone());

    let good = fetcher_for("goldprice.org", RecordingTransport::new(200, GOLDPRICE_BODY));
    let FetchOutcome::Fresh(quotes) = good.fetch(&settings).await else {
        panic!("first fetch should succeed");
    };
    app.apply_quotes(quotes, noon());
    let before = app.current_line().cloned();

    let bad = fetcher_for("goldprice.org", RecordingTransport::new(503, "unavailable"));
    let FetchOutcome::NoData(error) = bad.fetch(&settings).await else {
        panic!("second fetch should fail");
    };
    assert_eq!(error.kind(), FailureKind::NetworkFailure);
    app.apply_failure(&error);

    assert_eq!(app.current_line().cloned(), before);
    assert_eq!(app.quotes().len(), 2);
    assert_eq!(app.last_update(), Some("Last update: 12:00:00"));
    assert!(app.last_error.is_some());
}

#[tokio::test]
async fn kitco_in_grams_with_owned_gold() {
    let body = json!({
        "data": {
            "gold": {"results": [{"bid": 2000.0, "change": 5.0, "changePercentage": 0.25}]},
            "silver": {"results": [{"bid": 25.0, "change": -0.5, "changePercentage": -2.0}]},
            "platinum": {"results": []}
        }
    });
    let settings = Settings {
        enabled_source: "kitco.com".to_string(),
        gold_weight_unit: WeightUnit::Gram,
        gold_ownership: 10.0,
        gold_ownership_unit: WeightUnit::Gram,
        ..Settings::default()
    };
    let fetcher = fetcher_for("kitco.com", RecordingTransport::new(200, body.to_string()));

    let FetchOutcome::Fresh(quotes) = fetcher.fetch(&settings).await else {
        panic!("kitco fetch should succeed");
    };
    assert_eq!(quotes.keys().collect::<Vec<_>>(), ["gold", "silver"]);

    let request = fetcher.transport().last_request();
    assert_eq!(request.method.as_str(), "POST");
    let sent: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(sent["operationName"], "AllMetalsQuote");
    assert_eq!(sent["variables"]["currency"], "USD");
    assert!(request.headers.iter().any(|(name, _)| name == "x-query-id"));

    let mut app = App::new(settings);
    app.apply_quotes(quotes, noon());

    let lines: Vec<String> = (0..3)
        .map(|turn| {
            if turn > 0 {
                app.tick();
            }
            app.current_line().unwrap().plain_text()
        })
        .collect();
    assert_eq!(
        lines,
        [
            ":AU: 64.30  +0.16 +0.25%",
            ":AG: 25.00  -0.50 -2.00%",
            ":GV: 643.01 +1.61 +0.25%",
        ]
    );
}
