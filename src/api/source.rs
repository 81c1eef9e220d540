// ============================================================================
// Registre des sources de prix
// ============================================================================
// Chaque source décrit COMMENT interroger un fournisseur et OÙ trouver les
// champs dans sa réponse. Le registre ne fait aucune I/O : il construit des
// URLs, des en-têtes, des corps de requête, et découpe une réponse déjà
// décodée en items bruts. Le Fetcher (fetcher.rs) fait le reste.
//
// CONCEPT RUST : Enum avec données (ProviderKind)
// - Un variant par forme d'API : REST/JSON simple, GraphQL en POST, texte
//   tabulé
// - Chaque variant porte ses propres paramètres
// - Le match exhaustif garantit que chaque forme est gérée partout
//
// CONCEPT RUST : 'static
// - Les sources sont des constantes définies une fois pour toutes
// - &'static str et &'static [T] : aucune allocation, partage gratuit
// ============================================================================

use std::collections::HashMap;

use serde_json::{json, Value};
use tracing::warn;

use crate::api::error::FetchError;
use crate::models::Settings;

/// User-Agent de navigateur desktop (certains fournisseurs bloquent les bots naïfs)
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:143.0) Gecko/20100101 Firefox/143.0";

/// Méthode HTTP utilisée par une source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Format du corps de réponse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    /// Lignes séparées par `\n`, colonnes par `\t`
    DelimitedText,
}

/// Réponse décodée selon le format déclaré par la source
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Json(Value),
    Rows(Vec<Vec<String>>),
}

impl Decoded {
    pub fn format(&self) -> BodyFormat {
        match self {
            Decoded::Json(_) => BodyFormat::Json,
            Decoded::Rows(_) => BodyFormat::DelimitedText,
        }
    }
}

// ============================================================================
// Chemins de champs
// ============================================================================

/// Un pas dans un chemin : clé d'objet ou index de tableau / colonne
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Key(&'static str),
    Index(usize),
}

/// Chemin (éventuellement imbriqué) vers une valeur dans un item brut
pub type FieldPath = &'static [Step];

/// Suit un chemin dans une valeur JSON
///
/// Les lignes de texte tabulé sont représentées comme des tableaux de
/// chaînes : `Step::Index(n)` y désigne la colonne n.
pub fn lookup<'a>(item: &'a Value, path: FieldPath) -> Option<&'a Value> {
    path.iter().try_fold(item, |value, step| match step {
        Step::Key(key) => value.get(key),
        Step::Index(index) => value.get(index),
    })
}

/// Emplacement des champs d'une commodité dans un item brut
///
/// Un champ optionnel à `None` n'est simplement pas extrait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMap {
    pub price: FieldPath,
    pub change: FieldPath,
    pub pchange: FieldPath,
    pub close: Option<FieldPath>,
    pub unit: Option<FieldPath>,
    pub gold_ratio: Option<FieldPath>,
}

/// Association explicite : une ou plusieurs commodités partagent un FieldMap
///
/// Exemple : chez kitco, gold/silver/platinum/... ont tous leurs champs
/// dans `bid`, `change`, `changePercentage`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommodityBinding {
    pub names: &'static [&'static str],
    pub fields: FieldMap,
}

// ============================================================================
// Forme de l'API
// ============================================================================

/// Forme de l'API du fournisseur
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProviderKind {
    /// GET simple, réponse `{"items": [ {...toutes les commodités...} ]}`
    ///
    /// `{currency}` dans le gabarit est remplacé par le code devise.
    RestJson { url_template: &'static str },

    /// POST d'un document GraphQL, réponse `data.<commodité>.results[0]`
    GraphqlPost {
        endpoint: &'static str,
        query: &'static str,
        operation_name: &'static str,
    },

    /// GET d'un texte tabulé, une ligne par commodité
    ///
    /// La colonne `key_column` contient le nom de la commodité.
    Tabular {
        url_template: &'static str,
        key_column: usize,
    },
}

/// Descripteur d'une source de prix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Source {
    pub name: &'static str,
    pub format: BodyFormat,
    pub commodities: &'static [CommodityBinding],
    pub kind: ProviderKind,
}

impl Source {
    pub fn method(&self) -> HttpMethod {
        match self.kind {
            ProviderKind::RestJson { .. } | ProviderKind::Tabular { .. } => HttpMethod::Get,
            ProviderKind::GraphqlPost { .. } => HttpMethod::Post,
        }
    }

    /// Noms de toutes les commodités publiées, alias compris
    pub fn commodity_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commodities.iter().flat_map(|binding| binding.names.iter().copied())
    }

    /// Construit l'URL de la requête
    pub fn url(&self, settings: &Settings) -> String {
        match self.kind {
            ProviderKind::RestJson { url_template } | ProviderKind::Tabular { url_template, .. } => {
                url_template.replace("{currency}", &settings.currency)
            }
            ProviderKind::GraphqlPost { endpoint, .. } => endpoint.to_string(),
        }
    }

    /// Construit les en-têtes, dans l'ordre d'envoi
    ///
    /// Toujours : User-Agent de navigateur + `Cache-Control: no-cache`.
    /// POST : `content-type: application/json`, et pour GraphQL un
    /// `x-query-id` identique aux variables du corps.
    pub fn headers(&self, settings: &Settings, timestamp: i64) -> Vec<(String, String)> {
        let mut headers = vec![
            ("User-Agent".to_string(), BROWSER_USER_AGENT.to_string()),
            ("Cache-Control".to_string(), "no-cache".to_string()),
        ];

        if self.method() == HttpMethod::Post {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        if let ProviderKind::GraphqlPost { .. } = self.kind {
            headers.push((
                "x-query-id".to_string(),
                query_variables(settings, timestamp).to_string(),
            ));
        }

        headers
    }

    /// Corps JSON de la requête, pour les sources en POST
    pub fn body(&self, settings: &Settings, timestamp: i64) -> Option<Value> {
        match self.kind {
            ProviderKind::GraphqlPost { query, operation_name, .. } => Some(json!({
                "query": query,
                "variables": query_variables(settings, timestamp),
                "operationName": operation_name,
            })),
            ProviderKind::RestJson { .. } | ProviderKind::Tabular { .. } => None,
        }
    }

    /// Découpe une réponse décodée en items bruts : commodité -> item
    pub fn items(&self, decoded: &Decoded) -> Result<HashMap<String, Value>, FetchError> {
        match (self.kind, decoded) {
            (ProviderKind::RestJson { .. }, Decoded::Json(data)) => {
                let items = data
                    .get("items")
                    .and_then(Value::as_array)
                    .ok_or_else(|| FetchError::Malformed("missing `items` array".to_string()))?;

                // Toutes les commodités sont dans le premier élément
                let first = items.first().ok_or(FetchError::EmptyItems)?;
                Ok(self
                    .commodity_names()
                    .map(|name| (name.to_string(), first.clone()))
                    .collect())
            }

            (ProviderKind::GraphqlPost { .. }, Decoded::Json(data)) => {
                let metals = data
                    .get("data")
                    .and_then(Value::as_object)
                    .ok_or_else(|| FetchError::Malformed("missing `data` object".to_string()))?;

                let mut result = HashMap::new();
                for (metal, value) in metals {
                    match value.get("results").and_then(|results| results.get(0)) {
                        Some(quote) => {
                            result.insert(metal.clone(), quote.clone());
                        }
                        None => warn!(source = self.name, metal = %metal, "No results for metal"),
                    }
                }

                if result.is_empty() {
                    return Err(FetchError::EmptyItems);
                }
                Ok(result)
            }

            (ProviderKind::Tabular { key_column, .. }, Decoded::Rows(rows)) => {
                let result: HashMap<String, Value> = rows
                    .iter()
                    .filter_map(|row| {
                        let key = row.get(key_column)?.trim().to_string();
                        let columns = row.iter().map(|cell| Value::String(cell.clone())).collect();
                        Some((key, Value::Array(columns)))
                    })
                    .collect();

                if result.is_empty() {
                    return Err(FetchError::EmptyItems);
                }
                Ok(result)
            }

            (_, other) => Err(FetchError::UnsupportedFormat {
                source_name: self.name.to_string(),
                format: other.format(),
            }),
        }
    }
}

/// Variables GraphQL, aussi envoyées en en-tête `x-query-id`
fn query_variables(settings: &Settings, timestamp: i64) -> Value {
    json!({
        "timestamp": timestamp,
        "currency": settings.currency,
    })
}

// ============================================================================
// Sources connues
// ============================================================================

const KITCO_QUERY: &str = "fragment MetalFragment on Metal{ID symbol currency name results{...MetalQuoteFragment}}fragment MetalQuoteFragment on Quote{ID ask bid change changePercentage close high low mid open originalTime timestamp unit}query AllMetalsQuote($currency:String!, $timestamp:Int){gold:GetMetalQuoteV3(symbol:\"AU\" timestamp:$timestamp currency:$currency){...MetalFragment}silver:GetMetalQuoteV3(symbol:\"AG\" timestamp:$timestamp currency:$currency){...MetalFragment}platinum:GetMetalQuoteV3(symbol:\"PT\" timestamp:$timestamp currency:$currency){...MetalFragment}palladium:GetMetalQuoteV3(symbol:\"PD\" timestamp:$timestamp currency:$currency){...MetalFragment}rhodium:GetMetalQuoteV3(symbol:\"RH\" timestamp:$timestamp currency:$currency){...MetalFragment}}";

static SOURCES: &[Source] = &[
    Source {
        name: "goldprice.org",
        format: BodyFormat::Json,
        commodities: &[
            CommodityBinding {
                names: &["gold"],
                fields: FieldMap {
                    price: &[Step::Key("xauPrice")],
                    change: &[Step::Key("chgXau")],
                    pchange: &[Step::Key("pcXau")],
                    close: Some(&[Step::Key("xauClose")]),
                    unit: None,
                    gold_ratio: None,
                },
            },
            CommodityBinding {
                names: &["silver"],
                fields: FieldMap {
                    price: &[Step::Key("xagPrice")],
                    change: &[Step::Key("chgXag")],
                    pchange: &[Step::Key("pcXag")],
                    close: Some(&[Step::Key("xagClose")]),
                    unit: None,
                    gold_ratio: None,
                },
            },
        ],
        kind: ProviderKind::RestJson {
            url_template: "https://data-asg.goldprice.org/dbXRates/{currency}",
        },
    },
    Source {
        name: "kitco.com",
        format: BodyFormat::Json,
        commodities: &[CommodityBinding {
            names: &["gold", "silver", "platinum", "palladium", "rhodium"],
            fields: FieldMap {
                price: &[Step::Key("bid")],
                change: &[Step::Key("change")],
                pchange: &[Step::Key("changePercentage")],
                close: None,
                unit: None,
                gold_ratio: None,
            },
        }],
        kind: ProviderKind::GraphqlPost {
            endpoint: "https://kdb-gw.prod.kitco.com/",
            query: KITCO_QUERY,
            operation_name: "AllMetalsQuote",
        },
    },
];

/// Retrouve une source par sa clé (`enabled-source`)
pub fn resolve(key: &str) -> Option<&'static Source> {
    SOURCES.iter().find(|source| source.name == key)
}

/// Toutes les sources enregistrées, dans l'ordre du registre
pub fn all() -> &'static [Source] {
    SOURCES
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(currency: &str) -> Settings {
        Settings {
            currency: currency.to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve("goldprice.org").map(|s| s.name), Some("goldprice.org"));
        assert_eq!(resolve("kitco.com").map(|s| s.method()), Some(HttpMethod::Post));
        assert!(resolve("example.com").is_none());
        assert_eq!(all().len(), 2);
    }

    #[test]
    fn test_goldprice_request() {
        let source = resolve("goldprice.org").unwrap();
        assert_eq!(source.method(), HttpMethod::Get);
        assert_eq!(source.url(&settings("EUR")), "https://data-asg.goldprice.org/dbXRates/EUR");
        assert!(source.body(&settings("EUR"), 0).is_none());

        let headers = source.headers(&settings("EUR"), 0);
        assert_eq!(headers[0], ("User-Agent".to_string(), BROWSER_USER_AGENT.to_string()));
        assert_eq!(headers[1], ("Cache-Control".to_string(), "no-cache".to_string()));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_kitco_request() {
        let source = resolve("kitco.com").unwrap();
        assert_eq!(source.url(&settings("USD")), "https://kdb-gw.prod.kitco.com/");

        let body = source.body(&settings("USD"), 1_700_000_000).unwrap();
        assert_eq!(body["operationName"], "AllMetalsQuote");
        assert_eq!(body["variables"], json!({"timestamp": 1_700_000_000, "currency": "USD"}));
        assert!(body["query"].as_str().unwrap().contains("rhodium:GetMetalQuoteV3"));

        let headers = source.headers(&settings("USD"), 1_700_000_000);
        let names: Vec<&str> = headers.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["User-Agent", "Cache-Control", "content-type", "x-query-id"]);

        let query_id: Value = serde_json::from_str(&headers[3].1).unwrap();
        assert_eq!(query_id, body["variables"]);
    }

    #[test]
    fn test_goldprice_items_share_first_element() {
        let source = resolve("goldprice.org").unwrap();
        let data = Decoded::Json(json!({"items": [{"xauPrice": 2000.5, "xagPrice": 25.1}]}));
        let items = source.items(&data).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items["gold"], items["silver"]);
        assert_eq!(items["gold"]["xauPrice"], 2000.5);
    }

    #[test]
    fn test_goldprice_empty_items() {
        let source = resolve("goldprice.org").unwrap();
        let err = source.items(&Decoded::Json(json!({"items": []}))).unwrap_err();
        assert!(matches!(err, FetchError::EmptyItems));

        let err = source.items(&Decoded::Json(json!({"rates": {}}))).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn test_kitco_items_take_first_result() {
        let source = resolve("kitco.com").unwrap();
        let data = Decoded::Json(json!({
            "data": {
                "gold": {"results": [{"bid": 2001.0}, {"bid": 1990.0}]},
                "silver": {"results": [{"bid": 24.5}]},
                "rhodium": {"results": []}
            }
        }));
        let items = source.items(&data).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items["gold"]["bid"], 2001.0);
        assert!(!items.contains_key("rhodium"));
    }

    #[test]
    fn test_format_mismatch_is_unsupported() {
        let source = resolve("kitco.com").unwrap();
        let rows = Decoded::Rows(vec![vec!["gold".to_string()]]);
        let err = source.items(&rows).unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedFormat { format: BodyFormat::DelimitedText, .. }));
    }

    #[test]
    fn test_tabular_rows_keyed_by_column() {
        static BINDINGS: &[CommodityBinding] = &[];
        let source = Source {
            name: "tabular",
            format: BodyFormat::DelimitedText,
            commodities: BINDINGS,
            kind: ProviderKind::Tabular { url_template: "https://example.test/{currency}", key_column: 0 },
        };
        let rows = Decoded::Rows(vec![
            vec!["gold".into(), "2000.5".into()],
            vec!["silver".into(), "25.0".into()],
        ]);

        let items = source.items(&rows).unwrap();
        assert_eq!(items["silver"], json!(["silver", "25.0"]));
        assert_eq!(source.url(&settings("CHF")), "https://example.test/CHF");
    }

    #[test]
    fn test_lookup_nested_path() {
        let item = json!({"data": {"gold": {"results": [{"bid": 1.5}]}}});
        let path: FieldPath = &[Step::Key("data"), Step::Key("gold"), Step::Key("results"), Step::Index(0), Step::Key("bid")];
        assert_eq!(lookup(&item, path), Some(&json!(1.5)));
        assert_eq!(lookup(&item, &[Step::Key("nope")]), None);
    }
}
