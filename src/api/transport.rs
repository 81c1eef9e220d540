// ============================================================================
// Transport HTTP
// ============================================================================
// Le Fetcher prépare une requête (PreparedRequest) et la confie à un
// Transport qui fait exactement UN aller-retour réseau.
//
// CONCEPT RUST : Trait + async_trait
// - Transport est l'unique point de contact avec le réseau
// - HttpTransport l'implémente avec reqwest
// - Les tests fournissent leur propre implémentation (réponses en mémoire)
// ============================================================================

use async_trait::async_trait;
use tracing::debug;

use crate::api::error::FetchError;
use crate::api::source::HttpMethod;

/// Requête prête à partir
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Corps JSON déjà sérialisé (POST uniquement)
    pub body: Option<String>,
}

/// Réponse brute : statut + octets du corps
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Un aller-retour HTTP
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, FetchError>;
}

/// Transport réel basé sur reqwest
///
/// Le client est créé une fois et réutilisé (pool de connexions).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, FetchError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        debug!(method = request.method.as_str(), url = %request.url, "Sending HTTP request");
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(status, bytes = body.len(), "Received HTTP response");

        Ok(RawResponse { status, body })
    }
}
