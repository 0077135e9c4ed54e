//! Model catalog: lists the models a key can use and ranks the vision ones.

use super::api::{self, API_KEY_HEADER};
use super::models::{self, CatalogEntry, ModelDescriptor};
use crate::credentials::Credential;
use crate::safety::redact;
use async_trait::async_trait;
use serde::Deserialize;

const PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    AuthOrNetwork(String),

    #[error("No compatible vision models found.")]
    NoCompatibleModels,
}

/// Source of selectable models for a credential.
///
/// Implementations never touch workflow state; they only return a result.
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn fetch_models(
        &self,
        credential: &Credential,
    ) -> Result<Vec<ModelDescriptor>, CatalogError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsPage {
    #[serde(default)]
    models: Vec<RemoteModel>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteModel {
    name: String,
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl From<RemoteModel> for CatalogEntry {
    fn from(m: RemoteModel) -> Self {
        CatalogEntry {
            name: m.name,
            display_name: m.display_name,
            generation_methods: m.supported_generation_methods,
        }
    }
}

/// `GET {base}/models`, following page tokens.
pub struct GeminiCatalog {
    client: reqwest::Client,
    api_base: String,
}

impl GeminiCatalog {
    pub fn new(api_base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    async fn list_all(&self, credential: &Credential) -> Result<Vec<CatalogEntry>, CatalogError> {
        let url = format!("{}/models", self.api_base);
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .get(&url)
                .header(API_KEY_HEADER, credential.expose())
                .query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token)]);
            }

            let response = req.send().await.map_err(|e| {
                CatalogError::AuthOrNetwork(api::transport_diagnostic(&e, credential))
            })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = redact::scrub(&api::error_message(&body), Some(credential));
                log::error!("[CATALOG] API returned {}: {}", status, message);
                return Err(CatalogError::AuthOrNetwork(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    message
                )));
            }

            let page: ListModelsPage = response.json().await.map_err(|e| {
                CatalogError::AuthOrNetwork(format!("Malformed model list: {}", e))
            })?;

            entries.extend(page.models.into_iter().map(CatalogEntry::from));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(entries)
    }
}

#[async_trait]
impl ModelCatalog for GeminiCatalog {
    async fn fetch_models(
        &self,
        credential: &Credential,
    ) -> Result<Vec<ModelDescriptor>, CatalogError> {
        let start = std::time::Instant::now();
        log::info!(
            "[CATALOG] Listing models (key: {} chars)",
            credential.expose().len()
        );

        let entries = self.list_all(credential).await?;
        let total = entries.len();
        let ranked = models::filter_and_rank(entries);

        log::info!(
            "[CATALOG] {} of {} models offered in {}ms",
            ranked.len(),
            total,
            start.elapsed().as_millis()
        );

        if ranked.is_empty() {
            return Err(CatalogError::NoCompatibleModels);
        }
        Ok(ranked)
    }
}
