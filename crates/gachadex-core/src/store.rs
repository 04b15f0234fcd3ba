//! HTTP client for the remote document store.
//!
//! The store serves game records through named stored queries:
//!
//! - `combined-suggest` takes `term` and `per_kind`, returning characters
//!   and weapons in one payload
//! - `character-search` and `weapon-search` take `term` and `limit`,
//!   returning a single-kind array
//!
//! All queries are `GET {endpoint}/v1/data/{dataset}/query/{query-id}`.
//! The client reports transport and decode failures as errors; deciding
//! that a failed fetch degrades to an empty suggestion list is the
//! caller's concern, not the transport's.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::normalize::{RawCharacter, RawWeapon};
use crate::{Error, Result, config::StoreConfig};

/// Character and weapon records returned by the `combined-suggest` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CombinedPayload {
    /// Matching character records, possibly partial.
    #[serde(default)]
    pub characters: Vec<RawCharacter>,
    /// Matching weapon records, possibly partial.
    #[serde(default)]
    pub weapons: Vec<RawWeapon>,
}

impl CombinedPayload {
    /// Total record count across both kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.characters.len() + self.weapons.len()
    }

    /// Whether the payload carries no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.weapons.is_empty()
    }
}

/// HTTP client bound to one store endpoint and dataset.
#[derive(Debug, Clone)]
pub struct StoreClient {
    client: Client,
    endpoint: String,
    dataset: String,
    per_kind_cap: usize,
}

impl StoreClient {
    /// Creates a client for the configured store.
    ///
    /// Honors `request_timeout_secs` when set; the interactive suggest
    /// path leaves it unset so a slow store call is superseded by the
    /// next keystroke rather than cancelled mid-flight.
    pub fn new(config: &StoreConfig, per_kind_cap: usize) -> Result<Self> {
        Self::build(
            config,
            per_kind_cap,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    /// Creates a client with an explicit request timeout (one-shot CLI
    /// commands and tests).
    pub fn with_timeout(
        config: &StoreConfig,
        per_kind_cap: usize,
        timeout: Duration,
    ) -> Result<Self> {
        Self::build(config, per_kind_cap, Some(timeout))
    }

    fn build(config: &StoreConfig, per_kind_cap: usize, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("gachadex/", env!("CARGO_PKG_VERSION")))
            .gzip(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(Error::Network)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            dataset: config.dataset.clone(),
            per_kind_cap,
        })
    }

    /// Runs `combined-suggest` for a search term.
    ///
    /// Both kinds are capped at the configured `per_kind` count server
    /// side; ranking and the caller's display limit are applied after
    /// normalization, not here.
    pub async fn combined_suggest(&self, term: &str) -> Result<CombinedPayload> {
        let url = self.query_url("combined-suggest");
        debug!("combined-suggest term={term:?} via {url}");

        let body = self
            .execute(
                self.client
                    .get(&url)
                    .query(&[("term", term), ("per_kind", &self.per_kind_cap.to_string())]),
                &url,
            )
            .await?;

        Ok(serde_json::from_str(&body)?)
    }

    /// Runs `character-search` for a search term.
    pub async fn search_characters(&self, term: &str, limit: usize) -> Result<Vec<RawCharacter>> {
        let url = self.query_url("character-search");
        debug!("character-search term={term:?} limit={limit} via {url}");

        let body = self
            .execute(
                self.client
                    .get(&url)
                    .query(&[("term", term), ("limit", &limit.to_string())]),
                &url,
            )
            .await?;

        Ok(serde_json::from_str(&body)?)
    }

    /// Runs `weapon-search` for a search term.
    pub async fn search_weapons(&self, term: &str, limit: usize) -> Result<Vec<RawWeapon>> {
        let url = self.query_url("weapon-search");
        debug!("weapon-search term={term:?} limit={limit} via {url}");

        let body = self
            .execute(
                self.client
                    .get(&url)
                    .query(&[("term", term), ("limit", &limit.to_string())]),
                &url,
            )
            .await?;

        Ok(serde_json::from_str(&body)?)
    }

    fn query_url(&self, query_id: &str) -> String {
        format!(
            "{}/v1/data/{}/query/{query_id}",
            self.endpoint, self.dataset
        )
    }

    async fn execute(&self, request: reqwest::RequestBuilder, url: &str) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            if status == StatusCode::NOT_FOUND {
                return Err(Error::NotFound(format!(
                    "Stored query not found at '{url}'. Check the endpoint and dataset settings"
                )));
            }

            match response.error_for_status() {
                Ok(_) => unreachable!("Status should be an error"),
                Err(err) => return Err(Error::Network(err)),
            }
        }

        Ok(response.text().await?)
    }
}
