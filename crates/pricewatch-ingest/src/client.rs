//! HTTP client for the comparison site's merchant ranking API.
//!
//! Authentication is a two-step dance: exchange the merchant id and key for a
//! short-lived token at `TemporaryToken`, then pass that token to
//! `OffersRanking`. Both calls go through [`retry_with_backoff`].

use std::fmt;
use std::time::Duration;

use pricewatch_core::AppConfig;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::adapter::RawItem;
use crate::error::IngestError;
use crate::retry::retry_with_backoff;
use crate::types::TokenResponse;

const DEFAULT_TOKEN_TIMEOUT_SECS: u64 = 10;

/// Client for the `TemporaryToken` and `OffersRanking` endpoints.
///
/// Use [`RankingClient::from_config`] in the CLI or
/// [`RankingClient::with_base_url`] to point at a mock server in tests.
pub struct RankingClient {
    client: Client,
    base_url: Url,
    merchant_id: String,
    merchant_key: String,
    token_timeout: Duration,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl fmt::Debug for RankingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankingClient")
            .field("base_url", &self.base_url.as_str())
            .field("merchant_id", &self.merchant_id)
            .field("merchant_key", &"[redacted]")
            .field("token_timeout", &self.token_timeout)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_secs", &self.backoff_base_secs)
            .finish_non_exhaustive()
    }
}

impl RankingClient {
    /// Builds a client from application config.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::MissingCredential`] when the merchant id or key
    /// is not configured, plus any error from [`RankingClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, IngestError> {
        let merchant_id = config
            .merchant_id
            .as_deref()
            .ok_or(IngestError::MissingCredential("PRICEWATCH_MERCHANT_ID"))?;
        let merchant_key = config
            .merchant_key
            .as_deref()
            .ok_or(IngestError::MissingCredential("PRICEWATCH_MERCHANT_KEY"))?;

        Ok(Self::with_base_url(
            merchant_id,
            merchant_key,
            &config.ranking_base_url,
            config.request_timeout_secs,
        )?
        .with_token_timeout(config.token_timeout_secs)
        .with_retry(config.max_retries, config.retry_backoff_base_secs))
    }

    /// Creates a client against `base_url` with no retries.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`IngestError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        merchant_id: &str,
        merchant_key: &str,
        base_url: &str,
        request_timeout_secs: u64,
    ) -> Result<Self, IngestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pricewatch/0.1 (price-monitoring)")
            .build()?;

        // Exactly one trailing slash, so joining an endpoint appends a path
        // segment instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| IngestError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
            merchant_id: merchant_id.to_owned(),
            merchant_key: merchant_key.to_owned(),
            token_timeout: Duration::from_secs(DEFAULT_TOKEN_TIMEOUT_SECS),
            max_retries: 0,
            backoff_base_secs: 0,
        })
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_secs: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_secs = backoff_base_secs;
        self
    }

    #[must_use]
    pub fn with_token_timeout(mut self, secs: u64) -> Self {
        self.token_timeout = Duration::from_secs(secs);
        self
    }

    /// Exchanges the merchant credentials for a temporary token.
    ///
    /// # Errors
    ///
    /// - [`IngestError::Auth`] if the API refuses the credentials or returns
    ///   an empty token.
    /// - [`IngestError::Http`], [`IngestError::RateLimited`] or
    ///   [`IngestError::UnexpectedStatus`] once retries are exhausted.
    /// - [`IngestError::Deserialize`] if the body is not the expected shape.
    pub async fn temporary_token(&self) -> Result<String, IngestError> {
        let url = self.endpoint_url(
            "TemporaryToken",
            &[
                ("merchantid", self.merchant_id.as_str()),
                ("merchantkey", self.merchant_key.as_str()),
            ],
        )?;

        let body = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            self.get_json(&url, Some(self.token_timeout), "TemporaryToken")
        })
        .await?;

        let response: TokenResponse =
            serde_json::from_value(body).map_err(|e| IngestError::Deserialize {
                context: "TemporaryToken".to_owned(),
                source: e,
            })?;

        match response.token {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(IngestError::Auth("empty token in response".to_owned())),
        }
    }

    /// Fetches the merchant's offers ranking as raw feed items.
    ///
    /// Entries that are not JSON objects are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Any error from [`RankingClient::temporary_token`], the same transport
    /// errors for the ranking call, and [`IngestError::Deserialize`] if the
    /// body is not a JSON array.
    pub async fn offers_ranking(&self) -> Result<Vec<RawItem>, IngestError> {
        let token = self.temporary_token().await?;
        let url = self.endpoint_url(
            "OffersRanking",
            &[
                ("merchantid", self.merchant_id.as_str()),
                ("token", token.as_str()),
                ("format", "json"),
            ],
        )?;

        let body = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            self.get_json(&url, None, "OffersRanking")
        })
        .await?;

        let entries: Vec<Value> =
            serde_json::from_value(body).map_err(|e| IngestError::Deserialize {
                context: "OffersRanking".to_owned(),
                source: e,
            })?;

        let total = entries.len();
        let items: Vec<RawItem> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(idx, entry)| match entry {
                Value::Object(map) => Some(map),
                other => {
                    tracing::warn!(index = idx, value = %other, "skipping non-object ranking entry");
                    None
                }
            })
            .collect();

        tracing::info!(received = total, kept = items.len(), "fetched offers ranking");
        Ok(items)
    }

    fn endpoint_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, IngestError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| IngestError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET, maps error statuses, and parses the body as JSON.
    ///
    /// `context` names the endpoint in errors so the credential-bearing query
    /// string never reaches a log line.
    async fn get_json(
        &self,
        url: &Url,
        timeout: Option<Duration>,
        context: &str,
    ) -> Result<Value, IngestError> {
        let mut request = self.client.get(url.clone());
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0);
            return Err(IngestError::RateLimited { retry_after_secs });
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(IngestError::Auth(format!("{context} returned {status}")));
        }
        if !status.is_success() {
            return Err(IngestError::UnexpectedStatus {
                status: status.as_u16(),
                url: context.to_owned(),
            });
        }

        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        serde_json::from_str(&body).map_err(|e| IngestError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}
