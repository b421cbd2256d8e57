//! REST implementation of [`SettingsRepository`].
//!
//! Settings documents are cached with `moka` for the configured TTL. A save
//! replaces the cached entry with the canonical copy returned by the backend,
//! so a read after a write never serves the pre-save value.

use std::sync::Arc;

use aqua_rewards_core::{CashbackSettings, CommissionSettings, TierTable};
use moka::future::Cache;
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::ExposeSecret;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, instrument};
use url::Url;

use super::SettingsRepository;
use super::cache::{CacheKey, CacheValue};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::overview::CashbackOverview;

const TIER_REQUIREMENTS_PATH: &str = "tier-requirements";
const COMMISSION_SETTINGS_PATH: &str = "commission-settings";
const CASHBACK_SETTINGS_PATH: &str = "cashback-settings";
const CASHBACK_OVERVIEW_PATH: &str = "cashback/stats/overview";

/// Settings repository backed by the rewards REST API.
#[derive(Clone)]
pub struct HttpSettingsRepository {
    inner: Arc<HttpSettingsRepositoryInner>,
}

struct HttpSettingsRepositoryInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl HttpSettingsRepository {
    /// Create a repository for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();

        let mut auth_value =
            HeaderValue::from_str(&format!("Bearer {}", config.api_token.expose_secret()))
                .map_err(|e| ApiError::Parse(format!("Invalid API token format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(HttpSettingsRepositoryInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop every cached settings document.
    pub fn invalidate(&self) {
        self.inner.cache.invalidate_all();
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| ApiError::Parse(format!("Invalid endpoint {path}: {e}")))
    }

    /// Execute a GET request.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.inner.client.get(url).send().await?;
        handle_response(response).await
    }

    /// Execute a request with a JSON body.
    async fn send<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self
            .inner
            .client
            .request(method, url)
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }

    async fn cached(&self, key: CacheKey) -> Option<CacheValue> {
        let value = self.inner.cache.get(&key).await;
        if value.is_some() {
            debug!(?key, "Cache hit");
        }
        value
    }

    async fn store(&self, key: CacheKey, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }
}

impl SettingsRepository for HttpSettingsRepository {
    #[instrument(skip(self))]
    async fn tier_requirements(&self) -> Result<TierTable, ApiError> {
        if let Some(CacheValue::TierRequirements(table)) =
            self.cached(CacheKey::TierRequirements).await
        {
            return Ok(table);
        }

        let table: TierTable = self.get(TIER_REQUIREMENTS_PATH).await?;
        self.store(
            CacheKey::TierRequirements,
            CacheValue::TierRequirements(table.clone()),
        )
        .await;
        Ok(table)
    }

    #[instrument(skip(self, table), fields(rows = table.thresholds().len()))]
    async fn save_tier_requirements(&self, table: &TierTable) -> Result<TierTable, ApiError> {
        let saved: TierTable = self
            .send(Method::PUT, TIER_REQUIREMENTS_PATH, table)
            .await?;
        self.store(
            CacheKey::TierRequirements,
            CacheValue::TierRequirements(saved.clone()),
        )
        .await;
        info!("Tier requirements saved");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn commission_settings(&self) -> Result<CommissionSettings, ApiError> {
        if let Some(CacheValue::CommissionSettings(settings)) =
            self.cached(CacheKey::CommissionSettings).await
        {
            return Ok(*settings);
        }

        let settings: CommissionSettings = self.get(COMMISSION_SETTINGS_PATH).await?;
        self.store(
            CacheKey::CommissionSettings,
            CacheValue::CommissionSettings(Box::new(settings.clone())),
        )
        .await;
        Ok(settings)
    }

    #[instrument(skip(self, settings))]
    async fn save_commission_settings(
        &self,
        settings: &CommissionSettings,
    ) -> Result<CommissionSettings, ApiError> {
        let saved: CommissionSettings = self
            .send(Method::POST, COMMISSION_SETTINGS_PATH, settings)
            .await?;
        self.store(
            CacheKey::CommissionSettings,
            CacheValue::CommissionSettings(Box::new(saved.clone())),
        )
        .await;
        info!("Commission settings saved");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn cashback_settings(&self) -> Result<CashbackSettings, ApiError> {
        if let Some(CacheValue::CashbackSettings(settings)) =
            self.cached(CacheKey::CashbackSettings).await
        {
            return Ok(*settings);
        }

        let settings: CashbackSettings = self.get(CASHBACK_SETTINGS_PATH).await?;
        self.store(
            CacheKey::CashbackSettings,
            CacheValue::CashbackSettings(Box::new(settings.clone())),
        )
        .await;
        Ok(settings)
    }

    #[instrument(skip(self, settings))]
    async fn save_cashback_settings(
        &self,
        settings: &CashbackSettings,
    ) -> Result<CashbackSettings, ApiError> {
        let saved: CashbackSettings = self
            .send(Method::PUT, CASHBACK_SETTINGS_PATH, settings)
            .await?;
        self.store(
            CacheKey::CashbackSettings,
            CacheValue::CashbackSettings(Box::new(saved.clone())),
        )
        .await;
        info!("Cashback settings saved");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn cashback_overview(&self) -> Result<CashbackOverview, ApiError> {
        self.get(CASHBACK_OVERVIEW_PATH).await
    }
}

/// Handle API response and parse JSON.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        return response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")));
    }

    Err(parse_error(response).await)
}

/// Parse an error response from the backend.
async fn parse_error(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok());

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    tracing::warn!(
        status,
        body = %message.chars().take(200).collect::<String>(),
        "Settings backend returned an error"
    );

    ApiError::from_status(status, message, retry_after)
}

impl std::fmt::Debug for HttpSettingsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSettingsRepository")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
