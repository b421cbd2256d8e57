//! Integration tests for Aqua Rewards.
//!
//! Tests run the real client against [`FakeBackend`], an in-process `axum`
//! server implementing the settings endpoints over an in-memory bundle.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p aqua-rewards-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `settings_repository` - HTTP repository, caching and error mapping
//! - `settings_editor` - Draft saves through the backend
//! - `overview_polling` - Background refresh of the overview
//! - `rules_scenarios` - Bundle files and end-to-end rule calculations

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use aqua_rewards_client::{
    ApiError, CashbackOverview, ClientConfig, ConfigError, HttpSettingsRepository,
};
use aqua_rewards_core::{CashbackSettings, CommissionSettings, RulesBundle, TierTable};
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, RETRY_AFTER};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Token accepted by [`FakeBackend`].
pub const TEST_TOKEN: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

/// A response the backend returns once instead of handling the next request.
#[derive(Debug, Clone)]
pub struct Failure {
    pub status: StatusCode,
    pub retry_after: Option<u64>,
    pub body: String,
}

impl Failure {
    #[must_use]
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            retry_after: None,
            body: status.canonical_reason().unwrap_or("error").to_string(),
        }
    }

    #[must_use]
    pub const fn retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        if let Some(seconds) = self.retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

#[derive(Debug, Default)]
struct BackendState {
    bundle: RulesBundle,
    overview: CashbackOverview,
    reads: usize,
    writes: usize,
    last_write: Option<Value>,
    failure: Option<Failure>,
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process settings backend.
///
/// Serves the API under `/api/`, requires `Bearer TEST_TOKEN`, and counts
/// reads and writes. Saved tier tables come back sorted by tier, standing in
/// for the canonical copy a real backend returns.
#[derive(Debug)]
pub struct FakeBackend {
    state: Shared,
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl FakeBackend {
    /// Start a backend holding the standard rules.
    ///
    /// # Errors
    ///
    /// Returns error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        Self::with_bundle(RulesBundle::standard()).await
    }

    /// Start a backend holding `bundle`.
    ///
    /// # Errors
    ///
    /// Returns error if no local port can be bound.
    pub async fn with_bundle(bundle: RulesBundle) -> std::io::Result<Self> {
        let state: Shared = Arc::new(Mutex::new(BackendState {
            bundle,
            ..BackendState::default()
        }));

        let api = Router::new()
            .route(
                "/tier-requirements",
                get(get_tier_requirements).put(save_tier_requirements),
            )
            .route(
                "/commission-settings",
                get(get_commission_settings).post(save_commission_settings),
            )
            .route(
                "/cashback-settings",
                get(get_cashback_settings).put(save_cashback_settings),
            )
            .route("/cashback/stats/overview", get(get_overview))
            .layer(middleware::from_fn(require_token))
            .with_state(Arc::clone(&state));

        let app = Router::new().nest("/api", api);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { state, addr, task })
    }

    /// API base URL, e.g. `http://127.0.0.1:PORT/api`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client configuration pointing at this backend.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is rejected.
    pub fn config(&self) -> Result<ClientConfig, ConfigError> {
        ClientConfig::new(&self.base_url(), SecretString::from(TEST_TOKEN.to_string()))
    }

    /// Repository pointing at this backend.
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be built.
    pub fn repository(&self) -> Result<HttpSettingsRepository, ApiError> {
        let config = self
            .config()
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        HttpSettingsRepository::new(&config)
    }

    /// Rules currently stored.
    #[must_use]
    pub fn bundle(&self) -> RulesBundle {
        lock(&self.state).bundle.clone()
    }

    /// Replace the stored rules, as another admin would.
    pub fn set_bundle(&self, bundle: RulesBundle) {
        lock(&self.state).bundle = bundle;
    }

    pub fn set_overview(&self, overview: CashbackOverview) {
        lock(&self.state).overview = overview;
    }

    /// Fail the next request with `failure`.
    pub fn fail_next(&self, failure: Failure) {
        lock(&self.state).failure = Some(failure);
    }

    /// Number of authorized GET requests.
    #[must_use]
    pub fn reads(&self) -> usize {
        lock(&self.state).reads
    }

    /// Number of authorized PUT/POST requests.
    #[must_use]
    pub fn writes(&self) -> usize {
        lock(&self.state).writes
    }

    /// Raw JSON body of the most recent write.
    #[must_use]
    pub fn last_write(&self) -> Option<Value> {
        lock(&self.state).last_write.clone()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn require_token(request: Request, next: Next) -> Response {
    let expected = format!("Bearer {TEST_TOKEN}");
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());

    if authorized {
        next.run(request).await
    } else {
        (StatusCode::UNAUTHORIZED, "invalid token").into_response()
    }
}

/// Count a read and return the pending failure, if any.
fn read<T: serde::Serialize>(state: &Shared, f: impl FnOnce(&BackendState) -> T) -> Response {
    let mut guard = lock(state);
    guard.reads += 1;
    if let Some(failure) = guard.failure.take() {
        return failure.into_response();
    }
    Json(f(&guard)).into_response()
}

/// Count a write, decode the body and apply it.
fn write<T, R>(state: &Shared, body: Value, f: impl FnOnce(&mut BackendState, T) -> R) -> Response
where
    T: serde::de::DeserializeOwned,
    R: serde::Serialize,
{
    let mut guard = lock(state);
    guard.writes += 1;
    guard.last_write = Some(body.clone());
    if let Some(failure) = guard.failure.take() {
        return failure.into_response();
    }

    match serde_json::from_value::<T>(body) {
        Ok(value) => Json(f(&mut guard, value)).into_response(),
        Err(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response(),
    }
}

async fn get_tier_requirements(State(state): State<Shared>) -> Response {
    read(&state, |s| s.bundle.tier_requirements.clone())
}

async fn save_tier_requirements(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    write(&state, body, |s, mut table: TierTable| {
        table.thresholds_mut().sort_by_key(|t| t.tier);
        s.bundle.tier_requirements = table.clone();
        table
    })
}

async fn get_commission_settings(State(state): State<Shared>) -> Response {
    read(&state, |s| s.bundle.commission.clone())
}

async fn save_commission_settings(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Response {
    write(&state, body, |s, settings: CommissionSettings| {
        s.bundle.commission = settings.clone();
        settings
    })
}

async fn get_cashback_settings(State(state): State<Shared>) -> Response {
    read(&state, |s| s.bundle.cashback.clone())
}

async fn save_cashback_settings(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    write(&state, body, |s, settings: CashbackSettings| {
        s.bundle.cashback = settings.clone();
        settings
    })
}

async fn get_overview(State(state): State<Shared>) -> Response {
    read(&state, |s| s.overview.clone())
}
