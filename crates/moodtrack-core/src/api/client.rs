//! API client for communicating with the moodtrack REST API.
//!
//! This module provides the `ApiClient` struct plus one borrowed handle per
//! endpoint group (`auth`, `moods`, `doctor`, `health`). Each operation is a
//! single request/response pass-through: no validation, retries, batching or
//! caching happen here.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{KeyValueStore, TOKEN_KEY};
use crate::models::{
    HealthResponse, LoginRequest, LoginResponse, MessageResponse, MoodConfigResponse,
    MoodResponse, MoodsResponse, PatientMoodsResponse, PatientsResponse, ProfileResponse,
    RateRequest,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default root for every endpoint
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build the authorization headers for a request.
///
/// A missing or empty token yields an empty map, so no `Authorization`
/// header is sent at all.
pub fn bearer_headers(token: Option<&str>) -> Result<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))
                .context("Persisted token is not a valid header value")?,
        );
    }
    Ok(headers)
}

/// API client for the moodtrack backend.
/// Clone is cheap - reqwest::Client and the store are both reference counted.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    /// Create a client rooted at `base_url` that reads its bearer token from `store`
    pub fn new(base_url: &str, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        default_headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(default_headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { api: self }
    }

    pub fn moods(&self) -> MoodsApi<'_> {
        MoodsApi { api: self }
    }

    pub fn doctor(&self) -> DoctorApi<'_> {
        DoctorApi { api: self }
    }

    pub fn health(&self) -> HealthApi<'_> {
        HealthApi { api: self }
    }

    /// Resolve an endpoint below the base URL. Each segment is percent-encoded
    /// on its own, so a `/` or `?` inside an id can never leave its segment.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ApiError::InvalidPathSegment(bad.to_string()).into());
        }

        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API base URL cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request carrying whatever token is persisted right now.
    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self
            .store
            .get(TOKEN_KEY)
            .context("Failed to read persisted token")?;
        Ok(self
            .client
            .request(method, url)
            .headers(bearer_headers(token.as_deref())?))
    }

    /// Map a non-success status to an `ApiError`.
    /// A 401 evicts the persisted token (never the user) before the error is returned.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            warn!("Received 401, evicting persisted token");
            if let Err(e) = self.store.remove(TOKEN_KEY) {
                warn!(error = %e, "Failed to evict persisted token");
            }
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body).into())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> Result<T> {
        let url = self.url(segments)?;
        let path = url.path().to_string();
        let mut request = self.request(method.clone(), url)?;
        if let Some(ref body) = body {
            request = request.json(body);
        }

        debug!(%method, path = %path, "API request");
        let response = request
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send {} request to {}", method, path))?;
        debug!(%method, path = %path, status = %response.status(), "API response");

        let response = self.check_response(response).await?;

        let text = response
            .text()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to read response body from {}", path))?;

        // A success with no body (e.g. 204) reads as an empty object
        let parsed = if text.trim().is_empty() {
            serde_json::from_value(Value::Object(serde_json::Map::new()))
        } else {
            serde_json::from_str(&text)
        };
        parsed.map_err(|e| {
            anyhow::Error::from(ApiError::InvalidResponse(format!("{} {}: {}", method, path, e)))
        })
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.send(Method::GET, segments, None).await
    }

    async fn post<T: DeserializeOwned>(&self, segments: &[&str], body: Option<Value>) -> Result<T> {
        self.send(Method::POST, segments, body).await
    }

    async fn put<T: DeserializeOwned>(&self, segments: &[&str], body: Option<Value>) -> Result<T> {
        self.send(Method::PUT, segments, body).await
    }

    async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.send(Method::DELETE, segments, None).await
    }
}

// ============================================================================
// Endpoint groups
// ============================================================================

pub struct AuthApi<'a> {
    api: &'a ApiClient,
}

impl AuthApi<'_> {
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = serde_json::to_value(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        self.api.post(&["auth", "login"], Some(body)).await
    }

    pub async fn get_profile(&self) -> Result<ProfileResponse> {
        self.api.get(&["auth", "profile"]).await
    }
}

pub struct MoodsApi<'a> {
    api: &'a ApiClient,
}

impl MoodsApi<'_> {
    pub async fn get_config(&self) -> Result<MoodConfigResponse> {
        self.api.get(&["moods", "config"]).await
    }

    pub async fn get_all(&self) -> Result<MoodsResponse> {
        self.api.get(&["moods"]).await
    }

    /// Record today's mood
    pub async fn add(&self, rate: u8) -> Result<MoodResponse> {
        let body = serde_json::to_value(RateRequest { rate })?;
        self.api.post(&["moods"], Some(body)).await
    }

    /// Replace today's mood
    pub async fn update(&self, rate: u8) -> Result<MoodResponse> {
        let body = serde_json::to_value(RateRequest { rate })?;
        self.api.put(&["moods"], Some(body)).await
    }

    /// Delete today's mood
    pub async fn remove(&self) -> Result<MessageResponse> {
        self.api.delete(&["moods"]).await
    }
}

pub struct DoctorApi<'a> {
    api: &'a ApiClient,
}

impl DoctorApi<'_> {
    pub async fn get_patients(&self) -> Result<PatientsResponse> {
        self.api.get(&["doctor", "patients"]).await
    }

    pub async fn assign_patient(&self, patient_id: &str) -> Result<MessageResponse> {
        self.api
            .post(&["doctor", "patients", patient_id, "assign"], None)
            .await
    }

    pub async fn unassign_patient(&self, patient_id: &str) -> Result<MessageResponse> {
        self.api
            .delete(&["doctor", "patients", patient_id, "assign"])
            .await
    }

    pub async fn get_patient_moods(&self, patient_id: &str) -> Result<PatientMoodsResponse> {
        self.api
            .get(&["doctor", "patients", patient_id, "moods"])
            .await
    }
}

pub struct HealthApi<'a> {
    api: &'a ApiClient,
}

impl HealthApi<'_> {
    pub async fn check(&self) -> Result<HealthResponse> {
        self.api.get(&["health"]).await
    }
}
