use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use cached::{Cached, TimedCache};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::ApiError;
use crate::config::{ApiConfig, CacheConfig};
use crate::models::Project;
use crate::token::Credential;
use crate::utils::log_throttle::{recover, should_emit};

const NETWORK_FAILURE_LOG_WINDOW: Duration = Duration::from_secs(30);

/// Thin typed wrapper over the backend's REST endpoints.
///
/// The client never touches the session itself: callers pass the
/// credential of the request explicitly.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    project_cache: Mutex<TimedCache<String, Project>>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, cache: &CacheConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_in_ms))
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;

        info!(
            "Creating API client for '{}' (timeout {} ms)",
            config.base_url, config.timeout_in_ms
        );
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            project_cache: Mutex::new(TimedCache::with_lifespan(cache.project_ttl_seconds)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        credential: Option<&Credential>,
    ) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match credential {
            Some(credential) => builder.bearer_auth(credential.as_str()),
            None => builder,
        }
    }

    /// Send a request; any non-2xx status becomes an [`ApiError`].
    pub(crate) async fn execute(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.network_failure(endpoint, e))?;

        if let Some(suppressed_count) = recover(&network_failure_key(endpoint)) {
            info!(
                event_name = "api.network_recovered",
                event_domain = "api",
                endpoint,
                suppressed_count,
                "Backend reachable again"
            );
        }

        let status = response.status();
        if status.is_success() {
            debug!(endpoint, status = status.as_u16(), "API call succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        debug!(
            event_name = "api.request.rejected",
            event_domain = "api",
            endpoint,
            status = status.as_u16(),
            "Backend rejected request: {}",
            message
        );
        Err(ApiError::from_status(status.as_u16(), message))
    }

    /// [`execute`](Self::execute), then decode the JSON body.
    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> Result<T, ApiError> {
        let response = self.execute(request, endpoint).await?;
        let body = response
            .text()
            .await
            .map_err(|e| self.network_failure(endpoint, e))?;
        serde_json::from_str(&body)
            .map_err(|e| ApiError::Decode(format!("{}: {}", endpoint, e)))
    }

    fn network_failure(&self, endpoint: &str, error: reqwest::Error) -> ApiError {
        let key = network_failure_key(endpoint);
        if let Some(suppressed_count) = should_emit(&key, NETWORK_FAILURE_LOG_WINDOW) {
            warn!(
                event_name = "api.network_failure",
                event_domain = "api",
                endpoint,
                timeout = error.is_timeout(),
                suppressed_count,
                "Request to backend failed: {}",
                error
            );
        }
        ApiError::Network(error.to_string())
    }

    fn cache(&self) -> MutexGuard<'_, TimedCache<String, Project>> {
        self.project_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn cached_project(&self, id: &str) -> Option<Project> {
        self.cache().cache_get(id).cloned()
    }

    pub(crate) fn remember_project(&self, project: &Project) {
        self.cache().cache_set(project.id.clone(), project.clone());
    }

    pub(crate) fn forget_project(&self, id: &str) {
        self.cache().cache_remove(id);
    }

    /// Drop every cached project, e.g. when the session changes hands.
    pub fn clear_cache(&self) {
        self.cache().cache_clear();
    }
}

fn network_failure_key(endpoint: &str) -> String {
    format!("api.network_failure.{}", endpoint)
}

/// The backend reports failures as `{"error": ..}`, `{"message": ..}`, or
/// `{"msg": ..}` for its JWT layer. Anything else is passed through raw.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => ["error", "message", "msg"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_default(),
        _ => body.trim().to_string(),
    }
}
