//! Snyk API client.
//!
//! Low-level HTTP client that handles authentication, URL composition and
//! retries. Resource decoding lives in [`crate::resource`] and
//! [`crate::pagination`]; entity operations live on the model types.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{Result, SnykError};
use crate::models::{GroupsService, OrgsService, UsersService};
use crate::params::QueryParams;
use crate::retry::{self, RetryPolicy, DEFAULT_MAX_RETRIES};

pub const DEFAULT_API_URL: &str = "https://api.snyk.io/";
pub const DEFAULT_API_VERSION: &str = "2023-09-14~beta";
const USER_AGENT: &str = concat!("snykapi/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Snyk API client.
///
/// Handles authentication, retries and raw requests. Entity operations are
/// reached through service handles such as [`SnykClient::orgs`].
///
/// This struct is cheaply cloneable; clones share the connection pool and
/// the retry policy.
///
/// # Example
///
/// ```no_run
/// use snykapi::SnykClient;
///
/// # fn example() -> snykapi::Result<()> {
/// // Create from environment variables
/// let client = SnykClient::from_env()?;
///
/// // Or configure manually
/// let client = SnykClient::builder("your-token")
///     .max_retries(3)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SnykClient {
    http: Client,
    base_url: Arc<Url>,
    token: Arc<str>,
    api_version: Arc<str>,
    retry: Arc<RetryPolicy>,
}

impl std::fmt::Debug for SnykClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnykClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_version", &&*self.api_version)
            .field("max_retries", &self.retry.max_retries())
            .finish_non_exhaustive()
    }
}

/// Builder for configuring a [`SnykClient`].
#[derive(Debug)]
pub struct SnykClientBuilder {
    token: String,
    base_url: String,
    api_version: String,
    max_retries: u32,
    backoff_unit: Duration,
    timeout: Duration,
}

impl SnykClientBuilder {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_unit: Duration::from_secs(1),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the API origin (defaults to `https://api.snyk.io/`).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the default REST API version.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set how many times a 429/500 response is retried.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the length of one backoff unit (one second by default).
    #[must_use]
    pub fn backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<SnykClient> {
        // Ensure base URL ends with /
        let base_url_str = if self.base_url.ends_with('/') {
            self.base_url
        } else {
            format!("{}/", self.base_url)
        };
        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(self.timeout)
            .build()
            .map_err(SnykError::HttpError)?;

        Ok(SnykClient {
            http,
            base_url: Arc::new(base_url),
            token: self.token.into(),
            api_version: self.api_version.into(),
            retry: Arc::new(RetryPolicy::new(self.max_retries, self.backoff_unit)),
        })
    }
}

impl SnykClient {
    /// Create a client from environment variables.
    ///
    /// Uses `SNYK_TOKEN` for authentication, and optionally `SNYK_API_URL`
    /// and `SNYK_API_VERSION`.
    ///
    /// # Errors
    ///
    /// Returns an error if `SNYK_TOKEN` is not set.
    pub fn from_env() -> Result<Self> {
        let token = env::var("SNYK_TOKEN").map_err(|_| {
            SnykError::ConfigMissing("SNYK_TOKEN environment variable not set".to_string())
        })?;

        let mut builder = SnykClientBuilder::new(token);
        if let Ok(url) = env::var("SNYK_API_URL") {
            builder = builder.base_url(url);
        }
        if let Ok(version) = env::var("SNYK_API_VERSION") {
            builder = builder.api_version(version);
        }
        builder.build()
    }

    /// Create a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(token: &str) -> Result<Self> {
        SnykClientBuilder::new(token).build()
    }

    pub fn builder(token: impl Into<String>) -> SnykClientBuilder {
        SnykClientBuilder::new(token)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Default REST API version sent with paginated requests.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn max_retries(&self) -> u32 {
        self.retry.max_retries()
    }

    /// Change how many times a 429/500 response is retried.
    ///
    /// Applies to every clone of this client. Each retry waits `2^i` units
    /// (or `Retry-After + 5` units when the server sends one), so a value of
    /// 6 waits at most 32 seconds before its last attempt.
    pub fn set_max_retries(&self, retries: u32) {
        self.retry.set_max_retries(retries);
    }

    pub fn orgs(&self) -> OrgsService {
        OrgsService::new(self.clone())
    }

    pub fn groups(&self) -> GroupsService {
        GroupsService::new(self.clone())
    }

    /// Users of the given group.
    pub fn users(&self, group_id: &str) -> UsersService {
        UsersService::new(self.clone(), group_id)
    }

    /// Make a GET request.
    pub async fn get(&self, path: &str, params: Option<&QueryParams>) -> Result<Response> {
        self.execute::<()>(Method::GET, path, params, None).await
    }

    /// Make a POST request with an optional JSON body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        params: Option<&QueryParams>,
        body: Option<&B>,
    ) -> Result<Response> {
        self.execute(Method::POST, path, params, body).await
    }

    /// Make a PUT request with a JSON body.
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.execute(Method::PUT, path, None, Some(body)).await
    }

    /// Make a PATCH request with a JSON body.
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        params: Option<&QueryParams>,
        body: &B,
    ) -> Result<Response> {
        self.execute(Method::PATCH, path, params, Some(body)).await
    }

    /// Make a DELETE request.
    pub async fn delete(&self, path: &str, params: Option<&QueryParams>) -> Result<Response> {
        self.execute::<()>(Method::DELETE, path, params, None).await
    }

    /// Send a request and fail on any status >= 400 left after retries.
    ///
    /// # Errors
    ///
    /// Returns [`SnykError::ApiError`] with the raw response body for error
    /// statuses, or the error from [`send`](Self::send).
    pub async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        params: Option<&QueryParams>,
        body: Option<&B>,
    ) -> Result<Response> {
        let response = self.send(method, path, params, body).await?;
        Self::check_response(response).await
    }

    /// Send a request, retrying rate-limited and failing responses.
    ///
    /// 429 and 500 responses are retried up to [`max_retries`](Self::max_retries)
    /// times. A 502 is retried once more after a fixed wait. Once the retry
    /// budget is spent the last response is returned as-is, even when its
    /// status is still an error.
    ///
    /// # Errors
    ///
    /// Fails when the URL cannot be composed, the body cannot be serialized
    /// or the request cannot be sent. Error statuses are not errors here.
    #[tracing::instrument(skip(self, params, body), fields(url = tracing::field::Empty))]
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        params: Option<&QueryParams>,
        body: Option<&B>,
    ) -> Result<Response> {
        let mut url = compose_url(&self.base_url, path)?;
        if let Some(params) = params.filter(|p| !p.is_empty()) {
            params.apply_to(&mut url);
        }
        tracing::Span::current().record("url", url.as_str());

        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(SnykError::SerializeError)?;

        let content_type = if is_rest_path(path) {
            JSON_API_CONTENT_TYPE
        } else {
            JSON_CONTENT_TYPE
        };

        let attempt = || {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header(AUTHORIZATION, &*self.token)
                .header(ACCEPT, "*/*")
                .header(CONTENT_TYPE, content_type);
            if let Some(bytes) = &body {
                request = request.body(bytes.clone());
            }
            request.send()
        };

        let mut response = attempt().await?;

        if RetryPolicy::is_retryable(response.status()) {
            let max_retries = self.retry.max_retries();
            for i in 0..max_retries {
                let delay = self.retry.delay(i, retry::retry_after(response.headers()));
                tracing::warn!(
                    status = response.status().as_u16(),
                    attempt = i + 1,
                    max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Retryable response, backing off"
                );
                // Release the connection before waiting.
                drop(response);
                tokio::time::sleep(delay).await;

                response = attempt().await?;
                if !RetryPolicy::is_retryable(response.status()) {
                    break;
                }
            }
        }

        if response.status() == StatusCode::BAD_GATEWAY {
            let delay = self.retry.bad_gateway_delay();
            tracing::warn!(
                delay_ms = delay.as_millis() as u64,
                "Bad gateway, retrying once"
            );
            drop(response);
            tokio::time::sleep(delay).await;
            response = attempt().await?;
        }

        Ok(response)
    }

    /// Read a response body and decode it as JSON.
    pub async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();
        if status.as_u16() < 400 {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => "could not read response body".to_string(),
        };
        tracing::debug!(status = status.as_u16(), %body, "API request failed");

        Err(SnykError::ApiError {
            status_code: status.as_u16(),
            body,
        })
    }
}

/// Whether a path targets the JSON:API family.
fn is_rest_path(path: &str) -> bool {
    let path = path.trim_start_matches('/');
    path == "rest" || path.starts_with("rest/") || path.starts_with("rest?")
}

/// Join `suffix` onto `base`, keeping the suffix's query string.
///
/// The resulting path is the base path followed by the suffix path with
/// empty segments removed. The query string of `base` is discarded and the
/// one from `suffix`, if any, is used verbatim.
///
/// # Errors
///
/// Returns [`SnykError::UrlError`] if `suffix` is not a valid URL reference.
pub fn compose_url(base: &Url, suffix: &str) -> Result<Url> {
    // Resolving against a fixed root yields the suffix's own path and query
    // whether it was given as an absolute URL, a rooted path or a bare path.
    let root = Url::parse("http://compose.invalid/")?;
    let suffix_url = root.join(suffix)?;

    let segments: Vec<&str> = base
        .path()
        .split('/')
        .chain(suffix_url.path().split('/'))
        .filter(|s| !s.is_empty())
        .collect();

    let mut path = format!("/{}", segments.join("/"));
    if suffix_url.path().ends_with('/') && !path.ends_with('/') {
        path.push('/');
    }

    let mut url = base.clone();
    url.set_path(&path);
    url.set_query(suffix_url.query());
    url.set_fragment(None);
    Ok(url)
}
