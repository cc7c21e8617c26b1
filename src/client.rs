//! Main Kiln client with builder pattern.
//!
//! Provides the primary interface for connecting to a Kiln training server
//! and reaching the job-control API.

use crate::{
    auth::{ArcDynAuthProvider, AuthProvider, ResolvedAuth},
    cache::CacheStore,
    error::{KilnLinkError, Result},
    jobs::JobsApi,
    models::{HealthCheckResponse, LoginRequest, LoginResponse},
    mutation::MutationRunner,
    query::QueryRunner,
    timeouts::KilnLinkTimeouts,
    transport::{ApiRequest, ApiTransport, HttpTransport},
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

/// Main Kiln client.
///
/// Use [`KilnLinkClientBuilder`] to construct instances with custom
/// configuration. The client owns the cache for its session; everything
/// reached through [`jobs`](Self::jobs) shares it.
///
/// # Examples
///
/// ```rust,no_run
/// use kiln_link::KilnLinkClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = KilnLinkClient::builder()
///     .base_url("http://localhost:8000")
///     .timeout(std::time::Duration::from_secs(30))
///     .build()?;
///
/// let jobs = client.jobs().list().await?;
/// println!("{} jobs", jobs.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct KilnLinkClient {
    base_url: String,
    transport: Arc<dyn ApiTransport>,
    cache: CacheStore,
    query_runner: QueryRunner,
    jobs: JobsApi,
    health_cache: Arc<Mutex<HealthCheckCache>>,
    timeouts: KilnLinkTimeouts,
}

impl KilnLinkClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> KilnLinkClientBuilder {
        KilnLinkClientBuilder::new()
    }

    /// Training-job operations bound to this client's cache.
    pub fn jobs(&self) -> &JobsApi {
        &self.jobs
    }

    /// The session cache. Subscribe here for raw change notifications.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// The query runner, for custom keys and fetch functions beyond the
    /// built-in job operations.
    pub fn query_runner(&self) -> &QueryRunner {
        &self.query_runner
    }

    /// Get the configured timeouts
    pub fn timeouts(&self) -> &KilnLinkTimeouts {
        &self.timeouts
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check server health and get server information
    ///
    /// Responses are cached for a short TTL so dashboards can call this
    /// freely without hammering the endpoint.
    pub async fn health_check(&self) -> Result<HealthCheckResponse> {
        {
            let cache = self.health_cache.lock().await;
            if let (Some(last_check), Some(response)) =
                (cache.last_check, cache.last_response.clone())
            {
                if last_check.elapsed() < HEALTH_CHECK_TTL {
                    log::debug!(
                        "[HEALTH_CHECK] Returning cached response (age: {:?})",
                        last_check.elapsed()
                    );
                    return Ok(response);
                }
            }
        }

        log::debug!("[HEALTH_CHECK] Fetching from {}/health", self.base_url);
        let start = Instant::now();
        let value = self.transport.execute(ApiRequest::get("/health")).await?;
        let health_response: HealthCheckResponse = serde_json::from_value(value)?;
        log::debug!(
            "[HEALTH_CHECK] Response received in {:?}, status={}",
            start.elapsed(),
            health_response.status
        );

        let mut cache = self.health_cache.lock().await;
        cache.last_check = Some(Instant::now());
        cache.last_response = Some(health_response.clone());

        Ok(health_response)
    }

    /// Login with username and password to obtain a JWT token
    ///
    /// Authenticates with the server and returns a JWT access token for
    /// subsequent API calls via `AuthProvider::jwt_token()`.
    ///
    /// # Example
    /// ```rust,no_run
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// use kiln_link::{KilnLinkClient, AuthProvider};
    ///
    /// // Create a client without authentication to perform login
    /// let client = KilnLinkClient::builder()
    ///     .base_url("http://localhost:8000")
    ///     .build()?;
    ///
    /// // Login to get a JWT token
    /// let login_response = client.login("alice", "secret123").await?;
    ///
    /// // Create a new client with the JWT token for subsequent calls
    /// let authenticated_client = KilnLinkClient::builder()
    ///     .base_url("http://localhost:8000")
    ///     .auth(AuthProvider::jwt_token(login_response.access_token))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        log::debug!("[LOGIN] Authenticating user '{}'", username);
        let login_request = LoginRequest::new(username, password);
        let body = serde_json::to_value(&login_request)?;

        let start = Instant::now();
        let result = self
            .transport
            .execute(ApiRequest::post("/auth/login").with_body(body))
            .await;

        match result {
            Ok(value) => {
                let login_response: LoginResponse = serde_json::from_value(value)?;
                log::debug!(
                    "[LOGIN] Successfully authenticated user '{}' in {:?}",
                    username,
                    start.elapsed()
                );
                Ok(login_response)
            }
            Err(KilnLinkError::ServerError {
                status_code,
                message,
            }) => {
                log::debug!("[LOGIN] Login failed: {}", message);
                Err(KilnLinkError::AuthenticationError(format!(
                    "Login failed ({}): {}",
                    status_code, message
                )))
            }
            Err(error) => Err(error),
        }
    }
}

/// Builder for configuring [`KilnLinkClient`] instances.
pub struct KilnLinkClientBuilder {
    base_url: Option<String>,
    auth: ResolvedAuth,
    timeouts: KilnLinkTimeouts,
    transport: Option<Arc<dyn ApiTransport>>,
}

impl KilnLinkClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            auth: ResolvedAuth::default(),
            timeouts: KilnLinkTimeouts::default(),
            transport: None,
        }
    }

    /// Set the base URL for the Kiln server
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set request timeout (for HTTP requests)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request_timeout = timeout;
        self
    }

    /// Set JWT token authentication
    pub fn jwt_token(mut self, token: impl Into<String>) -> Self {
        self.auth = ResolvedAuth::Static(AuthProvider::jwt_token(token.into()));
        self
    }

    /// Set authentication provider directly
    ///
    /// Allows setting any AuthProvider variant including BasicAuth.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use kiln_link::{KilnLinkClient, AuthProvider};
    ///
    /// # async fn example() -> kiln_link::Result<()> {
    /// let client = KilnLinkClient::builder()
    ///     .base_url("http://localhost:8000")
    ///     .auth(AuthProvider::basic_auth("alice".to_string(), "secret".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn auth(mut self, auth: AuthProvider) -> Self {
        self.auth = ResolvedAuth::Static(auth);
        self
    }

    /// Set an async authentication provider, resolved before every request.
    ///
    /// Use this for token flows where credentials expire and must be
    /// refreshed from an external source.
    pub fn auth_provider(mut self, provider: ArcDynAuthProvider) -> Self {
        self.auth = ResolvedAuth::Dynamic(provider);
        self
    }

    /// Set comprehensive timeout configuration for all operations
    ///
    /// This overrides individual timeout settings like `timeout()`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use kiln_link::{KilnLinkClient, KilnLinkTimeouts};
    ///
    /// # async fn example() -> kiln_link::Result<()> {
    /// let client = KilnLinkClient::builder()
    ///     .base_url("http://localhost:8000")
    ///     .timeouts(KilnLinkTimeouts::fast())
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn timeouts(mut self, timeouts: KilnLinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Replace the HTTP transport.
    ///
    /// Mainly for tests, which substitute a scripted transport so the whole
    /// client stack runs against canned responses without a server.
    pub fn transport(mut self, transport: Arc<dyn ApiTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<KilnLinkClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| KilnLinkError::ConfigurationError("base_url is required".into()))?;

        let parsed = url::Url::parse(&base_url)
            .map_err(|e| KilnLinkError::ConfigurationError(format!("Invalid base_url: {}", e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(KilnLinkError::ConfigurationError(format!(
                "base_url must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        // Request paths are appended verbatim, so the base must not end in '/'
        let base_url = base_url.trim_end_matches('/').to_string();

        let transport: Arc<dyn ApiTransport> = match self.transport {
            Some(transport) => transport,
            None => {
                // Keep-alive connections reduce TCP handshake overhead on
                // poll-heavy workloads
                let http_client = reqwest::Client::builder()
                    .connect_timeout(self.timeouts.connection_timeout)
                    .pool_max_idle_per_host(10)
                    .pool_idle_timeout(Duration::from_secs(90))
                    .build()
                    .map_err(|e| KilnLinkError::ConfigurationError(e.to_string()))?;

                Arc::new(HttpTransport::new(
                    base_url.clone(),
                    http_client,
                    self.auth.clone(),
                    self.timeouts.clone(),
                ))
            }
        };

        let cache = CacheStore::new();
        let query_runner = QueryRunner::new(cache.clone());
        let mutations = MutationRunner::new(cache.clone());
        let jobs = JobsApi::new(Arc::clone(&transport), query_runner.clone(), mutations);

        Ok(KilnLinkClient {
            base_url,
            transport,
            cache,
            query_runner,
            jobs,
            health_cache: Arc::new(Mutex::new(HealthCheckCache::default())),
            timeouts: self.timeouts,
        })
    }
}

const HEALTH_CHECK_TTL: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
struct HealthCheckCache {
    last_check: Option<Instant>,
    last_response: Option<HealthCheckResponse>,
}
