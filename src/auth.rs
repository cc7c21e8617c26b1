//! Authentication provider for the Kiln client.
//!
//! Handles JWT tokens, HTTP Basic Auth, and async dynamic auth providers.
//!
//! ## Dynamic Auth Provider
//!
//! Use [`DynamicAuthProvider`] to supply credentials lazily, resolved before
//! every request. This is the right choice for:
//! - OAuth / OIDC token flows where tokens expire
//! - Credentials fetched from secure storage (e.g. keychain, secret manager)
//! - Automatic refresh-token rotation
//!
//! ```rust,no_run
//! use kiln_link::{AuthProvider, DynamicAuthProvider};
//! use std::sync::Arc;
//!
//! struct MyTokenStore { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl DynamicAuthProvider for MyTokenStore {
//!     async fn get_auth(&self) -> kiln_link::Result<AuthProvider> {
//!         // fetch / refresh token here
//!         Ok(AuthProvider::jwt_token("fresh-token".into()))
//!     }
//! }
//!
//! // Wrap in Arc and pass to the builder:
//! // .auth_provider(Arc::new(MyTokenStore { ... }))
//! ```

use crate::error::Result;
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

/// Authentication credentials for the Kiln server.
///
/// Supports JWT tokens and HTTP Basic Auth.
/// The auth provider automatically attaches the appropriate Authorization header.
///
/// # Examples
///
/// ```rust
/// use kiln_link::AuthProvider;
///
/// // HTTP Basic Auth
/// let auth = AuthProvider::basic_auth("username".to_string(), "password".to_string());
///
/// // JWT token authentication (recommended; what /auth/login returns)
/// let auth = AuthProvider::jwt_token("eyJhbGc...".to_string());
///
/// // No authentication (local development)
/// let auth = AuthProvider::none();
/// ```
#[derive(Debug, Clone)]
pub enum AuthProvider {
    /// HTTP Basic Auth (username, password)
    BasicAuth(String, String),

    /// JWT token authentication
    JwtToken(String),

    /// No authentication (local development)
    None,
}

impl AuthProvider {
    /// Create HTTP Basic Auth
    ///
    /// Encodes username:password as base64 for Authorization: Basic header
    /// following RFC 7617.
    pub fn basic_auth(username: String, password: String) -> Self {
        Self::BasicAuth(username, password)
    }

    /// Create JWT token authentication
    pub fn jwt_token(token: String) -> Self {
        Self::JwtToken(token)
    }

    /// No authentication (for local development)
    pub fn none() -> Self {
        Self::None
    }

    /// Attach authentication headers to an HTTP request builder
    ///
    /// Applies the appropriate Authorization header based on the auth method:
    /// - BasicAuth: `Authorization: Basic <base64(username:password)>`
    /// - JwtToken: `Authorization: Bearer <token>`
    /// - None: No headers
    pub fn apply_to_request(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder> {
        match self {
            Self::BasicAuth(username, password) => {
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                Ok(request.header("Authorization", format!("Basic {}", encoded)))
            },
            Self::JwtToken(token) => Ok(request.bearer_auth(token)),
            Self::None => Ok(request),
        }
    }

    /// Check if authentication is configured
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

// ── Dynamic (async) auth provider ────────────────────────────────────────────

/// Async authentication provider resolved before every request.
///
/// Implement this trait to supply credentials lazily from any source:
/// OAuth token refresh, secure storage, interactive login, etc.
#[async_trait::async_trait]
pub trait DynamicAuthProvider: Send + Sync + 'static {
    /// Return the current (or freshly refreshed) credentials.
    async fn get_auth(&self) -> Result<AuthProvider>;
}

/// A boxed, reference-counted [`DynamicAuthProvider`].
pub type ArcDynAuthProvider = Arc<dyn DynamicAuthProvider>;

/// Resolves the effective [`AuthProvider`] for a request.
///
/// Holds either a static provider or a dynamic one.  Call [`resolve`] before
/// each request to obtain a fresh [`AuthProvider`].
///
/// [`resolve`]: ResolvedAuth::resolve
#[derive(Clone)]
pub enum ResolvedAuth {
    /// Static credentials set at construction time.
    Static(AuthProvider),
    /// Dynamic provider called on every request.
    Dynamic(ArcDynAuthProvider),
}

impl ResolvedAuth {
    /// Obtain effective credentials, calling the dynamic provider if present.
    pub async fn resolve(&self) -> Result<AuthProvider> {
        match self {
            Self::Static(p) => Ok(p.clone()),
            Self::Dynamic(provider) => provider.get_auth().await,
        }
    }

    /// `true` when no credentials of either kind are configured.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::Static(AuthProvider::None))
    }
}

impl std::fmt::Debug for ResolvedAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(p) => write!(f, "ResolvedAuth::Static({:?})", p),
            Self::Dynamic(_) => write!(f, "ResolvedAuth::Dynamic(<fn>)"),
        }
    }
}

impl Default for ResolvedAuth {
    fn default() -> Self {
        Self::Static(AuthProvider::None)
    }
}

impl From<AuthProvider> for ResolvedAuth {
    fn from(p: AuthProvider) -> Self {
        Self::Static(p)
    }
}

impl From<ArcDynAuthProvider> for ResolvedAuth {
    fn from(p: ArcDynAuthProvider) -> Self {
        Self::Dynamic(p)
    }
}
