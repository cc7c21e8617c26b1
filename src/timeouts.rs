//! Timeout configuration for Kiln client operations.
//!
//! Provides centralized timeout management for HTTP requests against the
//! job-control API, including the longer window file uploads need.

use std::time::Duration;

/// Timeout configuration for Kiln client operations.
///
/// All timeout values have sensible defaults if not specified.
///
/// # Examples
///
/// ```rust
/// use kiln_link::KilnLinkTimeouts;
/// use std::time::Duration;
///
/// // Use defaults (recommended for most cases)
/// let timeouts = KilnLinkTimeouts::default();
///
/// // Custom timeouts for high-latency environments
/// let timeouts = KilnLinkTimeouts::builder()
///     .connection_timeout(Duration::from_secs(60))
///     .request_timeout(Duration::from_secs(120))
///     .build();
///
/// // Aggressive timeouts for local development
/// let timeouts = KilnLinkTimeouts::fast();
/// ```
#[derive(Debug, Clone)]
pub struct KilnLinkTimeouts {
    /// Timeout for establishing connections (TCP + TLS handshake).
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Timeout for a complete request/response exchange.
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Timeout for multipart file uploads, which carry larger bodies than
    /// regular API calls.
    /// Default: 120 seconds
    pub upload_timeout: Duration,
}

impl Default for KilnLinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(120),
        }
    }
}

impl KilnLinkTimeouts {
    /// Create a new builder for custom timeout configuration.
    pub fn builder() -> KilnLinkTimeoutsBuilder {
        KilnLinkTimeoutsBuilder::new()
    }

    /// Create timeouts optimized for fast local development.
    ///
    /// Uses shorter timeouts suitable for localhost connections.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
            upload_timeout: Duration::from_secs(30),
        }
    }

    /// Create timeouts optimized for high-latency or unreliable networks.
    ///
    /// Uses longer timeouts suitable for cloud/remote connections.
    pub fn relaxed() -> Self {
        Self {
            connection_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
            upload_timeout: Duration::from_secs(600),
        }
    }

    /// Create timeouts suitable for tests that must fail fast rather than
    /// hang on an unreachable server.
    pub fn for_testing(request_timeout_secs: u64) -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(request_timeout_secs),
            upload_timeout: Duration::from_secs(request_timeout_secs),
        }
    }

    /// Check if a duration represents "no timeout" (zero or very large).
    pub fn is_no_timeout(duration: Duration) -> bool {
        duration.is_zero() || duration > Duration::from_secs(86400 * 365) // > 1 year
    }
}

/// Builder for creating custom [`KilnLinkTimeouts`] configurations.
#[derive(Debug, Clone)]
pub struct KilnLinkTimeoutsBuilder {
    timeouts: KilnLinkTimeouts,
}

impl KilnLinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: KilnLinkTimeouts::default(),
        }
    }

    /// Set the connection timeout (TCP + TLS handshake).
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    /// Set the connection timeout in seconds.
    pub fn connection_timeout_secs(self, secs: u64) -> Self {
        self.connection_timeout(Duration::from_secs(secs))
    }

    /// Set the request timeout (complete request/response exchange).
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request_timeout = timeout;
        self
    }

    /// Set the request timeout in seconds.
    pub fn request_timeout_secs(self, secs: u64) -> Self {
        self.request_timeout(Duration::from_secs(secs))
    }

    /// Set the upload timeout (multipart file transfers).
    pub fn upload_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.upload_timeout = timeout;
        self
    }

    /// Set the upload timeout in seconds.
    pub fn upload_timeout_secs(self, secs: u64) -> Self {
        self.upload_timeout(Duration::from_secs(secs))
    }

    /// Build the timeout configuration.
    pub fn build(self) -> KilnLinkTimeouts {
        self.timeouts
    }
}
