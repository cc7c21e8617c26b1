//! # kiln-link: Kiln Client Library
//!
//! A client library for connecting to Kiln fine-tuning servers. Provides
//! training-job management over HTTP with a session cache that keeps
//! dashboard views consistent without manual refresh plumbing.
//!
//! ## Features
//!
//! - **Job Management**: Create, update, start, pause and stop training jobs
//! - **Session Cache**: Keyed cache with change notifications and staleness tracking
//! - **Query Deduplication**: Concurrent reads of the same key share one request
//! - **Live Watches**: Poll job status and logs on an interval, pushed as snapshots
//! - **Authentication**: JWT token and HTTP Basic support, static or async-resolved
//! - **Connection Pooling**: Automatic HTTP connection reuse
//! - **Configurable Timeouts**: Per-operation timeout configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kiln_link::{KilnLinkClient, CreateJobRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build a client with custom configuration
//!     let client = KilnLinkClient::builder()
//!         .base_url("http://localhost:8000")
//!         .timeout(std::time::Duration::from_secs(30))
//!         .build()?;
//!
//!     // Create and start a training job
//!     let job = client
//!         .jobs()
//!         .create(CreateJobRequest::new("bedtime-stories", "llama-3-8b"))
//!         .await?;
//!     let job = client.jobs().start(job.id).await?;
//!     println!("Job {} is {}", job.id, job.status);
//!
//!     // Watch its logs, polled every two seconds
//!     let mut watch = client.jobs().watch_logs(job.id).await;
//!     while let Some(snapshot) = watch.next().await {
//!         println!("log snapshot: {:?}", snapshot.value);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! ```rust,no_run
//! use kiln_link::{AuthProvider, KilnLinkClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Using JWT token
//! let client = KilnLinkClient::builder()
//!     .base_url("http://localhost:8000")
//!     .jwt_token("your-jwt-token")
//!     .build()?;
//!
//! // Using HTTP Basic credentials
//! let client = KilnLinkClient::builder()
//!     .base_url("http://localhost:8000")
//!     .auth(AuthProvider::basic_auth("alice".to_string(), "secret".to_string()))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cache;
pub mod client;
pub mod error;
pub mod jobs;
pub mod keys;
pub mod models;
pub mod mutation;
pub mod query;
pub mod timeouts;
pub mod transport;
pub mod watch;

// Re-export main types for convenience
pub use auth::{ArcDynAuthProvider, AuthProvider, DynamicAuthProvider};
pub use cache::{CacheEntry, CacheStore, CacheSubscription};
pub use client::{KilnLinkClient, KilnLinkClientBuilder};
pub use error::{KilnLinkError, Result};
pub use jobs::{JobsApi, DEFAULT_LOG_POLL_INTERVAL_MS};
pub use keys::{KeyPart, QueryKey};
pub use models::{
    CostEstimate, CreateJobRequest, EstimateRequest, HealthCheckResponse, Hyperparameters,
    JobLogs, JobStatus, LogLine, LoginRequest, LoginResponse, TrainingJob, UpdateJobRequest,
    UploadFile, UploadResponse, UploadedFileInfo,
};
pub use mutation::MutationRunner;
pub use query::{fetch_fn, FetchFn, QueryOptions, QueryRunner};
pub use timeouts::KilnLinkTimeouts;
pub use transport::{ApiRequest, ApiTransport, HttpMethod, HttpTransport};
pub use watch::QueryWatch;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
