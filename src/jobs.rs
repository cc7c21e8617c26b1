//! Training-job operations: reads through the cache, writes with declared
//! invalidation, and continuous watches.
//!
//! This is the surface the presentation layer talks to. Reads (`list`, `get`,
//! `logs`) resolve through the [`QueryRunner`] so repeated calls hit the
//! cache; writes go through the [`MutationRunner`] with the invalidation
//! lists below; `estimate_cost` is a pure server calculation and touches
//! nothing.
//!
//! | operation      | endpoint                              | invalidates            |
//! |----------------|---------------------------------------|------------------------|
//! | `create`       | `POST /training-jobs`                 | jobs (on success)      |
//! | `update`       | `PATCH /training-jobs/{id}`           | jobs, job (on success) |
//! | `start`        | `POST /training-jobs/{id}/start`      | jobs, job (always)     |
//! | `pause`        | `POST /training-jobs/{id}/pause`      | jobs, job (always)     |
//! | `stop`         | `POST /training-jobs/{id}/stop`       | jobs, job (always)     |
//! | `upload_files` | `POST /training-jobs/{id}/files`      | job files (on success) |

use crate::cache::{CacheEntry, CacheStore};
use crate::error::{KilnLinkError, Result};
use crate::keys;
use crate::models::{
    CostEstimate, CreateJobRequest, EstimateRequest, JobLogs, TrainingJob, UpdateJobRequest,
    UploadFile, UploadResponse,
};
use crate::mutation::MutationRunner;
use crate::query::{fetch_fn, FetchFn, QueryOptions, QueryRunner};
use crate::transport::{ApiRequest, ApiTransport};
use crate::watch::QueryWatch;
use log::debug;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Poll cadence for live training logs, in milliseconds.
pub const DEFAULT_LOG_POLL_INTERVAL_MS: u64 = 2000;

/// Job-control API bound to one client's cache and transport.
///
/// Cloning is cheap; clones share the cache, so a mutation through one clone
/// invalidates watches created through another.
#[derive(Clone)]
pub struct JobsApi {
    transport: Arc<dyn ApiTransport>,
    runner: QueryRunner,
    mutations: MutationRunner,
}

impl JobsApi {
    pub(crate) fn new(
        transport: Arc<dyn ApiTransport>,
        runner: QueryRunner,
        mutations: MutationRunner,
    ) -> Self {
        Self {
            transport,
            runner,
            mutations,
        }
    }

    /// The cache backing this API.
    pub fn cache(&self) -> &CacheStore {
        self.runner.cache()
    }

    // ── Reads ────────────────────────────────────────────────────────────

    /// List all training jobs. Served from cache while fresh.
    pub async fn list(&self) -> Result<Vec<TrainingJob>> {
        let entry = self
            .runner
            .query(
                &keys::jobs(),
                self.fetch_for(ApiRequest::get("/training-jobs")),
                &QueryOptions::default(),
            )
            .await?;
        decode_entry(entry)
    }

    /// Fetch one job by id. Served from cache while fresh.
    pub async fn get(&self, id: i64) -> Result<TrainingJob> {
        let entry = self
            .runner
            .query(
                &keys::job(id),
                self.fetch_for(ApiRequest::get(format!("/training-jobs/{}", id))),
                &QueryOptions::default(),
            )
            .await?;
        decode_entry(entry)
    }

    /// Fetch the training logs for one job. Served from cache while fresh;
    /// use [`watch_logs`](Self::watch_logs) for a live tail.
    pub async fn logs(&self, id: i64) -> Result<JobLogs> {
        let entry = self
            .runner
            .query(
                &keys::job_logs(id),
                self.fetch_for(ApiRequest::get(format!("/training-jobs/{}/logs", id))),
                &QueryOptions::default(),
            )
            .await?;
        decode_entry(entry)
    }

    // ── Watches ──────────────────────────────────────────────────────────

    /// Watch the job list: snapshots arrive after every fetch, mutation
    /// invalidation, or direct cache write.
    pub async fn watch_jobs(&self) -> QueryWatch {
        self.runner
            .watch(
                &keys::jobs(),
                self.fetch_for(ApiRequest::get("/training-jobs")),
                QueryOptions::default(),
            )
            .await
    }

    /// Watch one job.
    pub async fn watch_job(&self, id: i64) -> QueryWatch {
        self.runner
            .watch(
                &keys::job(id),
                self.fetch_for(ApiRequest::get(format!("/training-jobs/{}", id))),
                QueryOptions::default(),
            )
            .await
    }

    /// Watch a job's logs, polling every
    /// [`DEFAULT_LOG_POLL_INTERVAL_MS`] milliseconds until closed.
    pub async fn watch_logs(&self, id: i64) -> QueryWatch {
        self.watch_logs_with_interval(id, DEFAULT_LOG_POLL_INTERVAL_MS).await
    }

    /// Watch a job's logs on a custom poll cadence.
    pub async fn watch_logs_with_interval(&self, id: i64, interval_ms: u64) -> QueryWatch {
        self.runner
            .watch(
                &keys::job_logs(id),
                self.fetch_for(ApiRequest::get(format!("/training-jobs/{}/logs", id))),
                QueryOptions::new().with_poll_interval_ms(interval_ms),
            )
            .await
    }

    // ── Mutations ────────────────────────────────────────────────────────

    /// Create a training job. Invalidates the job list on success.
    pub async fn create(&self, request: CreateJobRequest) -> Result<TrainingJob> {
        debug!("[LINK_JOBS] Creating job: name={}", request.name);
        let body = serde_json::to_value(&request)?;
        let transport = Arc::clone(&self.transport);
        let value = self
            .mutations
            .run(
                async move {
                    transport
                        .execute(ApiRequest::post("/training-jobs").with_body(body))
                        .await
                },
                &[keys::jobs()],
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Update a job's configuration. Invalidates the job list and the job
    /// itself on success.
    pub async fn update(&self, id: i64, patch: UpdateJobRequest) -> Result<TrainingJob> {
        debug!("[LINK_JOBS] Updating job {}", id);
        let body = serde_json::to_value(&patch)?;
        let transport = Arc::clone(&self.transport);
        let value = self
            .mutations
            .run(
                async move {
                    transport
                        .execute(
                            ApiRequest::patch(format!("/training-jobs/{}", id)).with_body(body),
                        )
                        .await
                },
                &[keys::jobs(), keys::job(id)],
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Ask the server to start the job.
    ///
    /// The transition is server-authoritative: the server may refuse (wrong
    /// state) and its error is surfaced verbatim. The job list and the job
    /// are invalidated regardless of outcome so the cache reconciles with
    /// whatever the server decided.
    pub async fn start(&self, id: i64) -> Result<TrainingJob> {
        self.transition(id, "start").await
    }

    /// Ask the server to pause the job. Same reconciling policy as
    /// [`start`](Self::start).
    pub async fn pause(&self, id: i64) -> Result<TrainingJob> {
        self.transition(id, "pause").await
    }

    /// Ask the server to stop the job. Same reconciling policy as
    /// [`start`](Self::start).
    pub async fn stop(&self, id: i64) -> Result<TrainingJob> {
        self.transition(id, "stop").await
    }

    async fn transition(&self, id: i64, action: &str) -> Result<TrainingJob> {
        debug!("[LINK_JOBS] Requesting {} for job {}", action, id);
        let transport = Arc::clone(&self.transport);
        let path = format!("/training-jobs/{}/{}", id, action);
        let value = self
            .mutations
            .run_reconciling(
                async move { transport.execute(ApiRequest::post(path)).await },
                &[keys::jobs(), keys::job(id)],
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Upload dataset files for a job as one multipart request, preserving
    /// original bytes and names.
    ///
    /// Invalidates the job's file listing on success. On rejection the
    /// error is an `UploadError` carrying the server's status text, and the
    /// cached file listing stays untouched.
    pub async fn upload_files(&self, id: i64, files: Vec<UploadFile>) -> Result<UploadResponse> {
        let total_bytes: usize = files.iter().map(|file| file.size()).sum();
        debug!(
            "[LINK_UPLOAD] Uploading {} file(s), {} bytes total, for job {}",
            files.len(),
            total_bytes,
            id
        );

        let transport = Arc::clone(&self.transport);
        let path = format!("/training-jobs/{}/files", id);
        let result = self
            .mutations
            .run(
                async move {
                    transport
                        .execute(ApiRequest::post_multipart(path, files))
                        .await
                },
                &[keys::job_files(id)],
            )
            .await;

        match result {
            Ok(value) => Ok(serde_json::from_value(value)?),
            Err(KilnLinkError::ServerError {
                status_code,
                message,
            }) => Err(KilnLinkError::UploadError(format!(
                "Upload rejected ({}): {}",
                status_code, message
            ))),
            Err(error) => Err(error),
        }
    }

    /// Estimate the cost of a training configuration.
    ///
    /// Pure calculation on the server: no job is created and no cached data
    /// is read or invalidated.
    pub async fn estimate_cost(&self, request: EstimateRequest) -> Result<CostEstimate> {
        debug!("[LINK_JOBS] Estimating cost: base_model={}", request.base_model);
        let body = serde_json::to_value(&request)?;
        let value = self
            .transport
            .execute(ApiRequest::post("/estimate").with_body(body))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    fn fetch_for(&self, request: ApiRequest) -> FetchFn {
        let transport = Arc::clone(&self.transport);
        fetch_fn(move || {
            let transport = Arc::clone(&transport);
            let request = request.clone();
            async move { transport.execute(request).await }
        })
    }
}

fn decode_entry<T: DeserializeOwned>(entry: CacheEntry) -> Result<T> {
    entry.decode::<T>()?.ok_or_else(|| {
        KilnLinkError::InternalError("Query resolved without a value".to_string())
    })
}
