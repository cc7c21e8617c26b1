//! Data models for the kiln-link client library.
//!
//! One file per wire type. Request/response structures match the Kiln
//! job-control API's JSON (snake_case fields, except the upload
//! acknowledgment which the server emits in camelCase).

mod cost_estimate;
mod create_job_request;
mod estimate_request;
mod health_check_response;
mod hyperparameters;
mod job_logs;
mod job_status;
mod login_request;
mod login_response;
mod training_job;
mod update_job_request;
mod upload_file;
mod upload_response;

pub use cost_estimate::CostEstimate;
pub use create_job_request::CreateJobRequest;
pub use estimate_request::EstimateRequest;
pub use health_check_response::HealthCheckResponse;
pub use hyperparameters::Hyperparameters;
pub use job_logs::{JobLogs, LogLine};
pub use job_status::JobStatus;
pub use login_request::LoginRequest;
pub use login_response::LoginResponse;
pub use training_job::TrainingJob;
pub use update_job_request::UpdateJobRequest;
pub use upload_file::UploadFile;
pub use upload_response::{UploadResponse, UploadedFileInfo};
