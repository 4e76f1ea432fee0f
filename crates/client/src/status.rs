use std::future::Future;

use vidgen_core::api::{GenerateRequest, GenerateResponse};
use vidgen_core::error::ApiError;
use vidgen_core::model::{JobId, JobStatus};

/// One status read against the generation service.
///
/// Implementations must not retry internally: retry policy belongs to the
/// tracker and its backoff policy, so reads and retries stay separately
/// testable.
pub trait StatusSource: Send + Sync + 'static {
    /// Fetch the current status for `job_id` exactly once.
    fn fetch_status(
        &self,
        job_id: &JobId,
    ) -> impl Future<Output = Result<JobStatus, ApiError>> + Send;
}

/// Client for one generation service base URL.
///
/// Performs single status reads (the [`StatusSource`] impl), job
/// submission, and artifact URL construction. No file IO happens here: a
/// completed job's artifact reference is handed to whatever downloads or
/// plays the video.
#[derive(Clone)]
pub struct HttpStatusClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStatusClient {
    /// Creates a client for `base_url`, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submit a generation job.
    ///
    /// `already_exists` responses carry the artifact directly; callers
    /// should skip tracking in that case.
    pub async fn submit(&self, req: &GenerateRequest) -> Result<GenerateResponse, ApiError> {
        let resp = self
            .http
            .post(self.url("/api/generate-video"))
            .json(req)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        resp.json::<GenerateResponse>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }

    /// Download URL for a job's artifact.
    pub fn video_url(&self, job_id: &JobId) -> String {
        self.url(&format!("/api/download-video/{}", job_id.as_str()))
    }
}

impl StatusSource for HttpStatusClient {
    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatus, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/video-status/{}", job_id.as_str())))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        resp.json::<JobStatus>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }
}
