use serde::{Deserialize, Serialize};

/// Body for `POST /api/generate-video`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Question id the video is generated for; doubles as the job id.
    pub question_id: String,
    /// Question text.
    pub question: String,
    /// Reference solution text.
    pub solution: String,
}

/// How the service disposed of a submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmitDisposition {
    /// Generation started; poll the status endpoint until terminal.
    Started,
    /// A finished artifact already exists; skip tracking entirely.
    AlreadyExists,
}

/// Response for `POST /api/generate-video`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Submission outcome.
    pub status: SubmitDisposition,
    /// Question id echoed back.
    pub question_id: String,
    /// Human-readable note from the service.
    pub message: String,
    /// Rough generation time estimate in seconds, when started.
    #[serde(default)]
    pub estimated_time: Option<u64>,
    /// Server-side job identifier, when started.
    #[serde(default)]
    pub job_id: Option<String>,
    /// Artifact reference, when `status` is `already_exists`.
    #[serde(default)]
    pub video_file: Option<String>,
}
