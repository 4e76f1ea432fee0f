use serde::{Deserialize, Serialize};

/// Externally assigned job identifier.
///
/// The generation service keys jobs by question id; the id is opaque here
/// and stable for the job's lifetime. It is also the de-duplication key in
/// the tracker registry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Wraps an externally assigned identifier.
    pub fn from_str(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Borrows the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle stage reported by the generation service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    /// Accepted, waiting for a pipeline slot.
    Queued,
    /// Generation in progress.
    Running,
    /// Finished; the status payload carries the artifact reference.
    Completed,
    /// The service gave up; the status payload carries an error message.
    Failed,
}

impl JobStage {
    /// True for `completed` and `failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStage::Completed | JobStage::Failed)
    }
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            JobStage::Queued => "queued",
            JobStage::Running => "running",
            JobStage::Completed => "completed",
            JobStage::Failed => "failed",
        })
    }
}

/// One status payload from `GET /api/video-status/{question_id}`.
///
/// Decoding fails closed: an unrecognized `status` value is a decode error,
/// never a partially populated record. All other fields are optional and
/// pass through untouched; the service is the source of truth for progress,
/// so nothing here reorders or clamps what it reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobStatus {
    /// Lifecycle stage.
    pub status: JobStage,
    /// Job identifier the payload refers to.
    pub question_id: String,
    /// Percent complete in `0..=100`, if the service reports it.
    #[serde(default)]
    pub progress: Option<f32>,
    /// Human-readable label for the step in progress.
    #[serde(default)]
    pub current_step: Option<String>,
    /// Service-estimated completion timestamp (opaque string).
    #[serde(default)]
    pub estimated_completion: Option<String>,
    /// Artifact reference; present once `status` is `completed`.
    #[serde(default)]
    pub video_file: Option<String>,
    /// Service-reported error message; present when `status` is `failed`.
    #[serde(default)]
    pub error: Option<String>,
}
