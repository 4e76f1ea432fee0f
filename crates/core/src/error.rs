use thiserror::Error;

use crate::model::JobStatus;

/// Failure of a single request against the generation service.
///
/// Both variants are retryable from the tracker's point of view: a response
/// that cannot be decoded gets no more trust than one that never arrived.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network error, timeout, or non-2xx response.
    #[error("transport: {0}")]
    Transport(String),
    /// Response received but not decodable into the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Terminal failure of a tracking session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackFailure {
    /// Retry budget exhausted without ever reaching a terminal status.
    #[error("status polling timed out after {attempts} consecutive failed reads")]
    Timeout {
        /// Consecutive failed reads when the budget ran out.
        attempts: u32,
    },
    /// The service itself reported the job as failed. Not retried.
    #[error("generation failed: {message}")]
    Reported {
        /// Error message exactly as provided by the service.
        message: String,
    },
}

/// Terminal outcome delivered exactly once per tracking session.
///
/// Cancellation is not an outcome: a cancelled session delivers nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackOutcome {
    /// Job finished; the final status carries the artifact reference.
    Completed(JobStatus),
    /// Job failed, either reported by the service or by retry timeout.
    Failed(TrackFailure),
}
