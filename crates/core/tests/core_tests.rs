//! Integration tests for the core crate.

use vidgen_core::api::{GenerateResponse, SubmitDisposition};
use vidgen_core::model::{JobId, JobStage, JobStatus};

#[test]
fn job_stage_serde() {
    let running = JobStage::Running;
    let serialized = serde_json::to_string(&running).unwrap();
    assert_eq!(serialized, r#""running""#);
    let deserialized: JobStage = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, running);

    assert!(JobStage::Completed.is_terminal());
    assert!(JobStage::Failed.is_terminal());
    assert!(!JobStage::Queued.is_terminal());
}

#[test]
fn status_decodes_with_optional_fields_missing() {
    let status: JobStatus =
        serde_json::from_str(r#"{"status":"queued","question_id":"ml_001"}"#).unwrap();
    assert_eq!(status.status, JobStage::Queued);
    assert_eq!(status.question_id, "ml_001");
    assert!(status.progress.is_none());
    assert!(status.video_file.is_none());
    assert!(status.error.is_none());
}

#[test]
fn status_decodes_full_completed_payload() {
    let status: JobStatus = serde_json::from_str(
        r#"{
            "status": "completed",
            "question_id": "ml_001",
            "progress": 100.0,
            "current_step": "Video generation completed",
            "estimated_completion": "2026-08-28T12:00:00",
            "video_file": "video_output/video_ml_001.mp4"
        }"#,
    )
    .unwrap();
    assert_eq!(status.status, JobStage::Completed);
    assert_eq!(status.progress, Some(100.0));
    assert_eq!(
        status.video_file.as_deref(),
        Some("video_output/video_ml_001.mp4")
    );
}

#[test]
fn unknown_stage_fails_closed() {
    let res: Result<JobStatus, _> =
        serde_json::from_str(r#"{"status":"exploded","question_id":"ml_001"}"#);
    assert!(res.is_err());
}

#[test]
fn missing_stage_fails_closed() {
    let res: Result<JobStatus, _> = serde_json::from_str(r#"{"question_id":"ml_001"}"#);
    assert!(res.is_err());
}

#[test]
fn generate_response_started() {
    let resp: GenerateResponse = serde_json::from_str(
        r#"{
            "status": "started",
            "question_id": "ml_001",
            "message": "Video generation started",
            "estimated_time": 120,
            "job_id": "job_ml_001_1756380000"
        }"#,
    )
    .unwrap();
    assert_eq!(resp.status, SubmitDisposition::Started);
    assert_eq!(resp.estimated_time, Some(120));
    assert_eq!(resp.job_id.as_deref(), Some("job_ml_001_1756380000"));
}

#[test]
fn generate_response_already_exists_carries_artifact() {
    let resp: GenerateResponse = serde_json::from_str(
        r#"{
            "status": "already_exists",
            "question_id": "ml_001",
            "message": "Video already exists for this question",
            "video_file": "video_output/video_ml_001.mp4"
        }"#,
    )
    .unwrap();
    assert_eq!(resp.status, SubmitDisposition::AlreadyExists);
    assert_eq!(
        resp.video_file.as_deref(),
        Some("video_output/video_ml_001.mp4")
    );
}

#[test]
fn job_id_is_opaque() {
    let id = JobId::from_str("ml_001");
    assert_eq!(id.as_str(), "ml_001");
    assert_eq!(id.to_string(), "ml_001");
    assert_eq!(id, JobId::from_str("ml_001"));
}
