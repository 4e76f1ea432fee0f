//! HTTP-layer tests against an in-process stub of the generation service.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use vidgen_client::{HttpStatusClient, StatusSource, Tracker, TrackerConfig};
use vidgen_core::api::{GenerateRequest, SubmitDisposition};
use vidgen_core::backoff::BackoffPolicy;
use vidgen_core::error::ApiError;
use vidgen_core::model::{JobId, JobStage};

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> HttpStatusClient {
    HttpStatusClient::new(format!("http://{addr}"))
}

#[tokio::test]
async fn fetch_status_decodes_a_service_payload() {
    let app = Router::new().route(
        "/api/video-status/{id}",
        get(|Path(id): Path<String>| async move {
            Json(json!({
                "status": "running",
                "question_id": id,
                "progress": 42.0,
                "current_step": "Rendering slides"
            }))
        }),
    );
    let addr = serve(app).await;

    let status = client_for(addr)
        .fetch_status(&JobId::from_str("ml_001"))
        .await
        .unwrap();
    assert_eq!(status.status, JobStage::Running);
    assert_eq!(status.question_id, "ml_001");
    assert_eq!(status.progress, Some(42.0));
    assert_eq!(status.current_step.as_deref(), Some("Rendering slides"));
}

#[tokio::test]
async fn non_2xx_is_a_transport_error() {
    // No route mounted: every status read comes back 404.
    let addr = serve(Router::new()).await;

    let err = client_for(addr)
        .fetch_status(&JobId::from_str("ml_001"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let client = HttpStatusClient::new("http://127.0.0.1:1");
    let err = client
        .fetch_status(&JobId::from_str("ml_001"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn undecodable_body_is_malformed() {
    let app = Router::new().route(
        "/api/video-status/{id}",
        get(|Path(id): Path<String>| async move {
            // 200 with a stage value outside the contract.
            Json(json!({ "status": "torched", "question_id": id }))
        }),
    );
    let addr = serve(app).await;

    let err = client_for(addr)
        .fetch_status(&JobId::from_str("ml_001"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn submit_roundtrip() {
    let app = Router::new().route(
        "/api/generate-video",
        post(|Json(body): Json<Value>| async move {
            Json(json!({
                "status": "started",
                "question_id": body["question_id"],
                "message": "Video generation started",
                "estimated_time": 120,
                "job_id": "job_ml_001_1756380000"
            }))
        }),
    );
    let addr = serve(app).await;

    let resp = client_for(addr)
        .submit(&GenerateRequest {
            question_id: "ml_001".to_string(),
            question: "What is machine learning?".to_string(),
            solution: "A subset of AI that learns from data.".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(resp.status, SubmitDisposition::Started);
    assert_eq!(resp.question_id, "ml_001");
    assert_eq!(resp.estimated_time, Some(120));
}

#[tokio::test]
async fn submit_reports_an_existing_artifact() {
    let app = Router::new().route(
        "/api/generate-video",
        post(|| async {
            Json(json!({
                "status": "already_exists",
                "question_id": "ml_001",
                "message": "Video already exists for this question",
                "video_file": "video_output/video_ml_001.mp4"
            }))
        }),
    );
    let addr = serve(app).await;

    let resp = client_for(addr)
        .submit(&GenerateRequest {
            question_id: "ml_001".to_string(),
            question: "q".to_string(),
            solution: "s".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(resp.status, SubmitDisposition::AlreadyExists);
    assert_eq!(
        resp.video_file.as_deref(),
        Some("video_output/video_ml_001.mp4")
    );
}

#[test]
fn video_url_names_the_download_endpoint() {
    let client = HttpStatusClient::new("http://example.test:8000/");
    assert_eq!(
        client.video_url(&JobId::from_str("ml_001")),
        "http://example.test:8000/api/download-video/ml_001"
    );
}

#[tokio::test]
async fn tracker_runs_to_completion_over_http() {
    // Stub that replays a status sequence, one payload per read.
    let script: Arc<Mutex<VecDeque<Value>>> = Arc::new(Mutex::new(
        vec![
            json!({ "status": "queued", "question_id": "ml_001", "progress": 0.0 }),
            json!({ "status": "running", "question_id": "ml_001", "progress": 40.0 }),
            json!({
                "status": "completed",
                "question_id": "ml_001",
                "progress": 100.0,
                "video_file": "video_output/video_ml_001.mp4"
            }),
        ]
        .into(),
    ));
    let app = Router::new()
        .route(
            "/api/video-status/{id}",
            get(
                |State(script): State<Arc<Mutex<VecDeque<Value>>>>, Path(_id): Path<String>| async move {
                    let next = script.lock().unwrap().pop_front();
                    Json(next.expect("stub script exhausted"))
                },
            ),
        )
        .with_state(script);
    let addr = serve(app).await;

    let config = TrackerConfig {
        backoff: BackoffPolicy {
            base_interval: Duration::from_millis(10),
            ..BackoffPolicy::default()
        },
    };

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let handle = Tracker::new(client_for(addr), JobId::from_str("ml_001"))
        .with_config(config)
        .on_terminal(move |o| {
            let _ = tx.send(o.clone());
        })
        .spawn();

    let outcome = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("tracker should finish quickly")
        .expect("terminal event expected");
    match outcome {
        vidgen_core::error::TrackOutcome::Completed(s) => {
            assert_eq!(s.video_file.as_deref(), Some("video_output/video_ml_001.mp4"));
        }
        other => panic!("expected completion, got {other:?}"),
    }
    handle.wait().await;
}
