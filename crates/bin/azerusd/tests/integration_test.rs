//! End-to-end smoke tests for the full azerusd stack.
//!
//! Each test wires the complete application (virtual input backend, real
//! coordinator, real log tail over a temp file, real axum router) and
//! exercises it via `tower::ServiceExt::oneshot`. No TCP port is bound.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use azerus_adapter_http_axum::router;
use azerus_adapter_http_axum::state::AppState;
use azerus_adapter_log_tail::LogTail;
use azerus_adapter_virtual::{InputEvent, VirtualInput};
use azerus_app::coordinator::Coordinator;
use azerus_app::ports::TriggerSourceControl;
use azerus_app::recovery::RecoveryConfig;
use azerus_domain::marker::{Marker, WEAPON_KNOCKED_OUT};
use azerus_domain::rate::ActionRate;
use azerus_domain::recovery::{Detections, TargetKind, TargetMatch};

type Stack = Coordinator<Arc<VirtualInput>, Arc<VirtualInput>>;

struct App {
    input: Arc<VirtualInput>,
    coordinator: Arc<Stack>,
    tail: Arc<LogTail<Arc<Stack>>>,
    router: axum::Router,
}

/// Build a fully-wired stack. The log tail is not started; tests poll it.
fn app() -> App {
    let input = Arc::new(VirtualInput::default());
    let config = RecoveryConfig {
        settle_delay: Duration::ZERO,
        open_delay: Duration::from_millis(5),
        close_delay: Duration::ZERO,
        ..RecoveryConfig::default()
    };
    let coordinator = Arc::new(Coordinator::new(
        Arc::clone(&input),
        Arc::clone(&input),
        ActionRate::DEFAULT,
        config,
    ));
    let tail = Arc::new(LogTail::new(
        Arc::clone(&coordinator),
        Marker::default(),
        Duration::from_millis(10),
    ));
    let router = router::build(AppState::new(Arc::clone(&coordinator), Arc::clone(&tail)));
    App {
        input,
        coordinator,
        tail,
        router,
    }
}

fn temp_log(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "azerusd-it-{}-{name}.log",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

fn append_line(path: &Path, line: &str) {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    writeln!(file, "{line}").unwrap();
}

async fn send(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let app = app();

    let resp = app
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Log stream → recovery
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn should_recover_from_log_marker_and_resume_clicking() {
    let app = app();
    let log = temp_log("recover");
    append_line(&log, &format!("[10:00:00] [CHAT] {WEAPON_KNOCKED_OUT}"));
    app.input.set_detections(Detections {
        inventory: Some(TargetMatch {
            x: 100,
            y: 200,
            kind: TargetKind::Inventory,
            confidence: 0.9,
        }),
        hotbar: None,
    });

    let (status, _) = send(
        &app.router,
        "PUT",
        "/api/trigger-source",
        Some(&format!(r#"{{"path": "{}"}}"#, log.display())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // First poll anchors past the pre-existing marker.
    assert_eq!(app.tail.poll_once().await.unwrap(), 0);

    let (_, engine) = send(&app.router, "POST", "/api/engine/toggle", None).await;
    assert_eq!(engine["running"], true);
    tokio::time::sleep(Duration::from_millis(150)).await;

    append_line(&log, &format!("[10:00:05] [CHAT] {WEAPON_KNOCKED_OUT}"));
    assert_eq!(app.tail.poll_once().await.unwrap(), 1);

    let (_, status) = send(&app.router, "GET", "/api/status", None).await;
    assert_eq!(status["recovery"]["outcome"]["state"], "recovered");
    assert_eq!(status["recovery"]["last_origin"], "log_stream");
    assert_eq!(status["recovery"]["completed"], 1);
    assert_eq!(status["engine"]["running"], true);
    assert_eq!(status["engine"]["rate"], 10.0);
    assert_eq!(status["gate"]["actions_allowed"], true);
    assert_eq!(status["gate"]["recovery_in_progress"], false);

    let events = app.input.events();
    let assign = events
        .iter()
        .position(|e| {
            *e == InputEvent::KeyPress {
                key: "2".to_string(),
            }
        })
        .unwrap();
    assert_eq!(events[assign - 1], InputEvent::MoveTo { x: 100, y: 200 });

    app.coordinator.shutdown().await;
    let _ = std::fs::remove_file(&log);
}

#[tokio::test]
async fn should_stop_background_tail_cleanly() {
    let app = app();
    let log = temp_log("background");
    app.tail.set_source(log.clone());

    let handle = app.tail.start();
    tokio::time::sleep(Duration::from_millis(30)).await;
    append_line(&log, WEAPON_KNOCKED_OUT);
    tokio::time::sleep(Duration::from_millis(150)).await;
    app.tail.stop();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(app.coordinator.status().recovery.completed, 1);
    let _ = std::fs::remove_file(&log);
}

// ---------------------------------------------------------------------------
// Control surface
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_reject_invalid_rate_and_keep_previous() {
    let app = app();

    let (status, body) = send(
        &app.router,
        "PUT",
        "/api/engine/rate",
        Some(r#"{"rate": 0}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("greater than zero"));

    let (_, snapshot) = send(&app.router, "GET", "/api/status", None).await;
    assert_eq!(snapshot["engine"]["rate"], 10.0);
}

#[tokio::test]
async fn should_report_not_found_via_manual_trigger_without_detections() {
    let app = app();

    let (status, body) = send(&app.router, "POST", "/api/recovery/trigger", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["state"], "not_found");
    let closes = app
        .input
        .events()
        .iter()
        .filter(|e| {
            **e == InputEvent::KeyPress {
                key: "q".to_string(),
            }
        })
        .count();
    assert_eq!(closes, 2);
}
