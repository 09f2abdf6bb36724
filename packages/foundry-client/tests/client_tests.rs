//! Client behaviour against an in-process fake platform.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{RawQuery, Request};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use foundry_client::{BuildOptions, FoundryClient, FoundryConfig, FoundryError, RetryPolicy};
use serde_json::{json, Value};

const OUTPUT_RID: &str = "ri.foundry.main.dataset.output";
const INPUT_RID: &str = "ri.foundry.main.dataset.input";

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(base_url: &str) -> FoundryClient {
    let mut config = FoundryConfig::new(base_url, "test-token");
    config.retry = RetryPolicy {
        backoff_factor: Duration::from_millis(1),
        ..RetryPolicy::default()
    };
    FoundryClient::new(config).unwrap()
}

#[tokio::test]
async fn upload_file_rejects_media_set_rid_without_calling_out() {
    let client = client_for("http://127.0.0.1:1");

    let err = client
        .upload_file("ri.mio.main.media-set.abc", "a/b.png", b"x".to_vec())
        .await
        .unwrap_err();

    assert!(matches!(err, FoundryError::InvalidRid(_)));
}

#[tokio::test]
async fn upload_file_sends_path_and_auth() {
    let seen: Arc<Mutex<Vec<(String, String, Vec<u8>)>>> = Arc::default();
    let recorder = seen.clone();

    let router = Router::new().fallback(move |req: Request| {
        let recorder = recorder.clone();
        async move {
            let path = req.uri().path().to_string();
            let query = req.uri().query().unwrap_or_default().to_string();
            let auth = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            assert_eq!(auth, "Bearer test-token");
            let body = axum::body::to_bytes(req.into_body(), usize::MAX)
                .await
                .unwrap()
                .to_vec();
            recorder.lock().unwrap().push((path, query, body));
            StatusCode::OK
        }
    });
    let client = client_for(&spawn(router).await);

    client
        .upload_file(INPUT_RID, "incoming/2024-05-01/notes.txt", b"hello".to_vec())
        .await
        .unwrap();

    let calls = seen.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, format!("/api/v1/datasets/{}/files:upload", INPUT_RID));
    assert!(calls[0].1.contains("filePath=incoming%2F2024-05-01%2Fnotes.txt"));
    assert_eq!(calls[0].2, b"hello");
}

#[tokio::test]
async fn upload_file_surfaces_status_and_body() {
    let router = Router::new().fallback(|| async { (StatusCode::FORBIDDEN, "no write access") });
    let client = client_for(&spawn(router).await);

    let err = client
        .upload_file(INPUT_RID, "x.txt", b"x".to_vec())
        .await
        .unwrap_err();

    match err {
        FoundryError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "no write access");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn create_build_stops_at_first_accepted_variant() {
    let bodies: Arc<Mutex<Vec<Value>>> = Arc::default();
    let recorder = bodies.clone();

    let router = Router::new().route(
        "/api/v2/orchestration/builds/create",
        post(move |Json(body): Json<Value>| {
            let recorder = recorder.clone();
            async move {
                let n = {
                    let mut guard = recorder.lock().unwrap();
                    guard.push(body);
                    guard.len()
                };
                if n == 1 {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "errorCode": "INVALID_ARGUMENT",
                            "errorName": "Orchestration:InvalidFallbackBranches",
                            "errorInstanceId": "e-1"
                        })),
                    )
                        .into_response()
                } else {
                    Json(json!({"rid": "ri.foundry.main.build.42", "status": "RUNNING"}))
                        .into_response()
                }
            }
        }),
    );
    let client = client_for(&spawn(router).await);

    let rid = client
        .create_build(&[OUTPUT_RID.to_string()], &BuildOptions::for_branch("master"))
        .await
        .unwrap();

    assert_eq!(rid, "ri.foundry.main.build.42");
    let bodies = bodies.lock().unwrap();
    assert_eq!(bodies.len(), 2);
    assert!(bodies[0].get("fallbackBranches").is_some());
    assert!(bodies[1].get("fallbackBranches").is_none());
    assert_eq!(bodies[1]["target"]["targetRids"], json!([OUTPUT_RID]));
}

#[tokio::test]
async fn create_build_reports_every_rejected_variant() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let router = Router::new().route(
        "/api/v2/orchestration/builds/create",
        post(move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "errorCode": "INVALID_ARGUMENT",
                        "errorName": format!("Variant{n}Rejected"),
                        "errorInstanceId": format!("e-{n}")
                    })),
                )
            }
        }),
    );
    let client = client_for(&spawn(router).await);

    let err = client
        .create_build(&[OUTPUT_RID.to_string()], &BuildOptions::for_branch("master"))
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let FoundryError::BuildCreate { attempts } = &err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(attempts.len(), 3);
    assert_eq!(attempts[2].variant, 3);
    assert_eq!(attempts[2].error_name.as_deref(), Some("Variant3Rejected"));
    assert!(err.to_string().contains("e-1"));
    assert!(err.to_string().contains("e-3"));
}

#[tokio::test]
async fn create_build_treats_missing_rid_as_rejected() {
    let bodies: Arc<Mutex<Vec<Value>>> = Arc::default();
    let recorder = bodies.clone();

    let router = Router::new().route(
        "/api/v2/orchestration/builds/create",
        post(move |Json(body): Json<Value>| {
            let recorder = recorder.clone();
            async move {
                let n = {
                    let mut guard = recorder.lock().unwrap();
                    guard.push(body);
                    guard.len()
                };
                if n == 1 {
                    Json(json!({}))
                } else {
                    Json(json!({"rid": "ri.foundry.main.build.43"}))
                }
            }
        }),
    );
    let client = client_for(&spawn(router).await);

    let rid = client
        .create_build(&[OUTPUT_RID.to_string()], &BuildOptions::for_branch("master"))
        .await
        .unwrap();

    assert_eq!(rid, "ri.foundry.main.build.43");
    let bodies = bodies.lock().unwrap();
    assert_eq!(bodies.len(), 2);
    assert!(bodies[0].get("fallbackBranches").is_some());
    assert!(bodies[1].get("fallbackBranches").is_none());
}

#[tokio::test]
async fn create_build_without_any_rid_lists_each_attempt() {
    let router = Router::new().route(
        "/api/v2/orchestration/builds/create",
        post(|| async { (StatusCode::OK, Json(json!({"status": "RUNNING"}))) }),
    );
    let client = client_for(&spawn(router).await);

    let err = client
        .create_build(&[OUTPUT_RID.to_string()], &BuildOptions::for_branch("master"))
        .await
        .unwrap_err();

    let FoundryError::BuildCreate { attempts } = &err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(attempts.len(), 3);
    assert!(attempts
        .iter()
        .all(|a| a.status == 200 && a.error_name.as_deref() == Some("MissingBuildRid")));
    assert_eq!(
        attempts.iter().map(|a| a.variant).collect::<Vec<_>>(),
        [1, 2, 3]
    );
}

#[tokio::test]
async fn transient_status_is_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let path = format!("/api/v2/datasets/{}/readTable", OUTPUT_RID);

    let router = Router::new().route(
        &path,
        get(move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    (StatusCode::SERVICE_UNAVAILABLE, String::new())
                } else {
                    (StatusCode::OK, "_file,response\na.txt,ok\n".to_string())
                }
            }
        }),
    );
    let client = client_for(&spawn(router).await);

    let table = client.read_table(OUTPUT_RID, None, None).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(table.len(), 1);
    assert_eq!(table.first_value("response"), Some("ok"));
}

#[tokio::test]
async fn read_table_passes_branch_columns_and_limit() {
    let seen: Arc<Mutex<Option<String>>> = Arc::default();
    let recorder = seen.clone();
    let path = format!("/api/v2/datasets/{}/readTable", OUTPUT_RID);

    let router = Router::new().route(
        &path,
        get(move |RawQuery(query): RawQuery| {
            let recorder = recorder.clone();
            async move {
                *recorder.lock().unwrap() = query;
                "org_name,summary\n"
            }
        }),
    );
    let client = client_for(&spawn(router).await);

    let columns = vec!["org_name".to_string(), "summary".to_string()];
    let table = client
        .read_table(OUTPUT_RID, Some(&columns), Some(10))
        .await
        .unwrap();

    assert!(table.is_empty());
    assert_eq!(table.columns(), ["org_name", "summary"]);

    let query = seen.lock().unwrap().clone().unwrap();
    assert!(query.contains("format=CSV"));
    assert!(query.contains("branchName=master"));
    assert!(query.contains("columns=org_name"));
    assert!(query.contains("columns=summary"));
    assert!(query.contains("rowLimit=10"));
}

#[tokio::test]
async fn media_upload_reads_rid_from_location_header() {
    let router = Router::new().route(
        "/api/v2/mediasets/ri.mio.main.media-set.s1/items",
        post(|| async {
            (
                StatusCode::CREATED,
                [(
                    header::LOCATION,
                    "/api/v2/mediasets/s1/items/ri.mio.main.media-item.abc-123",
                )],
                "",
            )
        }),
    );
    let client = client_for(&spawn(router).await);

    let rid = client
        .upload_media_item("ri.mio.main.media-set.s1", "flyer.png", vec![0x89, 0x50])
        .await
        .unwrap();

    assert_eq!(rid.as_deref(), Some("ri.mio.main.media-item.abc-123"));
}

#[tokio::test]
async fn media_upload_without_rid_is_still_success() {
    let router = Router::new().route(
        "/api/v2/mediasets/ri.mio.main.media-set.s1/items",
        post(|| async { Json(json!({"status": "accepted"})) }),
    );
    let client = client_for(&spawn(router).await);

    let rid = client
        .upload_media_item("ri.mio.main.media-set.s1", "flyer.png", vec![1, 2, 3])
        .await
        .unwrap();

    assert!(rid.is_none());
}

#[tokio::test]
async fn wait_for_build_fails_on_failed_status() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let router = Router::new().route(
        "/api/v2/orchestration/builds/ri.foundry.main.build.7",
        get(move || {
            let counter = counter.clone();
            async move {
                let status = if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    "RUNNING"
                } else {
                    "FAILED"
                };
                Json(json!({"rid": "ri.foundry.main.build.7", "status": status}))
            }
        }),
    );
    let client = client_for(&spawn(router).await);

    let err = client
        .wait_for_build(
            "ri.foundry.main.build.7",
            Duration::from_millis(5),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FoundryError::BuildFailed { ref status, .. } if status == "FAILED"
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn wait_for_build_gives_up_after_its_budget() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let router = Router::new().route(
        "/api/v2/orchestration/builds/ri.foundry.main.build.8",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(json!({"rid": "ri.foundry.main.build.8", "status": "RUNNING"}))
            }
        }),
    );
    let client = client_for(&spawn(router).await);

    let err = client
        .wait_for_build(
            "ri.foundry.main.build.8",
            Duration::from_millis(10),
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FoundryError::BuildTimeout { ref build_rid, .. } if build_rid == "ri.foundry.main.build.8"
    ));
    assert!(calls.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn run_schedule_returns_run_rid() {
    let router = Router::new().route(
        "/api/v2/orchestration/schedules/ri.scheduler.main.schedule.1/run",
        post(|| async {
            (
                StatusCode::CREATED,
                Json(json!({"rid": "ri.scheduler.main.run.9"})),
            )
        }),
    );
    let client = client_for(&spawn(router).await);

    let run = client
        .run_schedule("ri.scheduler.main.schedule.1")
        .await
        .unwrap();

    assert_eq!(run.as_deref(), Some("ri.scheduler.main.run.9"));
}

#[tokio::test]
async fn dataset_jobs_are_listed_newest_first_on_branch() {
    let seen: Arc<Mutex<Option<String>>> = Arc::default();
    let recorder = seen.clone();
    let path = format!("/api/v2/datasets/{}/jobs", OUTPUT_RID);

    let router = Router::new().route(
        &path,
        get(move |RawQuery(query): RawQuery| {
            let recorder = recorder.clone();
            async move {
                *recorder.lock().unwrap() = query;
                Json(json!({"data": [{"rid": "ri.job.2"}, {"jobRid": "ri.job.1"}]}))
            }
        }),
    );
    let client = client_for(&spawn(router).await);

    let jobs = client.list_dataset_jobs(OUTPUT_RID).await.unwrap();

    assert_eq!(jobs, vec!["ri.job.2", "ri.job.1"]);
    let query = seen.lock().unwrap().clone().unwrap();
    assert!(query.contains("orderBy=CREATED_DESC"));
    assert!(query.contains("limit=50"));
}
