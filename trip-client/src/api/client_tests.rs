//! Tests for the API client against an in-process mock backend.

use super::*;
use crate::config::{ClientConfig, TimelineConfig};
use crate::domain::{DomainError, FolderId, ModeChoice, PlanId, SpotCategory};
use crate::session::Session;
use crate::timeline::EditSession;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{Value, json};

/// Serve `router` on an ephemeral port and return its base URL.
async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str, session: Session) -> ApiClient {
    ApiClient::new(&ClientConfig::new(base_url).with_timeout(5), session).unwrap()
}

fn plan_json(id: &str, spots: Value) -> Value {
    json!({
        "id": id, "title": "Kyoto", "area": "Kyoto", "days": 2,
        "people": 3, "budget": 50000, "created_at": "2026-04-01T09:00:00",
        "spots": spots
    })
}

fn sample_spots() -> Value {
    json!([
        {
            "id": "ps1", "spotId": "s1", "day": 1, "startTime": "09:00",
            "transportMode": "car", "transportDuration": 30,
            "spot": {"id": "s1", "name": "Kiyomizu-dera", "category": "History", "durationMinutes": 90}
        },
        {
            "id": "ps2", "spotId": "s2", "day": 1, "startTime": "11:00",
            "spot": {"id": "s2", "name": "Nishiki Market", "category": "Food"}
        }
    ])
}

async fn get_plan_handler(Path(id): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer good-token");
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        );
    }
    if id != "p1" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Plan not found"})),
        );
    }
    (StatusCode::OK, Json(plan_json("p1", sample_spots())))
}

#[tokio::test]
async fn get_plan_sends_token_and_converts() {
    let base = spawn_backend(Router::new().route("/api/plans/:id", get(get_plan_handler))).await;
    let api = client(&base, Session::with_token("good-token"));

    let plan = api.get_plan(&PlanId::new("p1")).await.unwrap();
    assert_eq!(plan.title, "Kyoto");
    assert_eq!(plan.people, 3);
    assert_eq!(plan.spots.len(), 2);
    assert_eq!(plan.spots[0].stay_minutes(), 90);
    assert!(plan.created_at.is_some());
}

#[tokio::test]
async fn backend_error_detail_is_surfaced() {
    let base = spawn_backend(Router::new().route("/api/plans/:id", get(get_plan_handler))).await;
    let api = client(&base, Session::with_token("good-token"));

    let err = api.get_plan(&PlanId::new("missing")).await.unwrap_err();
    match &err {
        ApiError::Backend { status, detail } => {
            assert_eq!(*status, 404);
            assert_eq!(detail, "Plan not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(!api.session().login_required());
}

#[tokio::test]
async fn unauthorized_clears_session() {
    let base = spawn_backend(Router::new().route("/api/plans/:id", get(get_plan_handler))).await;
    let session = Session::with_token("stale-token");
    let api = client(&base, session.clone());

    let err = api.get_plan(&PlanId::new("p1")).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(session.token().await, None);
    assert!(session.login_required());
}

#[tokio::test]
async fn unparseable_body_is_json_error() {
    let router = Router::new().route("/api/plans", get(|| async { "not json" }));
    let base = spawn_backend(router).await;
    let api = client(&base, Session::new());

    let err = api.list_plans().await.unwrap_err();
    match err {
        ApiError::Json { body, .. } => assert_eq!(body.as_deref(), Some("not json")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn no_content_decodes_as_empty() {
    let router = Router::new().route(
        "/api/plans/:id",
        axum::routing::put(|| async { StatusCode::NO_CONTENT }),
    );
    let base = spawn_backend(router).await;
    let api = client(&base, Session::new());

    let result: Option<Value> = api.put("/api/plans/p1", &json!({})).await.unwrap();
    assert_eq!(result, None);
}

type Captured = Arc<Mutex<Option<Value>>>;

async fn put_plan_handler(
    State(captured): State<Captured>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let spots = body["spots"].clone();
    *captured.lock().unwrap() = Some(body);
    Json(plan_json(&id, spots))
}

#[tokio::test]
async fn edit_session_saves_through_backend() {
    let captured: Captured = Arc::default();
    let router = Router::new()
        .route(
            "/api/plans/:id",
            get(|| async { Json(plan_json("p1", sample_spots())) }).put(put_plan_handler),
        )
        .with_state(captured.clone());
    let base = spawn_backend(router).await;
    let api = client(&base, Session::new());

    let plan = api.get_plan(&PlanId::new("p1")).await.unwrap();
    let mut session = EditSession::new(plan, TimelineConfig::default());
    session.enter_edit();
    session.reorder(1, 1, 0).unwrap();
    session.choose_mode(1, 1, ModeChoice::Walk).unwrap();

    let saved = session.save(&api).await.unwrap();
    assert_eq!(saved.spots[0].id.as_str(), "ps2");
    assert!(!session.is_editing());

    let body = captured.lock().unwrap().clone().unwrap();
    let spots = body["spots"].as_array().unwrap();
    assert_eq!(spots[0]["id"], "ps2");
    assert_eq!(spots[0]["startTime"], "09:00");
    // Nishiki (60 min) then the default 20 minutes of travel.
    assert_eq!(spots[1]["startTime"], "10:20");
    assert_eq!(spots[1]["transportMode"], "walk");
    assert_eq!(spots[1]["transportDuration"], 30);
}

#[tokio::test]
async fn failed_save_keeps_edits() {
    let router = Router::new().route(
        "/api/plans/:id",
        get(|| async { Json(plan_json("p1", sample_spots())) }).put(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "database unavailable"})),
            )
        }),
    );
    let base = spawn_backend(router).await;
    let api = client(&base, Session::new());

    let plan = api.get_plan(&PlanId::new("p1")).await.unwrap();
    let mut session = EditSession::new(plan, TimelineConfig::default());
    session.enter_edit();
    session.set_stay(1, 0, 45).unwrap();

    let err = session.save(&api).await.unwrap_err();
    assert_eq!(err.user_message(), "database unavailable");
    assert!(session.is_editing());
    assert_eq!(session.spots()[0].stay_minutes(), 45);
}

#[tokio::test]
async fn spot_search_passes_filters() {
    let router = Router::new().route(
        "/api/spots",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            Json(json!([{
                "id": 1,
                "name": format!("{} in {}", params["keyword"], params["area"]),
                "category": params.get("category"),
                "latitude": 34.69, "longitude": 135.50
            }]))
        }),
    );
    let base = spawn_backend(router).await;
    let api = client(&base, Session::new());

    let query = SpotQuery::keyword("ramen")
        .with_area("Osaka")
        .with_category(SpotCategory::Food);
    let spots = api.search_spots(&query).await.unwrap();

    assert_eq!(spots.len(), 1);
    assert_eq!(spots[0].name, "ramen in Osaka");
    assert_eq!(spots[0].category, SpotCategory::Food);
    assert!(spots[0].location.is_some());
}

#[tokio::test]
async fn debounced_search_publishes_latest_results() {
    let router = Router::new().route(
        "/api/spots",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            Json(json!([{"id": "s1", "name": params["keyword"]}]))
        }),
    );
    let base = spawn_backend(router).await;
    let api = client(&base, Session::new());

    let mut search = SpotSearch::new(api, Duration::from_millis(20));
    let mut updates = search.subscribe();
    search.query(SpotQuery::keyword("ky"));
    search.query(SpotQuery::keyword("kyoto"));

    let spots = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            updates.changed().await.unwrap();
            if let SearchState::Ready(spots) = &*updates.borrow_and_update() {
                return spots.clone();
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(spots.len(), 1);
    assert_eq!(spots[0].name, "kyoto");
}

#[tokio::test]
async fn folders_list_and_create() {
    let hits = Arc::new(AtomicU32::new(0));
    let router = Router::new()
        .route(
            "/api/folders",
            get(|| async {
                Json(json!([
                    {"id": "f1", "name": "Japan", "parent_id": null},
                    {"id": "f2", "name": "Kansai", "parent_id": "f1"}
                ]))
            })
            .post(|State(hits): State<Arc<AtomicU32>>, Json(body): Json<Value>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({"id": "f3", "name": body["name"], "parent_id": body["parent_id"]}))
            }),
        )
        .with_state(hits.clone());
    let base = spawn_backend(router).await;
    let api = client(&base, Session::new());

    let folders = api.list_folders().await.unwrap();
    let tree = crate::domain::build_folder_tree(&folders);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].children[0].folder.name, "Kansai");

    let created = api
        .create_folder("  Osaka ", Some(&FolderId::new("f2")))
        .await
        .unwrap();
    assert_eq!(created.name, "Osaka");
    assert_eq!(created.parent_id, Some(FolderId::new("f2")));

    let err = api.create_folder("   ", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn move_plan_between_folders() {
    let router = Router::new().route(
        "/api/plans/:id",
        axum::routing::put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
            let mut plan = plan_json(&id, json!([]));
            plan["folder_id"] = body["folder_id"].clone();
            Json(plan)
        }),
    );
    let base = spawn_backend(router).await;
    let api = client(&base, Session::new());

    let folder = FolderId::new("f1");
    let plan = api
        .move_plan_to_folder(&PlanId::new("p1"), Some(&folder))
        .await
        .unwrap();
    assert_eq!(plan.folder_id, Some(folder));

    let plan = api.move_plan_to_folder(&PlanId::new("p1"), None).await.unwrap();
    assert_eq!(plan.folder_id, None);
}

#[tokio::test]
async fn stay_dates_are_sent_and_validated() {
    let captured: Captured = Arc::default();
    let router = Router::new()
        .route(
            "/api/plans/:id",
            axum::routing::put(
                |State(captured): State<Captured>,
                 Path(id): Path<String>,
                 Json(body): Json<Value>| async move {
                    let mut plan = plan_json(&id, json!([]));
                    plan["check_in_date"] = body["check_in_date"].clone();
                    plan["check_out_date"] = body["check_out_date"].clone();
                    *captured.lock().unwrap() = Some(body);
                    Json(plan)
                },
            ),
        )
        .with_state(captured.clone());
    let base = spawn_backend(router).await;
    let api = client(&base, Session::new());

    let check_in = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
    let check_out = NaiveDate::from_ymd_opt(2026, 5, 3).unwrap();
    let plan = api
        .update_plan_dates(&PlanId::new("p1"), Some(check_in), Some(check_out))
        .await
        .unwrap();
    assert_eq!(plan.check_in_date, Some(check_in));
    assert_eq!(plan.check_out_date, Some(check_out));
    assert_eq!(
        captured.lock().unwrap().take(),
        Some(json!({"check_in_date": "2026-05-01", "check_out_date": "2026-05-03"}))
    );

    // Only the set date is sent.
    api.update_plan_dates(&PlanId::new("p1"), Some(check_in), None)
        .await
        .unwrap();
    assert_eq!(
        captured.lock().unwrap().take(),
        Some(json!({"check_in_date": "2026-05-01"}))
    );

    let err = api
        .update_plan_dates(&PlanId::new("p1"), Some(check_out), Some(check_in))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Invalid(DomainError::InvalidStayDates)));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(captured.lock().unwrap().is_none());

    let same_day = api
        .update_plan_dates(&PlanId::new("p1"), Some(check_in), Some(check_in))
        .await;
    assert!(same_day.is_err());
    assert!(captured.lock().unwrap().is_none());
}

#[tokio::test]
async fn ids_are_encoded_as_single_path_segment() {
    let router = Router::new()
        .route(
            "/api/plans/:id",
            get(|Path(id): Path<String>| async move { Json(plan_json(&id, json!([]))) }),
        )
        .route(
            "/api/spots/bulk-add-jobs/:job_id",
            get(|Path(job_id): Path<String>| async move {
                Json(json!({"success": true, "job_id": job_id, "job_status": "processing"}))
            }),
        );
    let base = spawn_backend(router).await;
    let api = client(&base, Session::new());

    let plan = api.get_plan(&PlanId::new("trip/2026?draft")).await.unwrap();
    assert_eq!(plan.id.as_str(), "trip/2026?draft");

    let report = api.bulk_job_status("job/1#a").await.unwrap();
    assert_eq!(report.job_status, Some(JobStatus::Processing));
}

#[tokio::test]
async fn bulk_job_polled_until_finished() {
    let calls = Arc::new(AtomicU32::new(0));
    let router = Router::new()
        .route(
            "/api/spots/bulk-add-jobs/:job_id",
            get(|State(calls): State<Arc<AtomicU32>>, Path(job_id): Path<String>| async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 2 {
                    return (StatusCode::BAD_GATEWAY, Json(json!({"detail": "upstream"})));
                }
                let status = if n < 4 { "processing" } else { "succeeded" };
                (
                    StatusCode::OK,
                    Json(json!({
                        "success": true, "imported": n, "job_id": job_id, "job_status": status
                    })),
                )
            }),
        )
        .with_state(calls.clone());
    let base = spawn_backend(router).await;
    let api = client(&base, Session::new());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let progress = seen.clone();
    let handle = api.watch_bulk_job("job-1", Duration::from_millis(10), move |report| {
        progress.lock().unwrap().push(report.imported);
    });

    let report = tokio::time::timeout(Duration::from_secs(5), handle.join())
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(report.job_status, Some(JobStatus::Succeeded));
    assert_eq!(report.imported, 4);
    // The failed check is skipped, not fatal.
    assert_eq!(*seen.lock().unwrap(), vec![1, 3, 4]);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn bulk_job_without_status_keeps_polling() {
    let calls = Arc::new(AtomicU32::new(0));
    let router = Router::new()
        .route(
            "/api/spots/bulk-add-jobs/:job_id",
            get(|State(calls): State<Arc<AtomicU32>>, Path(job_id): Path<String>| async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Json(json!({"imported": n, "job_id": job_id}))
                } else {
                    Json(json!({"imported": n, "job_id": job_id, "job_status": "completed"}))
                }
            }),
        )
        .with_state(calls.clone());
    let base = spawn_backend(router).await;
    let api = client(&base, Session::new());

    let handle = api.watch_bulk_job("job-2", Duration::from_millis(10), |_| {});
    let report = tokio::time::timeout(Duration::from_secs(5), handle.join())
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(report.job_status, Some(JobStatus::Completed));
    assert_eq!(report.imported, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn bulk_job_stops_for_unknown_job() {
    let router = Router::new().route(
        "/api/spots/bulk-add-jobs/:job_id",
        get(|| async { (StatusCode::NOT_FOUND, Json(json!({"detail": "Job not found"}))) }),
    );
    let base = spawn_backend(router).await;
    let api = client(&base, Session::new());

    let handle = api.watch_bulk_job("gone", Duration::from_millis(10), |_| {});
    let result = tokio::time::timeout(Duration::from_secs(5), handle.join())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(result, Err(ApiError::Backend { status: 404, .. })));
}
