//! End-to-end tests driving the HTTP boundary through the router, backed by
//! in-memory storage.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use hazard_ingest::pipeline::storage::{InMemoryStorage, Storage};
use hazard_ingest::server::create_router;

fn app() -> Router {
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    create_router(storage)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn bulletin_request() -> Value {
    json!({
        "provider_id": "prov-001",
        "provider_name": "Mountain Weather Co",
        "record_type": "bulletin",
        "payload": {
            "danger": "considerable",
            "issued_at": "2024-01-15T12:00:00Z",
            "summary": "High danger on steep slopes.",
            "region": "North Cascades",
            "lat": 48.5,
            "lon": -121.3,
        },
    })
}

#[tokio::test]
async fn health_returns_ok() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn ingest_bulletin_returns_normalized_record() {
    let response = app()
        .oneshot(post_json("/ingest", bulletin_request()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let record = &body["record"];
    assert_eq!(record["record_type"], "bulletin");
    assert_eq!(record["severity"], "considerable");
    assert_eq!(record["provider_id"], "prov-001");
    assert_eq!(record["region"], "North Cascades");
    assert_eq!(record["location"]["lat"], json!(48.5));
    assert!(record["record_id"].is_string());
    assert!(record["ingested_at"].is_string());
    // The raw payload is persisted verbatim for audit.
    assert_eq!(record["raw_payload"]["danger"], "considerable");
    assert_eq!(body["quality_flags"], json!([]));
}

#[tokio::test]
async fn ingest_observation_and_weather() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/ingest",
            json!({
                "provider_id": "prov-002",
                "provider_name": "Field Observer",
                "record_type": "observation",
                "payload": {
                    "observed_at": "2024-02-10T09:00:00Z",
                    "notes": "Natural avalanche activity.",
                    "latitude": 39.5,
                    "longitude": -106.0,
                    "hazard_level": "high",
                    "snow_depth_cm": 200,
                },
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["record"]["record_type"], "observation");
    assert_eq!(body["record"]["severity"], "high");
    assert_eq!(body["record"]["location"]["lat"], json!(39.5));
    assert_eq!(body["record"]["metrics"]["snow_depth_cm"], json!(200));

    let response = app
        .oneshot(post_json(
            "/ingest",
            json!({
                "provider_id": "prov-003",
                "provider_name": "Weather Station Network",
                "record_type": "weather",
                "payload": {
                    "recorded_at": "2024-03-01T06:00:00Z",
                    "conditions": "Clear and cold.",
                    "lat": 46.8,
                    "lon": -121.7,
                    "temperature_f": 18.0,
                    "wind_speed_mph": 25,
                },
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["record"]["record_type"], "weather");
    assert_eq!(body["record"]["metrics"]["temperature_f"], json!(18.0));
}

#[tokio::test]
async fn ingest_unsupported_type_returns_422() {
    let response = app()
        .oneshot(post_json(
            "/ingest",
            json!({
                "provider_id": "prov-001",
                "provider_name": "Test",
                "record_type": "forecast",
                "payload": {},
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("forecast"));
    assert!(detail.contains("bulletin"));
}

#[tokio::test]
async fn ingest_empty_payload_reports_quality_flags() {
    let response = app()
        .oneshot(post_json(
            "/ingest",
            json!({
                "provider_id": "prov-001",
                "provider_name": "Test",
                "record_type": "bulletin",
                "payload": {},
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["quality_flags"],
        json!(["missing_coordinates", "missing_timestamp", "unknown_severity", "empty_summary"])
    );
}

#[tokio::test]
async fn batch_ingest_isolates_failures() {
    let response = app()
        .oneshot(post_json(
            "/ingest/batch",
            json!({
                "records": [
                    {
                        "provider_id": "prov-001",
                        "provider_name": "Provider A",
                        "record_type": "bulletin",
                        "payload": {"danger": "high", "issued_at": "2024-01-15T12:00:00Z", "summary": "Test"},
                    },
                    {
                        "provider_id": "prov-bad",
                        "provider_name": "Bad Provider",
                        "record_type": "invalid_type",
                        "payload": {},
                    },
                ],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["success_count"], 1);
    assert_eq!(body["failed_count"], 1);
    assert_eq!(body["results"][0]["success"], true);
    assert_eq!(body["results"][1]["success"], false);
    assert!(body["results"][1]["error"].as_str().unwrap().contains("invalid_type"));
}

#[tokio::test]
async fn list_records_with_filters() {
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    let app = create_router(storage);

    for (record_type, payload) in [
        ("bulletin", json!({"danger": "moderate", "issued_at": "2024-01-15T12:00:00Z", "summary": "Moderate conditions.", "lat": 48.5, "lon": -121.3})),
        ("weather", json!({"recorded_at": "2024-01-15T12:00:00Z", "conditions": "Clear.", "lat": 48.5, "lon": -121.3})),
    ] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/ingest",
                json!({
                    "provider_id": "prov-001",
                    "provider_name": "Test Provider",
                    "record_type": record_type,
                    "payload": payload,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(get("/records")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(get("/records?record_type=bulletin"))
        .await
        .unwrap();
    let records = body_json(response).await;
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["record_type"], "bulletin");

    let response = app
        .clone()
        .oneshot(get("/records?severity=moderate"))
        .await
        .unwrap();
    let records = body_json(response).await;
    assert!(records
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["severity"] == "moderate"));

    let response = app
        .oneshot(get("/records?provider_id=someone-else"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn get_record_by_id_and_not_found() {
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    let app = create_router(storage);

    let response = app
        .clone()
        .oneshot(post_json("/ingest", bulletin_request()))
        .await
        .unwrap();
    let record_id = body_json(response).await["record"]["record_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(get(&format!("/records/{record_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["record_id"], record_id.as_str());

    let response = app.oneshot(get("/records/nonexistent-id")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn normalize_payload_read_from_file() {
    use hazard_ingest::domain::ProviderMeta;
    use hazard_ingest::pipeline::normalize;
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"danger": "4", "issued_at": "2024-01-15T12:00:00Z", "summary": "High danger.", "lat": 48.5, "lon": -121.3}}"#
    )
    .unwrap();

    let raw = std::fs::read_to_string(file.path()).unwrap();
    let payload: Value = serde_json::from_str(&raw).unwrap();
    let meta = ProviderMeta {
        provider_id: "local".into(),
        provider_name: "Local File".into(),
    };
    let fragment = normalize::dispatch("bulletin", &payload, &meta).unwrap();
    assert_eq!(fragment.severity.as_str(), "high");
    assert!(fragment.quality_flags.is_empty());
}

#[tokio::test]
async fn records_context_renders_summary_lines() {
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    let app = create_router(storage);

    let response = app
        .clone()
        .oneshot(post_json("/ingest", bulletin_request()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/records/context")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    let line = body["context"][0].as_str().unwrap();
    assert!(line.starts_with("[bulletin] Mountain Weather Co | North Cascades"));
    assert!(line.contains("severity=considerable"));
    assert!(line.contains("coords=48.5,-121.3"));
}
