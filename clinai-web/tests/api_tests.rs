//! Integration tests for clinai-web API endpoints
//!
//! Tests cover:
//! - Health and build info endpoints
//! - Form UI serving
//! - Form submission → result page
//! - JSON analysis and tier boundaries
//! - Report download
//! - Input validation and oracle failure responses
//! - Request body size limit

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use clinai_common::{AppContext, FeatureSchema, FeatureVector, ScoringOracle};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method
use clinai_web::{build_router, AppState, MAX_BODY_BYTES};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../clinai-common/tests/fixtures")
        .join(name)
}

/// Test helper: app backed by the fixture XGBoost model
fn setup_app() -> axum::Router {
    let context = AppContext::load(
        &fixture("readmission_model.json"),
        &fixture("feature_columns.json"),
    )
    .expect("Should load fixture model");
    build_router(AppState::new(context))
}

/// Oracle that always answers with the same probability
struct FixedOracle(f64);

impl ScoringOracle for FixedOracle {
    fn predict_proba(&self, _features: &FeatureVector) -> clinai_common::Result<f64> {
        Ok(self.0)
    }

    fn describe(&self) -> String {
        "fixed".to_string()
    }
}

/// Oracle that rejects every vector
struct BrokenOracle;

impl ScoringOracle for BrokenOracle {
    fn predict_proba(&self, _features: &FeatureVector) -> clinai_common::Result<f64> {
        Err(clinai_common::Error::ContractViolation(
            "vector does not match".to_string(),
        ))
    }

    fn describe(&self) -> String {
        "broken".to_string()
    }
}

/// Test helper: app with a custom oracle
fn setup_app_with(oracle: Arc<dyn ScoringOracle>) -> axum::Router {
    let schema = FeatureSchema::load(&fixture("feature_columns.json")).unwrap();
    build_router(AppState::new(AppContext::new(schema, oracle)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract body as text
async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    serde_json::from_str(&extract_text(body).await).expect("Should parse JSON")
}

// =============================================================================
// Health / build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "clinai-web");
    assert!(body["version"].is_string());
    assert_eq!(body["feature_columns"], 18);
}

#[tokio::test]
async fn test_buildinfo_describes_model() {
    let app = setup_app();

    let response = app.oneshot(get("/api/buildinfo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["git_hash"].is_string());
    assert_eq!(body["model"], "xgboost gbtree, 3 trees, 18 features");
}

// =============================================================================
// UI
// =============================================================================

#[tokio::test]
async fn test_index_serves_form() {
    let app = setup_app();

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = extract_text(response.into_body()).await;
    assert!(html.contains(r#"<form method="post" action="/analyze">"#));
    assert!(html.contains(r#"name="diagnosis_code""#));
}

#[tokio::test]
async fn test_css_served() {
    let app = setup_app();

    let response = app.oneshot(get("/static/app.css")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
}

#[tokio::test]
async fn test_form_submission_renders_result() {
    let app = setup_app();

    let form = "age=65&gender=Male&length_of_stay=7&previous_admissions=2\
                &comorbidity_count=2&num_medications=10&diagnosis_code=I50.9\
                &creatinine=1.2&hemoglobin=12.0&glucose=110";
    let response = app.oneshot(post_form("/analyze", form)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = extract_text(response.into_body()).await;
    // Fixture model scores the reference patient at 22.3%
    assert!(html.contains("22.3%"));
    assert!(html.contains("LOW RISK"));
    assert!(html.contains("Proceed with standard discharge protocol"));
    assert!(html.contains("data:text/html;base64,"));
}

#[tokio::test]
async fn test_form_out_of_range_rejected() {
    let app = setup_app();

    let response = app
        .oneshot(post_form("/analyze", "age=12&gender=Female"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

// =============================================================================
// JSON analysis
// =============================================================================

#[tokio::test]
async fn test_analyze_reference_patient() {
    let app = setup_app();

    let response = app
        .oneshot(post_json("/api/analyze", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["tier"], "LOW");
    assert_eq!(body["risk_percent"], 22.3);
    assert_eq!(body["color"], "#2a9d8f");
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 3);

    let id = body["report_id"].as_str().unwrap();
    assert!(id.starts_with("CAI-"));
    assert_eq!(id.len(), 16);
}

#[tokio::test]
async fn test_analyze_high_risk_patient() {
    let app = setup_app();

    let profile = json!({
        "age": 78,
        "gender": "Female",
        "length_of_stay": 10,
        "previous_admissions": 5,
        "comorbidity_count": 4,
        "diagnosis_code": "I50.9"
    });
    let response = app.oneshot(post_json("/api/analyze", &profile)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["tier"], "HIGH");
    assert_eq!(body["risk_percent"], 70.1);
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_analyze_tier_boundaries() {
    for (p, tier) in [(0.5, "HIGH"), (0.4999, "MODERATE"), (0.3, "MODERATE"), (0.2999, "LOW")] {
        let app = setup_app_with(Arc::new(FixedOracle(p)));
        let response = app
            .oneshot(post_json("/api/analyze", &json!({})))
            .await
            .unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["tier"], tier, "p = {}", p);
    }
}

#[tokio::test]
async fn test_analyze_invalid_input() {
    let app = setup_app();

    let response = app
        .oneshot(post_json("/api/analyze", &json!({"glucose": 900.0})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert!(body["error"]["message"].as_str().unwrap().contains("glucose"));
}

#[tokio::test]
async fn test_analyze_malformed_json() {
    let app = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_analyze_misspelled_field_rejected() {
    let app = setup_app();

    let response = app
        .oneshot(post_json("/api/analyze", &json!({"glucos": 900.0, "creatinin": 9.5})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("glucos"));
}

#[tokio::test]
async fn test_form_misspelled_field_rejected() {
    let app = setup_app();

    let response = app
        .oneshot(post_form("/analyze", "age=70&glucos=900"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_without_json_content_type() {
    let app = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
}

#[tokio::test]
async fn test_oracle_failure_is_surfaced() {
    let app = setup_app_with(Arc::new(BrokenOracle));

    let response = app
        .oneshot(post_json("/api/analyze", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "CONTRACT_VIOLATION");
}

#[tokio::test]
async fn test_out_of_range_probability_is_surfaced() {
    let app = setup_app_with(Arc::new(FixedOracle(1.7)));

    let response = app
        .oneshot(post_json("/api/analyze", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "ORACLE_ERROR");
}

// =============================================================================
// Report download
// =============================================================================

#[tokio::test]
async fn test_report_download() {
    let app = setup_app();

    let response = app
        .oneshot(post_json("/api/report", &json!({"diagnosis_code": "J18.9"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Clinical_AI_Official_Report.html\""
    );
    let report_id = headers["x-report-id"].to_str().unwrap().to_string();

    let html = extract_text(response.into_body()).await;
    assert!(html.contains(&format!("Report ID: {}", report_id)));
    assert!(html.contains("<td>Diagnosis Code</td><td>J18.9</td>"));
    assert!(html.contains("<td>Risk Category</td><td>LOW</td>"));
    assert!(html.contains("<svg"));
}

// =============================================================================
// Body size limit
// =============================================================================

#[tokio::test]
async fn test_body_size_limit() {
    let app = setup_app();

    let padding = "x".repeat(MAX_BODY_BYTES + 1024);
    let body = format!(r#"{{"diagnosis_code": "I50.9", "padding": "{}"}}"#, padding);
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
}
