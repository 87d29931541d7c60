//! Integration tests for probes, SEO files, cross-cutting middleware and
//! reports.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use chrono::Utc;
use common::{access_token_for, request, TestApp};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::without_database(&[]);
    let response = app
        .send(request(Method::GET, "/api/health/live", None, None))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "alive");
}

#[tokio::test]
async fn test_robots_txt() {
    let app = TestApp::without_database(&[("seo.site_url", "https://clinic.example.com/")]);
    let response = app
        .send(request(Method::GET, "/robots.txt", None, None))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert!(response.text.starts_with("User-agent: *\n"));
    assert!(response.text.contains("Disallow: /api/\n"));
    assert!(response
        .text
        .contains("Sitemap: https://clinic.example.com/sitemap.xml"));
}

#[tokio::test]
async fn test_sitemap_xml() {
    let app = TestApp::without_database(&[("seo.site_url", "https://clinic.example.com")]);
    let response = app
        .send(request(Method::GET, "/sitemap.xml", None, None))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.starts_with("<?xml"));
    assert!(response
        .text
        .contains("<loc>https://clinic.example.com/pricing</loc>"));
    let today = Utc::now().date_naive().to_string();
    assert!(response.text.contains(&format!("<lastmod>{}</lastmod>", today)));
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = TestApp::without_database(&[]);
    let response = app
        .send(request(Method::GET, "/api/health/live", None, None))
        .await;
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert!(response.headers.get(header::STRICT_TRANSPORT_SECURITY).is_none());
}

#[tokio::test]
async fn test_request_id_echoed_or_generated() {
    let app = TestApp::without_database(&[]);

    let echoed = app
        .send(
            Request::builder()
                .method(Method::GET)
                .uri("/api/health/live")
                .header("x-request-id", "req-clinic-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(echoed.headers["x-request-id"], "req-clinic-42");

    let generated = app
        .send(request(Method::GET, "/api/health/live", None, None))
        .await;
    let id = generated.headers["x-request-id"].to_str().unwrap();
    assert!(Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_metrics_endpoint_without_recorder() {
    let app = TestApp::without_database(&[]);
    let response = app.send(request(Method::GET, "/metrics", None, None)).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_report_rejects_inverted_window() {
    let app = TestApp::without_database(&[]);
    let token = access_token_for(&app.config, Uuid::new_v4());
    let response = app
        .get("/api/v1/reports/summary?from=2024-03-10&to=2024-03-01", &token)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "validation_error");
}

#[tokio::test]
async fn test_report_rejects_long_window() {
    let app = TestApp::without_database(&[]);
    let token = access_token_for(&app.config, Uuid::new_v4());
    let response = app
        .get("/api/v1/reports/summary?from=2022-01-01&to=2024-01-01", &token)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rate_limit_per_account() {
    let app = TestApp::without_database(&[("security.rate_limit_per_minute", "2")]);
    let alice = access_token_for(&app.config, Uuid::new_v4());
    let bob = access_token_for(&app.config, Uuid::new_v4());
    // Rejected before any query, so no database is needed.
    let uri = "/api/v1/reports/summary?from=2024-03-10&to=2024-03-01";

    for _ in 0..2 {
        assert_eq!(app.get(uri, &alice).await.status, StatusCode::BAD_REQUEST);
    }
    let limited = app.get(uri, &alice).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = limited.headers[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1);

    // Buckets are per account.
    assert_eq!(app.get(uri, &bob).await.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_report_summary() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let user = app.register().await;
    let token = &user.access_token;
    let patient_id = app.create_patient(&user).await;

    for (date, status) in [
        ("2030-01-07", "present"),
        ("2030-01-08", "late"),
        ("2030-01-09", "absent"),
        ("2030-01-10", "cancelled"),
    ] {
        let response = app
            .put(
                "/api/v1/attendance",
                token,
                json!({"patientId": patient_id, "sessionDate": date, "status": status}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
    }

    let payment = app
        .post(
            "/api/v1/payments",
            token,
            json!({
                "patientId": patient_id,
                "amountCents": 20000,
                "discountCents": 5000,
                "dueDate": "2030-01-15"
            }),
        )
        .await;
    assert_eq!(payment.status, StatusCode::CREATED, "{}", payment.text);
    let payment_id = payment.body["id"].as_str().unwrap();
    let paid = app
        .post(&format!("/api/v1/payments/{}/pay", payment_id), token, json!({}))
        .await;
    assert_eq!(paid.status, StatusCode::OK, "{}", paid.text);

    let report = app
        .get("/api/v1/reports/summary?from=2030-01-01&to=2030-01-31", token)
        .await;
    assert_eq!(report.status, StatusCode::OK, "{}", report.text);
    assert_eq!(report.body["from"], "2030-01-01");
    assert_eq!(report.body["attendance"]["total"], 4);
    assert_eq!(report.body["attendance"]["cancelled"], 1);
    let rate = report.body["attendance"]["attendanceRate"].as_f64().unwrap();
    assert!((rate - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(report.body["payments"]["paid"]["count"], 1);
    assert_eq!(report.body["payments"]["paid"]["netCents"], 15000);
    assert_eq!(report.body["payments"]["billedCents"], 15000);
}
