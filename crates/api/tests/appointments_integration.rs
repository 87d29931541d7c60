//! Integration tests for booking and appointment status transitions.

mod common;

use axum::http::StatusCode;
use common::{TestApp, TestUser};
use domain::models::AppointmentStatus;
use persistence::repositories::{AppointmentRepository, AppointmentUpdateInput};
use serde_json::{json, Value};
use uuid::Uuid;

// 2030-01-07 is a Monday.
const MONDAY: &str = "2030-01-07";
const TUESDAY: &str = "2030-01-08";

async fn setup(app: &TestApp) -> (TestUser, String, String) {
    let user = app.register().await;
    let patient_id = app.create_patient(&user).await;
    let professional = app.create_professional(&user, json!(["monday"])).await;
    assert_eq!(professional.status, StatusCode::CREATED);
    let professional_id = professional.body["id"].as_str().unwrap().to_string();
    (user, patient_id, professional_id)
}

fn booking(patient_id: &str, professional_id: &str, date: &str) -> Value {
    json!({
        "patientId": patient_id,
        "professionalId": professional_id,
        "date": date,
        "time": "14:30",
    })
}

#[tokio::test]
async fn test_book_appointment() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (user, patient_id, professional_id) = setup(&app).await;

    let response = app
        .post(
            "/api/v1/appointments",
            &user.access_token,
            booking(&patient_id, &professional_id, MONDAY),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
    assert_eq!(response.body["status"], "scheduled");
    assert_eq!(response.body["durationMinutes"], 50);
    assert_eq!(response.body["time"], "14:30");
    assert!(response.body["patientName"].is_string());
    assert!(response.body["professionalName"].is_string());
}

#[tokio::test]
async fn test_booking_outside_work_days_rejected() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (user, patient_id, professional_id) = setup(&app).await;

    let response = app
        .post(
            "/api/v1/appointments",
            &user.access_token,
            booking(&patient_id, &professional_id, TUESDAY),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"]
        .as_str()
        .unwrap()
        .contains("tuesday"));
}

#[tokio::test]
async fn test_booking_unknown_references() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (user, patient_id, professional_id) = setup(&app).await;
    let stranger = app.register().await;
    let foreign_patient = app.create_patient(&stranger).await;

    let response = app
        .post(
            "/api/v1/appointments",
            &user.access_token,
            booking(&foreign_patient, &professional_id, MONDAY),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Patient not found");

    let response = app
        .post(
            "/api/v1/appointments",
            &user.access_token,
            booking(&patient_id, &uuid::Uuid::new_v4().to_string(), MONDAY),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Professional not found");
}

#[tokio::test]
async fn test_invalid_time_rejected() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (user, patient_id, professional_id) = setup(&app).await;

    let mut body = booking(&patient_id, &professional_id, MONDAY);
    body["time"] = json!("25:00");
    let response = app
        .post("/api/v1/appointments", &user.access_token, body)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_transitions() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (user, patient_id, professional_id) = setup(&app).await;
    let token = &user.access_token;

    let created = app
        .post(
            "/api/v1/appointments",
            token,
            booking(&patient_id, &professional_id, MONDAY),
        )
        .await;
    let uri = format!(
        "/api/v1/appointments/{}/status",
        created.body["id"].as_str().unwrap()
    );

    let cancelled = app.patch(&uri, token, json!({"status": "cancelled"})).await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.body["status"], "cancelled");

    let rescheduled = app.patch(&uri, token, json!({"status": "scheduled"})).await;
    assert_eq!(rescheduled.body["status"], "scheduled");

    let same = app.patch(&uri, token, json!({"status": "scheduled"})).await;
    assert_eq!(same.status, StatusCode::OK);

    let completed = app.patch(&uri, token, json!({"status": "completed"})).await;
    assert_eq!(completed.body["status"], "completed");

    let reopened = app.patch(&uri, token, json!({"status": "scheduled"})).await;
    assert_eq!(reopened.status, StatusCode::CONFLICT);
    let cancel_done = app.patch(&uri, token, json!({"status": "cancelled"})).await;
    assert_eq!(cancel_done.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_and_list_appointments() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (user, patient_id, professional_id) = setup(&app).await;
    let token = &user.access_token;

    let created = app
        .post(
            "/api/v1/appointments",
            token,
            booking(&patient_id, &professional_id, MONDAY),
        )
        .await;
    let uri = format!(
        "/api/v1/appointments/{}",
        created.body["id"].as_str().unwrap()
    );

    // Moving to a day the professional does not work is refused.
    let moved = app.put(&uri, token, json!({"date": TUESDAY})).await;
    assert_eq!(moved.status, StatusCode::BAD_REQUEST);

    let updated = app
        .put(&uri, token, json!({"time": "09:00", "durationMinutes": 30}))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["time"], "09:00");
    assert_eq!(updated.body["durationMinutes"], 30);
    assert_eq!(updated.body["date"], MONDAY);

    let listed = app
        .get(
            &format!("/api/v1/appointments?from={}&to={}", MONDAY, MONDAY),
            token,
        )
        .await;
    assert_eq!(listed.body["total"], 1);

    let empty = app
        .get("/api/v1/appointments?status=completed", token)
        .await;
    assert_eq!(empty.body["total"], 0);

    let inverted = app
        .get("/api/v1/appointments?from=2030-02-01&to=2030-01-01", token)
        .await;
    assert_eq!(inverted.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.delete(&uri, token).await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&uri, token).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_patient_removes_appointments() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (user, patient_id, professional_id) = setup(&app).await;
    let token = &user.access_token;

    app.post(
        "/api/v1/appointments",
        token,
        booking(&patient_id, &professional_id, MONDAY),
    )
    .await;
    app.delete(&format!("/api/v1/patients/{}", patient_id), token)
        .await;

    let listed = app.get("/api/v1/appointments", token).await;
    assert_eq!(listed.body["total"], 0);
}

#[tokio::test]
async fn test_update_clears_notes() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (user, patient_id, professional_id) = setup(&app).await;
    let token = &user.access_token;

    let mut body = booking(&patient_id, &professional_id, MONDAY);
    body["notes"] = json!("Trazer exames anteriores");
    let created = app.post("/api/v1/appointments", token, body).await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.text);
    assert_eq!(created.body["notes"], "Trazer exames anteriores");
    let uri = format!(
        "/api/v1/appointments/{}",
        created.body["id"].as_str().unwrap()
    );

    // Omitted notes are kept.
    let kept = app.put(&uri, token, json!({"time": "10:00"})).await;
    assert_eq!(kept.body["notes"], "Trazer exames anteriores");

    let cleared = app.put(&uri, token, json!({"notes": ""})).await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.body["notes"].is_null());
}

#[tokio::test]
async fn test_update_guarded_on_current_status() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (user, patient_id, professional_id) = setup(&app).await;
    let created = app
        .post(
            "/api/v1/appointments",
            &user.access_token,
            booking(&patient_id, &professional_id, MONDAY),
        )
        .await;
    let id: Uuid = created.body["id"].as_str().unwrap().parse().unwrap();

    let repo = AppointmentRepository::new(app.pool.clone());
    let input = AppointmentUpdateInput {
        patient_id: patient_id.parse().unwrap(),
        professional_id: professional_id.parse().unwrap(),
        date: MONDAY.parse().unwrap(),
        time: "11:00".to_string(),
        duration_minutes: 50,
        notes: None,
        status: AppointmentStatus::Completed,
    };

    // A writer that read a stale status loses.
    let stale = repo
        .update(user.id, id, AppointmentStatus::Cancelled, &input)
        .await
        .unwrap();
    assert!(stale.is_none());

    let applied = repo
        .update(user.id, id, AppointmentStatus::Scheduled, &input)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(applied.appointment.status, AppointmentStatus::Completed);
    assert_eq!(applied.appointment.time, "11:00");
}
