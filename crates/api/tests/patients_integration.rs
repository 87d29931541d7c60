//! Integration tests for patients, professionals and plan limits.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_patient_crud() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let user = app.register().await;
    let token = &user.access_token;

    let created = app
        .post(
            "/api/v1/patients",
            token,
            json!({
                "name": "Ana Souza",
                "email": "ana.souza@example.com",
                "phone": "+55 (11) 98765-4321",
                "birthDate": "1990-04-12"
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.text);
    assert_eq!(created.body["status"], "active");
    assert!(created.body.get("userId").is_none());
    assert!(created.body.get("warnings").is_none());
    let id = created.body["id"].as_str().unwrap().to_string();

    let updated = app
        .put(
            &format!("/api/v1/patients/{}", id),
            token,
            json!({"status": "inactive", "notes": "Alta em março"}),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["status"], "inactive");
    assert_eq!(updated.body["name"], "Ana Souza");

    let fetched = app.get(&format!("/api/v1/patients/{}", id), token).await;
    assert_eq!(fetched.body["notes"], "Alta em março");

    let deleted = app.delete(&format!("/api/v1/patients/{}", id), token).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let missing = app.get(&format!("/api/v1/patients/{}", id), token).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patient_list_filters() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let user = app.register().await;
    let token = &user.access_token;

    for (name, status) in [
        ("Bruno Lima", "active"),
        ("Carla Mendes", "active"),
        ("Bruna Dias", "inactive"),
    ] {
        let response = app
            .post("/api/v1/patients", token, json!({"name": name, "status": status}))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let all = app.get("/api/v1/patients", token).await;
    assert_eq!(all.body["total"], 3);

    let active = app.get("/api/v1/patients?status=active", token).await;
    assert_eq!(active.body["total"], 2);

    let search = app.get("/api/v1/patients?search=brun", token).await;
    assert_eq!(search.body["total"], 2);
}

#[tokio::test]
async fn test_patient_validation() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let user = app.register().await;

    let response = app
        .post(
            "/api/v1/patients",
            &user.access_token,
            json!({"name": "   ", "email": "nope"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "validation_error");
    assert!(response.body["details"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn test_tenants_cannot_see_each_other() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let owner = app.register().await;
    let other = app.register().await;
    let patient_id = app.create_patient(&owner).await;
    let uri = format!("/api/v1/patients/{}", patient_id);

    assert_eq!(
        app.get(&uri, &other.access_token).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.put(&uri, &other.access_token, json!({"name": "Hijack"}))
            .await
            .status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.delete(&uri, &other.access_token).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/api/v1/patients", &other.access_token).await.body["total"],
        0
    );

    assert_eq!(app.get(&uri, &owner.access_token).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_basic_plan_professional_limit() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let user = app.register().await;

    // Basic allows one professional: the first create already sits at 100%.
    let first = app.create_professional(&user, json!([])).await;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.text);
    let warnings = first.body["warnings"].as_array().unwrap();
    assert_eq!(warnings[0]["resourceType"], "professionals");
    assert_eq!(warnings[0]["level"], "blocked");

    let second = app.create_professional(&user, json!([])).await;
    assert_eq!(second.status, StatusCode::FORBIDDEN);
    assert_eq!(second.body["error"], "plan_limit_reached");

    let usage = app
        .get("/api/v1/subscription/usage", &user.access_token)
        .await;
    assert_eq!(usage.body["planType"], "basic");
    assert_eq!(usage.body["professionals"]["current"], 1);
    assert_eq!(usage.body["professionals"]["limit"], 1);
    assert_eq!(usage.body["banner"]["resourceType"], "professionals");

    // Freeing the slot allows a new professional.
    let id = first.body["id"].as_str().unwrap();
    app.delete(&format!("/api/v1/professionals/{}", id), &user.access_token)
        .await;
    let third = app.create_professional(&user, json!([])).await;
    assert_eq!(third.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_patient_usage_warning_from_eighty_percent() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let user = app.register().await;

    for _ in 0..39 {
        app.create_patient(&user).await;
    }

    // 40 of 50 is 80%.
    let fortieth = app
        .post(
            "/api/v1/patients",
            &user.access_token,
            json!({"name": "Paciente Quarenta"}),
        )
        .await;
    assert_eq!(fortieth.status, StatusCode::CREATED);
    let warning = &fortieth.body["warnings"][0];
    assert_eq!(warning["level"], "warning");
    assert_eq!(warning["current"], 40);
    assert_eq!(warning["remaining"], 10);

    let usage = app
        .get("/api/v1/subscription/usage", &user.access_token)
        .await;
    assert_eq!(usage.body["patients"]["level"], "warning");
}

#[tokio::test]
async fn test_professional_filters_and_updates() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let user = app.register().await;
    let token = &user.access_token;

    let created = app
        .create_professional(&user, json!(["friday", "monday", "monday"]))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["workDays"], json!(["monday", "friday"]));
    let id = created.body["id"].as_str().unwrap();

    let updated = app
        .put(
            &format!("/api/v1/professionals/{}", id),
            token,
            json!({"active": false}),
        )
        .await;
    assert_eq!(updated.body["active"], false);

    let active_only = app.get("/api/v1/professionals?activeOnly=true", token).await;
    assert_eq!(active_only.body["total"], 0);
    let all = app.get("/api/v1/professionals", token).await;
    assert_eq!(all.body["total"], 1);
}
