mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{send, sign_up, test_app};

#[tokio::test]
async fn patient_doctor_mapping_lifecycle() {
    let app = test_app();
    let (alice, alice_id) = sign_up(&app, "alice").await;

    let (status, patient) = send(
        &app,
        Method::POST,
        "/api/patients/",
        Some(&alice),
        Some(json!({ "name": "Bob", "age": 30, "gender": "M", "medical_history": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(patient["data"]["user"], alice_id);
    let patient_id = patient["data"]["id"].as_i64().unwrap();

    let (status, doctor) = send(
        &app,
        Method::POST,
        "/api/doctors/",
        Some(&alice),
        Some(json!({ "name": "Dr. X", "specialization": "Cardio", "email": "x@y.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let doctor_id = doctor["data"]["id"].as_i64().unwrap();

    let (status, mapping) = send(
        &app,
        Method::POST,
        "/api/mappings/",
        Some(&alice),
        Some(json!({ "patient": patient_id, "doctor": doctor_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let mapping_id = mapping["data"]["id"].as_i64().unwrap();
    let mapping_uri = format!("/api/mappings/{}/", mapping_id);

    let (status, assigned) = send(
        &app,
        Method::GET,
        &format!("/api/patients/{}/doctors/", patient_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assigned["data"][0]["id"], doctor_id);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/doctors/{}/", doctor_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send(&app, Method::GET, &mapping_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn caller_supplied_owner_is_ignored() {
    let app = test_app();
    let (alice, alice_id) = sign_up(&app, "alice").await;
    let (_, mallory_id) = sign_up(&app, "mallory").await;

    let (status, patient) = send(
        &app,
        Method::POST,
        "/api/patients/",
        Some(&alice),
        Some(json!({ "name": "Bob", "age": 30, "gender": "M", "user": mallory_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(patient["data"]["user"], alice_id);
    assert!(patient["data"]["medical_history"].is_null());

    let uri = format!("/api/patients/{}/", patient["data"]["id"]);
    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "name": "Robert", "age": 31, "gender": "M", "user": mallory_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["name"], "Robert");
    assert_eq!(updated["data"]["user"], alice_id);
}

#[tokio::test]
async fn deleting_the_account_cascades_to_patient_and_mappings() {
    let app = test_app();
    let (alice, _) = sign_up(&app, "alice").await;
    let (other, _) = sign_up(&app, "olivia").await;

    let (_, patient) = send(
        &app,
        Method::POST,
        "/api/patients/",
        Some(&alice),
        Some(json!({ "name": "Bob", "age": 30, "gender": "M" })),
    )
    .await;
    let patient_id = patient["data"]["id"].as_i64().unwrap();

    let mut mapped = Vec::new();
    for name in ["Dr. A", "Dr. B"] {
        let (_, doctor) = send(
            &app,
            Method::POST,
            "/api/doctors/",
            Some(&alice),
            Some(json!({ "name": name, "specialization": "General", "email": "gp@clinic.org" })),
        )
        .await;
        let doctor_id = doctor["data"]["id"].as_i64().unwrap();
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/mappings/",
            Some(&alice),
            Some(json!({ "patient": patient_id, "doctor": doctor_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        mapped.push(doctor_id);
    }

    let (status, _) = send(&app, Method::DELETE, "/api/auth/user/", Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // the old token no longer resolves to a user
    let (status, _) = send(&app, Method::GET, "/api/patients/", Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // doctors survive; nothing references them any more
    let (_, doctors) = send(&app, Method::GET, "/api/doctors/", Some(&other), None).await;
    assert_eq!(doctors["data"].as_array().unwrap().len(), mapped.len());
    let (_, mappings) = send(&app, Method::GET, "/api/mappings/", Some(&other), None).await;
    assert!(mappings["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn other_users_patients_are_not_found() {
    let app = test_app();
    let (alice, _) = sign_up(&app, "alice").await;
    let (eve, _) = sign_up(&app, "eve").await;

    let (_, patient) = send(
        &app,
        Method::POST,
        "/api/patients/",
        Some(&alice),
        Some(json!({ "name": "Bob", "age": 30, "gender": "M" })),
    )
    .await;
    let uri = format!("/api/patients/{}/", patient["data"]["id"]);

    let (_, listed) = send(&app, Method::GET, "/api/patients/", Some(&eve), None).await;
    assert!(listed["data"].as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::GET, &uri, Some(&eve), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::PATCH, &uri, Some(&eve), Some(json!({ "age": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&eve), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn second_patient_for_a_user_conflicts() {
    let app = test_app();
    let (alice, _) = sign_up(&app, "alice").await;
    let body = json!({ "name": "Bob", "age": 30, "gender": "M" });

    let (status, _) = send(&app, Method::POST, "/api/patients/", Some(&alice), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, err) = send(&app, Method::POST, "/api/patients/", Some(&alice), Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "CONFLICT");
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let app = test_app();
    let (alice, _) = sign_up(&app, "alice").await;

    for uri in ["/api/patients/999/", "/api/doctors/999/", "/api/mappings/999/", "/api/doctors/abc/"] {
        let (status, body) = send(&app, Method::GET, uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn invalid_fields_name_the_offender() {
    let app = test_app();
    let (alice, _) = sign_up(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/patients/",
        Some(&alice),
        Some(json!({ "name": "Bob", "age": "thirty", "gender": "M" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["age"], "A valid integer is required.");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/doctors/",
        Some(&alice),
        Some(json!({ "name": "Dr. Y", "specialization": "ENT", "email": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["email"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/mappings/",
        Some(&alice),
        Some(json!({ "patient": 41, "doctor": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["patient"].is_string());
    assert!(body["field_errors"]["doctor"].is_string());
}
