//! Integration tests for personal report generation and viewing.

mod common;

use axum::http::{header::CONTENT_TYPE, StatusCode};
use chrono::Utc;
use common::{first_question, get_request, TestApp};
use domain::models::answer::NewAnswer;
use persistence::EventStore;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

/// Published event with one participant who answered once; returns the
/// participant id.
async fn answered_participant(app: &TestApp, code: &str) -> String {
    let event = app.published_event(code, Utc::now()).await;
    let (slot_id, question_id) = first_question(&event);
    let participant_id = app.join(code, None).await;

    let (status, _) = app
        .post(
            "/api/v1/answers",
            json!({
                "slot_id": slot_id,
                "participant_id": participant_id,
                "answers": { question_id: { "text": "We talked to ten food banks" } }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    participant_id
}

#[tokio::test]
async fn test_generate_and_fetch_report() {
    let app = TestApp::new();
    let participant_id = answered_participant(&app, "REPORT1").await;

    let (status, generated) = app
        .post(
            "/api/v1/reports/generate",
            json!({ "participantId": participant_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", generated);
    assert_eq!(generated["generator"], "placeholder");
    assert_eq!(
        generated["webview_url"],
        format!("http://localhost:3000/api/v1/reports/{}/view", participant_id)
    );
    assert_eq!(generated["report"]["timeline"][0]["slot_title"], "Kickoff");

    let (status, details) = app
        .get(&format!("/api/v1/reports/{}", participant_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["report"]["id"], generated["report_id"]);
    assert_eq!(details["event"]["code"], "REPORT1");
    assert_eq!(details["summary"]["total_answers"], 1);
    assert!(details["report"]["pdf_url"].is_null());
}

#[tokio::test]
async fn test_regenerate_keeps_single_report() {
    let app = TestApp::new();
    let participant_id = answered_participant(&app, "UPSERT").await;
    let body = json!({ "participant_id": participant_id });

    let (_, first) = app.post("/api/v1/reports/generate", body.clone()).await;
    let (_, second) = app.post("/api/v1/reports/generate", body).await;
    assert_eq!(first["report_id"], second["report_id"]);
}

#[tokio::test]
async fn test_tag_frequency_is_case_sensitive() {
    let app = TestApp::new();
    let event = app.published_event("TAGS", Utc::now()).await;
    let (slot_id, question_id) = first_question(&event);
    let participant_id = app.join("TAGS", None).await;

    for tags in [vec!["demo", "pivot"], vec!["Demo", "pivot"]] {
        app.store
            .create_answer(NewAnswer {
                participant_id: Uuid::parse_str(&participant_id).unwrap(),
                slot_id: Uuid::parse_str(&slot_id).unwrap(),
                question_id: Uuid::parse_str(&question_id).unwrap(),
                text: "Shipped the demo".to_string(),
                audio_url: None,
                photo_url: None,
                tags: tags.into_iter().map(String::from).collect(),
                summary_2: vec!["Shipped the demo".to_string()],
            })
            .await
            .unwrap();
    }

    app.post(
        "/api/v1/reports/generate",
        json!({ "participant_id": participant_id }),
    )
    .await;
    let (_, details) = app
        .get(&format!("/api/v1/reports/{}", participant_id))
        .await;

    let frequency = &details["summary"]["tag_frequency"];
    assert_eq!(frequency["demo"], 1);
    assert_eq!(frequency["Demo"], 1);
    assert_eq!(frequency["pivot"], 2);
    assert_eq!(details["summary"]["total_tags"], 4);
}

#[tokio::test]
async fn test_report_view_renders_html() {
    let app = TestApp::new();
    let participant_id = answered_participant(&app, "VIEWME").await;
    app.post(
        "/api/v1/reports/generate",
        json!({ "participant_id": participant_id }),
    )
    .await;
    let (_, details) = app
        .get(&format!("/api/v1/reports/{}", participant_id))
        .await;
    let nickname = details["participant"]["nickname"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/reports/{}/view",
            participant_id
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains(&nickname));
    assert!(html.contains("VIEWME Hackathon"));
}

#[tokio::test]
async fn test_report_missing_before_generation() {
    let app = TestApp::new();
    let participant_id = answered_participant(&app, "NOTYET").await;

    let (status, body) = app
        .get(&format!("/api/v1/reports/{}", participant_id))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Report not found");

    let (status, _) = app
        .post(
            "/api/v1/reports/generate",
            json!({ "participant_id": Uuid::new_v4() }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_reports_for_whole_event() {
    let app = TestApp::new();
    answered_participant(&app, "BATCH").await;
    app.join("BATCH", None).await;
    app.join("BATCH", None).await;

    let (status, body) = app
        .post("/api/v1/events/BATCH/reports/generate", json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["event_code"], "BATCH");
    assert_eq!(body["participants"], 3);
    assert_eq!(body["generated"], 3);
    assert_eq!(body["failed"], 0);

    let (status, _) = app
        .post("/api/v1/events/NOBODY/reports/generate", json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
