//! HTTP client behavior: endpoints, bodies and error mapping

use crate::common::{logging, mock_service, test_data};
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use resume_sender::api::{ApiClient, ApiError, EditableApi, OutreachApi, ResourceApi};
use resume_sender::models::{CareerDraft, CareerEntry, EmailRecord, EmailStatus, ReferralEntry};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[test_log::test(tokio::test)]
async fn test_list_careers() {
    logging::init_test_logging();
    let (server, client) = mock_service().await;
    Mock::given(method("GET"))
        .and(path("/api/careers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data::careers_json(&[
            (1, "Acme", "https://acme.example/careers"),
            (2, "Globex", "https://globex.example/jobs"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let careers: Vec<CareerEntry> = ResourceApi::<CareerEntry>::list(&client).await.unwrap();

    logging::log_test_data("careers", &careers);
    assert_eq!(
        careers,
        vec![
            test_data::career(1, "Acme", "https://acme.example/careers"),
            test_data::career(2, "Globex", "https://globex.example/jobs"),
        ]
    );
}

#[test_log::test(tokio::test)]
async fn test_list_history_reads_server_timestamps() {
    let (server, client) = mock_service().await;
    Mock::given(method("GET"))
        .and(path("/api/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 9, "email": "hr@acme.example", "sentAt": "2026-01-05T15:04:00", "status": "SUCCESS"}
        ])))
        .mount(&server)
        .await;

    let history: Vec<EmailRecord> = ResourceApi::<EmailRecord>::list(&client).await.unwrap();

    assert_eq!(
        history,
        vec![test_data::email_record(9, "hr@acme.example", EmailStatus::Success)]
    );
}

#[test_log::test(tokio::test)]
async fn test_history_row_with_unknown_status_is_kept_as_failed() {
    let (server, client) = mock_service().await;
    Mock::given(method("GET"))
        .and(path("/api/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "email": "hr@acme.example", "sentAt": "2026-01-05T15:04:00", "status": "SUCCESS"},
            {"id": 2, "email": "jobs@globex.example", "sentAt": "2026-01-05T15:04:00", "status": null},
            {"id": 3, "email": "hi@initech.example", "sentAt": "2026-01-05T15:04:00", "status": "PENDING"}
        ])))
        .mount(&server)
        .await;

    let history: Vec<EmailRecord> = ResourceApi::<EmailRecord>::list(&client).await.unwrap();

    assert_eq!(
        history,
        vec![
            test_data::email_record(1, "hr@acme.example", EmailStatus::Success),
            test_data::email_record(2, "jobs@globex.example", EmailStatus::Failure),
            test_data::email_record(3, "hi@initech.example", EmailStatus::Failure),
        ]
    );
}

#[test_log::test(tokio::test)]
async fn test_update_sends_draft_to_item_url() {
    let (server, client) = mock_service().await;
    Mock::given(method("PUT"))
        .and(path("/api/careers/3"))
        .and(body_json(json!({
            "companyName": "Acme Corp",
            "careerLink": "https://acme.example/careers"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "companyName": "Acme Corp",
            "careerLink": "https://acme.example/careers"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let draft = CareerDraft::new("Acme Corp", "https://acme.example/careers");
    let updated: CareerEntry = EditableApi::<CareerEntry>::update(&client, 3, &draft)
        .await
        .unwrap();

    assert_eq!(updated.company_name, "Acme Corp");
}

#[test_log::test(tokio::test)]
async fn test_delete_accepts_empty_body() {
    let (server, client) = mock_service().await;
    Mock::given(method("DELETE"))
        .and(path("/api/referrals/4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    EditableApi::<ReferralEntry>::delete(&client, 4).await.unwrap();
}

#[test_log::test(tokio::test)]
async fn test_error_status_carries_server_message() {
    let (server, client) = mock_service().await;
    Mock::given(method("POST"))
        .and(path("/api/send-email"))
        .and(body_json(json!({"email": "nope"})))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "invalid address"})),
        )
        .mount(&server)
        .await;

    let err = client.send_email("nope").await.unwrap_err();

    assert_matches!(
        err,
        ApiError::Application { status: 400, message: Some(ref m) } if m == "invalid address"
    );
}

#[test_log::test(tokio::test)]
async fn test_error_status_without_json_body() {
    let (server, client) = mock_service().await;
    Mock::given(method("GET"))
        .and(path("/api/templates"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client.fetch_template().await.unwrap_err();

    assert_matches!(err, ApiError::Application { status: 503, message: None });
    assert_eq!(err.user_message(), "Request failed (503)");
}

#[test_log::test(tokio::test)]
async fn test_unexpected_body_is_a_decode_error() {
    let (server, client) = mock_service().await;
    Mock::given(method("GET"))
        .and(path("/api/careers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = ResourceApi::<CareerEntry>::list(&client).await.unwrap_err();

    assert_matches!(err, ApiError::Decode(_));
}

#[test_log::test(tokio::test)]
async fn test_unreachable_server_is_a_network_error() {
    let client = ApiClient::with_timeout("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();

    let err = client.ping().await.unwrap_err();

    assert!(err.is_network());
    assert_eq!(err.user_message(), "Could not connect to the server.");
}

#[test_log::test(tokio::test)]
async fn test_ping_expects_pong() {
    let (server, client) = mock_service().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong\n"))
        .mount(&server)
        .await;

    assert!(client.ping().await.unwrap());
}

#[test_log::test(tokio::test)]
async fn test_template_is_fetched() {
    let (server, client) = mock_service().await;
    Mock::given(method("GET"))
        .and(path("/api/templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subject": "Application for Software Engineer",
            "body": "Hello,\n\nPlease find my resume attached."
        })))
        .mount(&server)
        .await;

    let template = client.fetch_template().await.unwrap();

    assert_eq!(template.subject, "Application for Software Engineer");
    assert!(template.body.contains("resume attached"));
}
