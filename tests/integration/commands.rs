//! Headless commands end to end

use crate::common::{csv_settings, logging, mock_services};
use pretty_assertions::assert_eq;
use resume_sender::commands::{self, ExportTarget};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[test_log::test(tokio::test)]
async fn test_send_reports_success_text() {
    let (server, services) = mock_services().await;
    Mock::given(method("POST"))
        .and(path("/api/send-email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Email sent"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let message = commands::send_email(&services, "Jobs@Globex.example").await.unwrap();

    assert_eq!(message, "Email sent successfully to jobs@globex.example");
}

#[test_log::test(tokio::test)]
async fn test_send_failure_is_an_error() {
    let (server, services) = mock_services().await;
    Mock::given(method("POST"))
        .and(path("/api/send-email"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "invalid address"})),
        )
        .mount(&server)
        .await;

    let err = commands::send_email(&services, "nope").await.unwrap_err();

    assert_eq!(err.to_string(), "invalid address");
}

#[test_log::test(tokio::test)]
async fn test_send_blank_address_never_reaches_server() {
    let (server, services) = mock_services().await;
    Mock::given(method("POST"))
        .and(path("/api/send-email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = commands::send_email(&services, "  ").await.unwrap_err();

    assert_eq!(err.to_string(), "Please enter a valid email address.");
}

#[test_log::test(tokio::test)]
async fn test_export_careers_writes_file() {
    logging::log_test_step("Exporting careers through the command");

    let (server, services) = mock_services().await;
    Mock::given(method("GET"))
        .and(path("/api/careers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "companyName": "Acme", "careerLink": "https://acme.example/careers"}
        ])))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let written = commands::export(&services, ExportTarget::Careers, &csv_settings(dir.path()))
        .await
        .unwrap()
        .expect("one career is exported");

    let content = std::fs::read_to_string(&written).unwrap();
    assert_eq!(
        content.lines().collect::<Vec<_>>(),
        vec![
            "Company Name,Career Page Link",
            "Acme,https://acme.example/careers"
        ]
    );
}

#[test_log::test(tokio::test)]
async fn test_export_of_empty_collection_writes_no_file() {
    let (server, services) = mock_services().await;
    Mock::given(method("GET"))
        .and(path("/api/referrals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let written = commands::export(&services, ExportTarget::Referrals, &csv_settings(dir.path()))
        .await
        .unwrap();

    assert_eq!(written, None);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test_log::test(tokio::test)]
async fn test_export_reports_load_failure() {
    let (server, services) = mock_services().await;
    Mock::given(method("GET"))
        .and(path("/api/emails"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let err = commands::export(&services, ExportTarget::History, &csv_settings(dir.path()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to load emails: Failed to fetch data");
}

#[test_log::test(tokio::test)]
async fn test_ping() {
    let (server, services) = mock_services().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    assert!(commands::ping(services.outreach.as_ref()).await.unwrap());
}
