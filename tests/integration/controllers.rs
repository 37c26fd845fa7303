//! Controllers driven against the mock service, the way the views drive them

use crate::common::{logging, mock_services, test_data};
use pretty_assertions::assert_eq;
use resume_sender::controller::{
    AddEntryForm, CareersController, ComposeForm, EntryKind, HistoryController,
    ReferralsController, StatusMessage,
};
use resume_sender::controller::add_entry::SUCCESS_DISPLAY;
use resume_sender::models::{DraftField, EmailStatus};
use resume_sender::notifier::Notifier;
use serde_json::json;
use std::time::Instant;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[test_log::test(tokio::test)]
async fn test_edit_replaces_entry_after_server_confirms() {
    logging::init_test_logging();
    logging::log_test_step("Renaming a career entry");

    let (server, services) = mock_services().await;
    Mock::given(method("GET"))
        .and(path("/api/careers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data::careers_json(&[
            (3, "Acme", "https://acme.example/careers"),
            (4, "Globex", "https://globex.example/jobs"),
        ])))
        .expect(1)
        .mount(&server)
        .await;
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

    let mut careers = CareersController::new(services.careers.clone(), Notifier::new());
    careers.mount();
    careers.settle().await;
    assert_eq!(careers.items().len(), 2);

    careers.begin_edit(3).unwrap();
    careers.edit_field(DraftField::CompanyName, "Acme Corp").unwrap();
    careers.submit_edit().unwrap();
    // Nothing changes locally until the server answers
    assert_eq!(careers.items()[0].company_name, "Acme");
    careers.settle().await;

    assert_eq!(
        careers.items(),
        &[
            test_data::career(3, "Acme Corp", "https://acme.example/careers"),
            test_data::career(4, "Globex", "https://globex.example/jobs"),
        ]
    );
    assert!(careers.edit_form().is_none());
}

#[test_log::test(tokio::test)]
async fn test_deleting_last_referral_leaves_empty_list() {
    let (server, services) = mock_services().await;
    Mock::given(method("GET"))
        .and(path("/api/referrals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 8, "companyName": "Initech", "linkedInUrl": "https://www.linkedin.com/in/peter"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/referrals/8"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut referrals = ReferralsController::new(services.referrals.clone(), Notifier::new());
    referrals.mount();
    referrals.settle().await;

    referrals.request_delete(8).unwrap();
    referrals.confirm_delete().unwrap();
    assert!(referrals.is_in_flight(8));
    referrals.settle().await;

    assert!(referrals.items().is_empty());
    assert!(referrals.delete_confirmation().is_none());
}

#[test_log::test(tokio::test)]
async fn test_failed_delete_keeps_dialog_open_with_error() {
    let (server, services) = mock_services().await;
    Mock::given(method("GET"))
        .and(path("/api/referrals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 8, "companyName": "Initech", "linkedInUrl": "https://www.linkedin.com/in/peter"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/referrals/8"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "locked"})))
        .mount(&server)
        .await;

    let mut referrals = ReferralsController::new(services.referrals.clone(), Notifier::new());
    referrals.mount();
    referrals.settle().await;
    referrals.request_delete(8).unwrap();
    referrals.confirm_delete().unwrap();
    referrals.settle().await;

    assert_eq!(referrals.items().len(), 1);
    let confirm = referrals.delete_confirmation().unwrap();
    assert!(!confirm.deleting);
    assert_eq!(confirm.error.as_deref(), Some("locked"));
}

#[test_log::test(tokio::test)]
async fn test_added_career_reloads_mounted_list() {
    logging::log_test_step("Adding a career from the shared form");

    let (server, services) = mock_services().await;
    Mock::given(method("GET"))
        .and(path("/api/careers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data::careers_json(&[(
            1,
            "Acme",
            "https://acme.example/careers",
        )])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/careers"))
        .and(body_json(json!({
            "companyName": "Globex",
            "careerLink": "https://globex.example/jobs"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 2,
            "companyName": "Globex",
            "careerLink": "https://globex.example/jobs"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = Notifier::new();
    let mut careers = CareersController::new(services.careers.clone(), notifier.clone());
    careers.mount();
    careers.settle().await;

    let mut form = AddEntryForm::new(services.careers.clone(), services.referrals.clone(), notifier);
    form.open(EntryKind::Career);
    form.set_field(DraftField::CompanyName, " Globex ");
    form.set_field(DraftField::Link, "https://globex.example/jobs");
    form.submit().unwrap();

    let now = Instant::now();
    form.settle(now).await;
    assert_eq!(form.status(), Some(&StatusMessage::success("Career saved!")));
    assert!(form.is_open());

    // The list only hears about it once the form closes
    careers.poll();
    assert!(!careers.is_loading());

    form.update(now + SUCCESS_DISPLAY);
    assert!(!form.is_open());
    careers.poll();
    assert!(careers.is_loading());
    careers.settle().await;
    assert!(careers.error().is_none());
}

#[test_log::test(tokio::test)]
async fn test_invalid_referral_is_not_sent() {
    let (server, services) = mock_services().await;
    Mock::given(method("POST"))
        .and(path("/api/referrals"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut form = AddEntryForm::new(
        services.careers.clone(),
        services.referrals.clone(),
        Notifier::new(),
    );
    form.open(EntryKind::Referral);
    form.set_field(DraftField::CompanyName, "Initech");
    form.set_field(DraftField::Link, "linkedin.com/in/peter");

    assert!(form.submit().is_err());
    assert!(form.status().unwrap().is_error());
    assert!(!form.is_submitting());
}

#[test_log::test(tokio::test)]
async fn test_send_rejection_shows_message_and_keeps_input() {
    let (server, services) = mock_services().await;
    Mock::given(method("POST"))
        .and(path("/api/send-email"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "invalid address"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut compose = ComposeForm::new(services.outreach.clone(), Notifier::new());
    compose.set_email("hr@@acme");
    compose.submit().unwrap();
    compose.settle().await;

    assert_eq!(compose.status(), Some(&StatusMessage::error("invalid address")));
    assert_eq!(compose.email(), "hr@@acme");
}

#[test_log::test(tokio::test)]
async fn test_empty_address_makes_no_request() {
    let (server, services) = mock_services().await;
    Mock::given(method("POST"))
        .and(path("/api/send-email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut compose = ComposeForm::new(services.outreach.clone(), Notifier::new());
    assert!(compose.submit().is_err());

    assert_eq!(
        compose.status(),
        Some(&StatusMessage::error("Please enter a valid email address."))
    );
}

#[test_log::test(tokio::test)]
async fn test_unreadable_send_reply_reads_as_connection_failure() {
    let (server, services) = mock_services().await;
    Mock::given(method("POST"))
        .and(path("/api/send-email"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let mut compose = ComposeForm::new(services.outreach.clone(), Notifier::new());
    compose.set_email("hr@acme.example");
    compose.submit().unwrap();
    compose.settle().await;

    assert_eq!(
        compose.status(),
        Some(&StatusMessage::error("Could not connect to the server."))
    );
}

#[test_log::test(tokio::test)]
async fn test_sent_email_refreshes_history() {
    let (server, services) = mock_services().await;
    Mock::given(method("GET"))
        .and(path("/api/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "email": "hr@acme.example", "sentAt": "2026-01-05T15:04:00", "status": "SUCCESS"}
        ])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/send-email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Email sent"
        })))
        .mount(&server)
        .await;

    let notifier = Notifier::new();
    let mut history = HistoryController::new(services.history.clone(), notifier.clone());
    history.mount();
    history.settle().await;
    assert_eq!(
        history.items(),
        &[test_data::email_record(1, "hr@acme.example", EmailStatus::Success)]
    );

    let mut compose = ComposeForm::new(services.outreach.clone(), notifier);
    compose.set_email("HR@Acme.example");
    compose.submit().unwrap();
    compose.settle().await;
    assert_eq!(
        compose.status(),
        Some(&StatusMessage::success("Email sent successfully to hr@acme.example"))
    );

    history.poll();
    assert!(history.is_loading());
    history.settle().await;
}

#[test_log::test(tokio::test)]
async fn test_failed_load_can_be_retried() {
    let (server, services) = mock_services().await;
    Mock::given(method("GET"))
        .and(path("/api/emails"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut history = HistoryController::new(services.history.clone(), Notifier::new());
    history.mount();
    history.settle().await;
    assert_eq!(history.error(), Some("Failed to fetch data"));

    history.retry();
    history.settle().await;
    assert!(history.error().is_none());
    assert!(history.items().is_empty());
}
