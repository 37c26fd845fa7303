//! Common test utilities and helpers

use resume_sender::api::{ApiClient, Services};
use resume_sender::export::{ExportFormat, ExportSettings};
use std::path::Path;
use std::time::Duration;
use wiremock::MockServer;

/// Test data utilities
pub mod test_data {
    use chrono::NaiveDate;
    use resume_sender::models::{CareerEntry, EmailRecord, EmailStatus, ReferralEntry};
    use serde_json::{json, Value};

    pub fn career(id: i64, company_name: &str, career_link: &str) -> CareerEntry {
        CareerEntry {
            id,
            company_name: company_name.to_string(),
            career_link: career_link.to_string(),
        }
    }

    pub fn referral(id: i64, company_name: &str, linked_in_url: &str) -> ReferralEntry {
        ReferralEntry {
            id,
            company_name: company_name.to_string(),
            linked_in_url: linked_in_url.to_string(),
        }
    }

    pub fn email_record(id: i64, email: &str, status: EmailStatus) -> EmailRecord {
        EmailRecord {
            id,
            email: email.to_string(),
            sent_at: NaiveDate::from_ymd_opt(2026, 1, 5)
                .unwrap()
                .and_hms_opt(15, 4, 0)
                .unwrap(),
            status,
        }
    }

    /// Career rows the way the service serializes them
    pub fn careers_json(rows: &[(i64, &str, &str)]) -> Value {
        Value::Array(
            rows.iter()
                .map(|(id, name, link)| json!({"id": id, "companyName": name, "careerLink": link}))
                .collect(),
        )
    }
}

/// Logging utilities for tests
pub mod logging {
    use std::sync::Once;
    use tracing::{debug, info};

    static INIT: Once = Once::new();

    /// Initialize test logging
    pub fn init_test_logging() {
        INIT.call_once(|| {
            // Only initialize if not already initialized
            let _ = tracing::subscriber::set_global_default(
                tracing_subscriber::fmt()
                    .with_env_filter("resume_sender=debug")
                    .with_test_writer()
                    .finish(),
            );
        });
    }

    /// Log test step
    pub fn log_test_step(step: &str) {
        info!("🧪 Test Step: {}", step);
    }

    /// Log test data
    pub fn log_test_data<T: std::fmt::Debug>(label: &str, data: &T) {
        debug!("📊 {}: {:?}", label, data);
    }
}

/// A mock outreach service and a client pointed at it
pub async fn mock_service() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::with_timeout(&server.uri(), Duration::from_secs(5))
        .expect("mock server uri is a valid base url");
    (server, client)
}

pub async fn mock_services() -> (MockServer, Services) {
    let (server, client) = mock_service().await;
    (server, Services::from_client(client))
}

pub fn csv_settings(dir: &Path) -> ExportSettings {
    ExportSettings {
        dir: dir.to_path_buf(),
        format: ExportFormat::Csv,
    }
}
