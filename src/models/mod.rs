use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;
use std::path::PathBuf;
use url::Url;

use crate::export::ExportFormat;
use crate::notifier::ResourceEvent;

/// A remote collection the list views mirror
pub trait Resource: Clone + Debug + Send + Sync + 'static {
    /// Body sent on create/update. Read-only resources use [`ReadOnly`].
    type Draft: EntryDraft;

    /// Collection path under `/api/`
    const COLLECTION: &'static str;

    /// Singular label used in messages ("Career", "Referral", ...)
    const LABEL: &'static str;

    fn id(&self) -> i64;

    /// Text the search box matches against
    fn search_key(&self) -> &str;

    /// Whether a view of this resource should reload when `event` is published
    fn refreshed_by(event: ResourceEvent) -> bool;
}

/// Resources that can be created, edited and deleted from the UI
pub trait Editable: Resource {
    fn to_draft(&self) -> Self::Draft;

    /// The entry's URL column
    fn link(&self) -> &str;
}

/// The two editable fields every entry form has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    CompanyName,
    Link,
}

impl DraftField {
    pub fn next(self) -> Self {
        match self {
            DraftField::CompanyName => DraftField::Link,
            DraftField::Link => DraftField::CompanyName,
        }
    }
}

/// Form payload for an editable entry
pub trait EntryDraft: Clone + Debug + Send + Sync + Serialize + 'static {
    /// Label shown next to the link input
    const LINK_LABEL: &'static str;

    fn field(&self, field: DraftField) -> &str;

    fn field_mut(&mut self, field: DraftField) -> &mut String;

    /// Client-side checks the HTML form used to enforce (`required`, `type=url`)
    fn validate(&self) -> Result<(), String> {
        if self.field(DraftField::CompanyName).trim().is_empty() {
            return Err("Company name is required.".to_string());
        }
        let link = self.field(DraftField::Link).trim();
        if link.is_empty() {
            return Err(format!("{} is required.", Self::LINK_LABEL));
        }
        match Url::parse(link) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
            _ => Err(format!("{} must be a valid http(s) URL.", Self::LINK_LABEL)),
        }
    }
}

/// Draft type for resources that are never written from the UI
#[derive(Debug, Clone, Serialize)]
pub enum ReadOnly {}

impl EntryDraft for ReadOnly {
    const LINK_LABEL: &'static str = "";

    fn field(&self, _field: DraftField) -> &str {
        match *self {}
    }

    fn field_mut(&mut self, _field: DraftField) -> &mut String {
        match *self {}
    }
}

/// Outcome recorded for a sent email
///
/// The service stores the status as free text. Anything other than `SUCCESS`, including a
/// missing or `null` value, reads as a failure.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub enum EmailStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[default]
    #[serde(rename = "FAILURE")]
    Failure,
}

impl<'de> Deserialize<'de> for EmailStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some("SUCCESS") => EmailStatus::Success,
            _ => EmailStatus::Failure,
        })
    }
}

impl EmailStatus {
    pub fn label(self) -> &'static str {
        match self {
            EmailStatus::Success => "Sent",
            EmailStatus::Failure => "Failed",
        }
    }
}

/// One row of the send history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    pub id: i64,
    pub email: String,
    pub sent_at: NaiveDateTime,
    #[serde(default)]
    pub status: EmailStatus,
}

impl Resource for EmailRecord {
    type Draft = ReadOnly;
    const COLLECTION: &'static str = "emails";
    const LABEL: &'static str = "Email";

    fn id(&self) -> i64 {
        self.id
    }

    fn search_key(&self) -> &str {
        &self.email
    }

    fn refreshed_by(event: ResourceEvent) -> bool {
        event == ResourceEvent::EmailSent
    }
}

/// A tracked company career page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareerEntry {
    pub id: i64,
    pub company_name: String,
    pub career_link: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareerDraft {
    pub company_name: String,
    pub career_link: String,
}

impl CareerDraft {
    pub fn new(company_name: impl Into<String>, career_link: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            career_link: career_link.into(),
        }
    }
}

impl EntryDraft for CareerDraft {
    const LINK_LABEL: &'static str = "Career Page URL";

    fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::CompanyName => &self.company_name,
            DraftField::Link => &self.career_link,
        }
    }

    fn field_mut(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::CompanyName => &mut self.company_name,
            DraftField::Link => &mut self.career_link,
        }
    }
}

impl Resource for CareerEntry {
    type Draft = CareerDraft;
    const COLLECTION: &'static str = "careers";
    const LABEL: &'static str = "Career";

    fn id(&self) -> i64 {
        self.id
    }

    fn search_key(&self) -> &str {
        &self.company_name
    }

    fn refreshed_by(event: ResourceEvent) -> bool {
        event == ResourceEvent::CareerAdded
    }
}

impl Editable for CareerEntry {
    fn to_draft(&self) -> CareerDraft {
        CareerDraft::new(&self.company_name, &self.career_link)
    }

    fn link(&self) -> &str {
        &self.career_link
    }
}

/// A LinkedIn contact who may refer the applicant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralEntry {
    pub id: i64,
    pub company_name: String,
    pub linked_in_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralDraft {
    pub company_name: String,
    pub linked_in_url: String,
}

impl ReferralDraft {
    pub fn new(company_name: impl Into<String>, linked_in_url: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            linked_in_url: linked_in_url.into(),
        }
    }
}

impl EntryDraft for ReferralDraft {
    const LINK_LABEL: &'static str = "LinkedIn Profile URL";

    fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::CompanyName => &self.company_name,
            DraftField::Link => &self.linked_in_url,
        }
    }

    fn field_mut(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::CompanyName => &mut self.company_name,
            DraftField::Link => &mut self.linked_in_url,
        }
    }
}

impl Resource for ReferralEntry {
    type Draft = ReferralDraft;
    const COLLECTION: &'static str = "referrals";
    const LABEL: &'static str = "Referral";

    fn id(&self) -> i64 {
        self.id
    }

    fn search_key(&self) -> &str {
        &self.company_name
    }

    fn refreshed_by(event: ResourceEvent) -> bool {
        event == ResourceEvent::ReferralAdded
    }
}

impl Editable for ReferralEntry {
    fn to_draft(&self) -> ReferralDraft {
        ReferralDraft::new(&self.company_name, &self.linked_in_url)
    }

    fn link(&self) -> &str {
        &self.linked_in_url
    }
}

/// The reusable outreach email
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TemplateContent {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendEmailRequest {
    pub email: String,
}

/// Body of a send-email response; the backend fills both fields on success and failure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendEmailResponse {
    pub status: Option<String>,
    pub message: Option<String>,
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub export_dir: PathBuf,
    pub export_format: ExportFormat,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            export_dir: PathBuf::from("."),
            export_format: ExportFormat::Xlsx,
            log_file: PathBuf::from("resume_sender.log"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take the defaults, malformed ones are errors
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Config::default();

        let export_format = match lookup("EXPORT_FORMAT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("EXPORT_FORMAT: {}", e))?,
            None => defaults.export_format,
        };
        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                anyhow::anyhow!(
                    "REQUEST_TIMEOUT_SECS: '{}' is not a whole number of seconds",
                    raw
                )
            })?,
            None => defaults.request_timeout_secs,
        };

        Ok(Config {
            api_base_url: lookup("API_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout_secs,
            export_dir: lookup("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            export_format,
            log_file: lookup("LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
        })
    }
}
