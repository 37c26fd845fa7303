use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{
    CareerEntry, Editable, EmailRecord, ReferralEntry, Resource, SendEmailResponse,
    TemplateContent,
};

pub mod client;
pub use client::ApiClient;

/// Failure talking to the outreach service
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport failed before a response arrived
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("server returned status {status}")]
    Application { status: u16, message: Option<String> },

    /// A 2xx response whose body was not the expected JSON
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Text shown in an inline status pill
    pub fn user_message(&self) -> String {
        self.message_or(None)
    }

    /// Like [`user_message`](Self::user_message), with `fallback` for a bare error status
    pub fn user_message_or(&self, fallback: &str) -> String {
        self.message_or(Some(fallback))
    }

    fn message_or(&self, fallback: Option<&str>) -> String {
        match self {
            ApiError::Network(_) => "Could not connect to the server.".to_string(),
            ApiError::Application {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Application { status, .. } => match fallback {
                Some(text) => text.to_string(),
                None => format!("Request failed ({})", status),
            },
            ApiError::Decode(_) => "The server sent an unexpected response.".to_string(),
            ApiError::InvalidUrl(e) => format!("Invalid server address: {}", e),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

/// Read access to one resource collection
#[async_trait]
pub trait ResourceApi<R: Resource>: Send + Sync {
    async fn list(&self) -> Result<Vec<R>, ApiError>;
}

/// Write access to an editable collection
#[async_trait]
pub trait EditableApi<R: Editable>: ResourceApi<R> {
    async fn create(&self, draft: &R::Draft) -> Result<R, ApiError>;
    async fn update(&self, id: i64, draft: &R::Draft) -> Result<R, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

/// Endpoints outside the CRUD collections
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutreachApi: Send + Sync {
    async fn send_email(&self, email: &str) -> Result<SendEmailResponse, ApiError>;
    async fn fetch_template(&self) -> Result<TemplateContent, ApiError>;
    /// `true` when the service answers `pong`
    async fn ping(&self) -> Result<bool, ApiError>;
}

/// The trait objects every controller is built from
#[derive(Clone)]
pub struct Services {
    pub outreach: Arc<dyn OutreachApi>,
    pub careers: Arc<dyn EditableApi<CareerEntry>>,
    pub referrals: Arc<dyn EditableApi<ReferralEntry>>,
    pub history: Arc<dyn ResourceApi<EmailRecord>>,
}

impl Services {
    /// All endpoints served by one HTTP client
    pub fn from_client(client: ApiClient) -> Self {
        let client = Arc::new(client);
        Self {
            outreach: client.clone(),
            careers: client.clone(),
            referrals: client.clone(),
            history: client,
        }
    }
}
