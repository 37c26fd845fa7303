use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::{ApiError, EditableApi, OutreachApi, ResourceApi};
use crate::models::{
    Config, Editable, Resource, SendEmailRequest, SendEmailResponse, TemplateContent,
};

/// Error body the service sends alongside non-2xx statuses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the outreach service
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new client from configuration
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_timeout(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("resume-sender/0.1")
            .build()?;

        // Url::join drops the last path segment unless the base ends with '/'
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)
            .map_err(|e| anyhow::anyhow!("Invalid API base URL '{}': {}", base_url, e))?;

        info!("🌐 Using outreach service at {}", base_url);
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    fn collection_url<R: Resource>(&self) -> Result<Url, ApiError> {
        self.endpoint(&format!("api/{}", R::COLLECTION))
    }

    fn item_url<R: Resource>(&self, id: i64) -> Result<Url, ApiError> {
        self.endpoint(&format!("api/{}/{}", R::COLLECTION, id))
    }

    /// Send a request and map non-2xx statuses to [`ApiError::Application`]
    async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!("Request failed before a response arrived: {}", e);
            ApiError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);
        warn!("Server responded {} ({:?})", status, message);
        Err(ApiError::Application {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await?;
        debug!("API response received: {} bytes", bytes.len());
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl<R> ResourceApi<R> for ApiClient
where
    R: Resource + DeserializeOwned,
{
    async fn list(&self) -> Result<Vec<R>, ApiError> {
        let url = self.collection_url::<R>()?;
        debug!("GET {}", url);
        let items: Vec<R> = self.fetch_json(self.client.get(url)).await?;
        info!("Retrieved {} {} record(s)", items.len(), R::COLLECTION);
        Ok(items)
    }
}

#[async_trait]
impl<R> EditableApi<R> for ApiClient
where
    R: Editable + DeserializeOwned,
{
    async fn create(&self, draft: &R::Draft) -> Result<R, ApiError> {
        let url = self.collection_url::<R>()?;
        debug!("POST {}", url);
        let created: R = self.fetch_json(self.client.post(url).json(draft)).await?;
        info!("Created {} {}", R::LABEL, created.id());
        Ok(created)
    }

    async fn update(&self, id: i64, draft: &R::Draft) -> Result<R, ApiError> {
        let url = self.item_url::<R>(id)?;
        debug!("PUT {}", url);
        let updated: R = self.fetch_json(self.client.put(url).json(draft)).await?;
        info!("Updated {} {}", R::LABEL, id);
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let url = self.item_url::<R>(id)?;
        debug!("DELETE {}", url);
        // Body is empty on success
        self.execute(self.client.delete(url)).await?;
        info!("Deleted {} {}", R::LABEL, id);
        Ok(())
    }
}

#[async_trait]
impl OutreachApi for ApiClient {
    async fn send_email(&self, email: &str) -> Result<SendEmailResponse, ApiError> {
        let url = self.endpoint("api/send-email")?;
        let body = SendEmailRequest {
            email: email.to_string(),
        };
        debug!("POST {}", url);
        let response: SendEmailResponse =
            self.fetch_json(self.client.post(url).json(&body)).await?;
        info!("✅ Send request accepted for {}", email);
        Ok(response)
    }

    async fn fetch_template(&self) -> Result<TemplateContent, ApiError> {
        let url = self.endpoint("api/templates")?;
        debug!("GET {}", url);
        self.fetch_json(self.client.get(url)).await
    }

    async fn ping(&self) -> Result<bool, ApiError> {
        let url = self.endpoint("ping")?;
        let response = self.execute(self.client.get(url)).await?;
        let body = response.text().await?;
        Ok(body.trim() == "pong")
    }
}
