use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{ControllerError, StatusMessage};
use crate::api::{ApiError, OutreachApi};
use crate::models::SendEmailResponse;
use crate::notifier::{Notifier, ResourceEvent};

const INVALID_ADDRESS: &str = "Please enter a valid email address.";
const SEND_FAILED: &str = "Failed to send email";
const UNREACHABLE: &str = "Could not connect to the server.";

type SendResult = (String, Result<SendEmailResponse, ApiError>);

/// The single-field "send my resume" form
pub struct ComposeForm {
    api: Arc<dyn OutreachApi>,
    notifier: Notifier,
    email: String,
    sending: bool,
    status: Option<StatusMessage>,
    tx: mpsc::UnboundedSender<SendResult>,
    rx: mpsc::UnboundedReceiver<SendResult>,
}

impl ComposeForm {
    pub fn new(api: Arc<dyn OutreachApi>, notifier: Notifier) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            notifier,
            email: String::new(),
            sending: false,
            status: None,
            tx,
            rx,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// The address input; `None` while a send is in flight
    pub fn email_mut(&mut self) -> Option<&mut String> {
        if self.sending {
            None
        } else {
            Some(&mut self.email)
        }
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Validate the address and send it; the outcome lands on the next `poll`
    pub fn submit(&mut self) -> Result<(), ControllerError> {
        if self.sending {
            return Err(ControllerError::Busy);
        }
        let address = self.email.trim().to_string();
        if address.is_empty() {
            self.status = Some(StatusMessage::error(INVALID_ADDRESS));
            return Err(ControllerError::Invalid(INVALID_ADDRESS.to_string()));
        }

        self.sending = true;
        self.status = None;
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        info!("📧 Sending resume to {}", address);
        tokio::spawn(async move {
            let result = api.send_email(&address).await;
            let _ = tx.send((address, result));
        });
        Ok(())
    }

    pub fn poll(&mut self) {
        while let Ok((address, result)) = self.rx.try_recv() {
            self.apply(address, result);
        }
    }

    pub async fn settle(&mut self) {
        while self.sending {
            match self.rx.recv().await {
                Some((address, result)) => self.apply(address, result),
                None => break,
            }
        }
    }

    fn apply(&mut self, address: String, result: Result<SendEmailResponse, ApiError>) {
        self.sending = false;
        match result {
            Ok(_) => {
                info!("✅ Email sent to {}", address);
                self.status = Some(StatusMessage::success(format!(
                    "Email sent successfully to {}",
                    address.to_lowercase()
                )));
                self.email.clear();
                self.notifier.publish(ResourceEvent::EmailSent);
            }
            Err(ApiError::Application { status, message }) => {
                warn!("Send to {} rejected with status {}", address, status);
                self.status = Some(StatusMessage::error(
                    message.unwrap_or_else(|| SEND_FAILED.to_string()),
                ));
            }
            Err(e) => {
                // An unreadable reply is reported like a dropped connection
                warn!("Send to {} failed: {}", address, e);
                self.status = Some(StatusMessage::error(UNREACHABLE));
            }
        }
    }
}
