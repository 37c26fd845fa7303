use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::LoadPhase;
use crate::api::{ApiError, OutreachApi};
use crate::models::TemplateContent;

/// Loads the read-only email template once per mount
pub struct TemplateController {
    api: Arc<dyn OutreachApi>,
    content: Option<TemplateContent>,
    phase: LoadPhase,
    generation: u64,
    pending: bool,
    tx: mpsc::UnboundedSender<(u64, Result<TemplateContent, ApiError>)>,
    rx: mpsc::UnboundedReceiver<(u64, Result<TemplateContent, ApiError>)>,
}

impl TemplateController {
    pub fn new(api: Arc<dyn OutreachApi>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            content: None,
            phase: LoadPhase::Idle,
            generation: 0,
            pending: false,
            tx,
            rx,
        }
    }

    pub fn mount(&mut self) {
        self.generation += 1;
        self.load();
    }

    pub fn unmount(&mut self) {
        self.generation += 1;
        self.pending = false;
        self.content = None;
        self.phase = LoadPhase::Idle;
    }

    pub fn load(&mut self) {
        self.pending = true;
        self.phase = LoadPhase::Loading;
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        debug!("Loading email template");
        tokio::spawn(async move {
            let result = api.fetch_template().await;
            let _ = tx.send((generation, result));
        });
    }

    pub fn poll(&mut self) {
        while let Ok((generation, result)) = self.rx.try_recv() {
            self.apply(generation, result);
        }
    }

    pub async fn settle(&mut self) {
        while self.pending {
            match self.rx.recv().await {
                Some((generation, result)) => self.apply(generation, result),
                None => break,
            }
        }
    }

    fn apply(&mut self, generation: u64, result: Result<TemplateContent, ApiError>) {
        if generation != self.generation {
            return;
        }
        self.pending = false;
        match result {
            Ok(content) => {
                info!("📄 Template loaded ({} chars)", content.body.len());
                self.content = Some(content);
                self.phase = LoadPhase::Ready;
            }
            Err(e) => {
                warn!("Failed to fetch template: {}", e);
                self.phase = LoadPhase::Failed(e.user_message());
            }
        }
    }

    pub fn content(&self) -> Option<&TemplateContent> {
        self.content.as_ref()
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.pending
    }
}
