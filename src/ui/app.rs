use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    Frame,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{info, warn};

use super::compose::ComposeView;
use super::history::HistoryView;
use super::layout::TuiLayout;
use super::lists::EntryListView;
use super::modal::AddEntryModal;
use super::templates::TemplatesView;
use super::view::{ViewContext, ViewManager};
use crate::api::{OutreachApi, Services};
use crate::clipboard::Clipboard;
use crate::controller::{
    AddEntryForm, CareersController, ComposeForm, EntryKind, HistoryController,
    ReferralsController, TemplateController,
};
use crate::export::ExportSettings;
use crate::notifier::Notifier;

/// Result of the start-up health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    Checking,
    Online,
    Offline(String),
}

impl ServerStatus {
    fn span(&self) -> Span<'static> {
        match self {
            ServerStatus::Checking => {
                Span::styled("server: checking...", Style::default().fg(Color::Yellow))
            }
            ServerStatus::Online => Span::styled(
                "server: online",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            ServerStatus::Offline(reason) => Span::styled(
                format!("server: offline ({})", reason),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        }
    }
}

/// The full-screen outreach dashboard
pub struct OutreachApp {
    pub should_quit: bool,
    views: ViewManager,
    modal: AddEntryModal,
    clipboard: Box<dyn Clipboard>,
    export: ExportSettings,
    server: ServerStatus,
    ping: Option<oneshot::Receiver<ServerStatus>>,
}

impl OutreachApp {
    pub fn new(services: Services, export: ExportSettings, clipboard: Box<dyn Clipboard>) -> Self {
        let notifier = Notifier::new();

        let mut views = ViewManager::new();
        views.push(Box::new(ComposeView::new(ComposeForm::new(
            Arc::clone(&services.outreach),
            notifier.clone(),
        ))));
        views.push(Box::new(HistoryView::new(HistoryController::new(
            Arc::clone(&services.history),
            notifier.clone(),
        ))));
        views.push(Box::new(EntryListView::new(
            "🏢 Careers",
            "No career pages tracked yet. Press c to add one.",
            CareersController::new(Arc::clone(&services.careers), notifier.clone()),
        )));
        views.push(Box::new(EntryListView::new(
            "🤝 Referrals",
            "No referrals yet. Press l to add one.",
            ReferralsController::new(Arc::clone(&services.referrals), notifier.clone()),
        )));
        views.push(Box::new(TemplatesView::new(TemplateController::new(
            Arc::clone(&services.outreach),
        ))));

        let modal = AddEntryModal::new(AddEntryForm::new(
            Arc::clone(&services.careers),
            Arc::clone(&services.referrals),
            notifier,
        ));

        Self {
            should_quit: false,
            views,
            modal,
            clipboard,
            export,
            server: ServerStatus::Checking,
            ping: Some(spawn_ping(Arc::clone(&services.outreach))),
        }
    }

    /// Mount the first tab; call once inside the runtime before the loop starts
    pub fn start(&mut self) {
        self.views.mount_current();
    }

    pub fn server_status(&self) -> &ServerStatus {
        &self.server
    }

    pub fn current_view(&self) -> usize {
        self.views.selected()
    }

    pub fn modal(&self) -> &AddEntryModal {
        &self.modal
    }

    pub fn draw(&self, f: &mut Frame, now: Instant) {
        let layout = TuiLayout::new(f.area());
        layout.render_tab_bar(f, self.views.titles(), self.views.selected());
        self.views.render(f, layout.content, now);
        layout.render_status_bar(f, &self.views.status(), self.server.span());

        if self.modal.is_open() {
            self.modal.render(f, layout.content);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }
        if self.modal.is_open() {
            self.modal.handle_key(key);
            return Ok(());
        }

        let mut ctx = ViewContext {
            clipboard: self.clipboard.as_mut(),
            export: &self.export,
            now,
        };
        if self.views.handle_key(key, &mut ctx)? {
            return Ok(());
        }

        let capturing = self.views.captures_text();
        match key.code {
            KeyCode::Tab => self.views.cycle(true),
            KeyCode::BackTab => self.views.cycle(false),
            _ if capturing => {}
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Char(c @ '1'..='5') => {
                self.views.select(c as usize - '1' as usize)?;
            }
            KeyCode::Char('c') => self.modal.open(EntryKind::Career),
            KeyCode::Char('l') => self.modal.open(EntryKind::Referral),
            _ => {}
        }
        Ok(())
    }

    /// Apply finished requests and lapse timers; called once per loop iteration
    pub fn update(&mut self, now: Instant) -> Result<()> {
        if let Some(receiver) = self.ping.as_mut() {
            match receiver.try_recv() {
                Ok(status) => {
                    self.server = status;
                    self.ping = None;
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.server = ServerStatus::Offline("health check aborted".to_string());
                    self.ping = None;
                }
            }
        }
        self.modal.update(now);
        self.views.update_all(now)
    }
}

fn spawn_ping(api: Arc<dyn OutreachApi>) -> oneshot::Receiver<ServerStatus> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let status = match api.ping().await {
            Ok(true) => {
                info!("✅ Outreach service is reachable");
                ServerStatus::Online
            }
            Ok(false) => {
                warn!("Health check answered without pong");
                ServerStatus::Offline("unexpected reply".to_string())
            }
            Err(e) => {
                warn!("Health check failed: {}", e);
                ServerStatus::Offline(e.user_message())
            }
        };
        let _ = tx.send(status);
    });
    rx
}
