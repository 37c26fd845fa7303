//! The shared "add" form
//!
//! One create form for careers and referrals that lives outside both list views. A success is
//! shown for [`SUCCESS_DISPLAY`], then the form clears, closes and publishes the matching
//! [`ResourceEvent`] so any mounted list reloads.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{ControllerError, StatusMessage};
use crate::api::{ApiError, EditableApi};
use crate::models::{
    CareerDraft, CareerEntry, DraftField, Editable, EntryDraft, ReferralDraft, ReferralEntry,
    Resource,
};
use crate::notifier::{Notifier, ResourceEvent};
use crate::timed::TimedState;

pub const SUCCESS_DISPLAY: Duration = Duration::from_millis(1500);

/// Which collection the form creates into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Career,
    Referral,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Career => CareerEntry::LABEL,
            EntryKind::Referral => ReferralEntry::LABEL,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            EntryKind::Career => "Track Career Page",
            EntryKind::Referral => "Add LinkedIn Referral",
        }
    }

    pub fn link_label(self) -> &'static str {
        match self {
            EntryKind::Career => CareerDraft::LINK_LABEL,
            EntryKind::Referral => ReferralDraft::LINK_LABEL,
        }
    }

    pub fn event(self) -> ResourceEvent {
        match self {
            EntryKind::Career => ResourceEvent::CareerAdded,
            EntryKind::Referral => ResourceEvent::ReferralAdded,
        }
    }
}

type CreateResult = (EntryKind, Result<(), ApiError>);

pub struct AddEntryForm {
    careers: Arc<dyn EditableApi<CareerEntry>>,
    referrals: Arc<dyn EditableApi<ReferralEntry>>,
    notifier: Notifier,
    open: bool,
    kind: EntryKind,
    company_name: String,
    link: String,
    focus: DraftField,
    submitting: bool,
    status: Option<StatusMessage>,
    closing: TimedState<EntryKind>,
    tx: mpsc::UnboundedSender<CreateResult>,
    rx: mpsc::UnboundedReceiver<CreateResult>,
}

impl AddEntryForm {
    pub fn new(
        careers: Arc<dyn EditableApi<CareerEntry>>,
        referrals: Arc<dyn EditableApi<ReferralEntry>>,
        notifier: Notifier,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            careers,
            referrals,
            notifier,
            open: false,
            kind: EntryKind::Career,
            company_name: String::new(),
            link: String::new(),
            focus: DraftField::CompanyName,
            submitting: false,
            status: None,
            closing: TimedState::new(),
            tx,
            rx,
        }
    }

    /// Open an empty form for `kind`. A pending success close is finished first.
    ///
    /// While a create is still in flight the form it came from is shown again instead, whatever
    /// `kind` asks for, so its outcome is not lost.
    pub fn open(&mut self, kind: EntryKind) {
        if self.submitting {
            debug!(
                "{} save still pending; reopening it instead of a {} form",
                self.kind.label(),
                kind.label()
            );
            self.open = true;
            return;
        }
        if let Some(pending) = self.closing.take() {
            self.finish_close(pending);
        }
        self.kind = kind;
        self.company_name.clear();
        self.link.clear();
        self.focus = DraftField::CompanyName;
        self.status = None;
        self.open = true;
    }

    /// Dismiss the form; a pending success close is finished immediately
    pub fn close(&mut self) {
        match self.closing.take() {
            Some(pending) => self.finish_close(pending),
            None => self.open = false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::CompanyName => &self.company_name,
            DraftField::Link => &self.link,
        }
    }

    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) {
        *self.field_slot(field) = value.into();
    }

    pub fn focus(&self) -> DraftField {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    /// The focused input; `None` while the form is not accepting edits
    pub fn focused_mut(&mut self) -> Option<&mut String> {
        if !self.accepts_input() {
            return None;
        }
        let focus = self.focus;
        Some(self.field_slot(focus))
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Validate and send the create request
    pub fn submit(&mut self) -> Result<(), ControllerError> {
        if !self.open {
            return Err(ControllerError::NothingOpen);
        }
        if !self.accepts_input() {
            return Err(ControllerError::Busy);
        }

        let kind = self.kind;
        let sent = match kind {
            EntryKind::Career => {
                let draft = CareerDraft::new(self.company_name.trim(), self.link.trim());
                draft
                    .validate()
                    .map(|()| spawn_create(Arc::clone(&self.careers), draft, kind, self.tx.clone()))
            }
            EntryKind::Referral => {
                let draft = ReferralDraft::new(self.company_name.trim(), self.link.trim());
                draft
                    .validate()
                    .map(|()| spawn_create(Arc::clone(&self.referrals), draft, kind, self.tx.clone()))
            }
        };
        if let Err(message) = sent {
            self.status = Some(StatusMessage::error(message.clone()));
            return Err(ControllerError::Invalid(message));
        }

        self.submitting = true;
        self.status = None;
        Ok(())
    }

    /// Apply finished requests and run the delayed close
    pub fn update(&mut self, now: Instant) {
        while let Ok((kind, result)) = self.rx.try_recv() {
            self.apply(kind, result, now);
        }
        if let Some(kind) = self.closing.expire(now) {
            self.finish_close(kind);
        }
    }

    /// Wait for an in-flight create; the close delay still runs from `now`
    pub async fn settle(&mut self, now: Instant) {
        while self.submitting {
            match self.rx.recv().await {
                Some((kind, result)) => self.apply(kind, result, now),
                None => break,
            }
        }
    }

    fn apply(&mut self, kind: EntryKind, result: Result<(), ApiError>, now: Instant) {
        self.submitting = false;
        let showing = self.open && self.kind == kind;
        match result {
            Ok(()) if showing => {
                info!("✅ {} saved", kind.label());
                self.status = Some(StatusMessage::success(format!("{} saved!", kind.label())));
                self.closing.set(kind, SUCCESS_DISPLAY, now);
            }
            Ok(()) => {
                info!("✅ {} saved after the form was dismissed", kind.label());
                self.notifier.publish(kind.event());
            }
            Err(e) => {
                warn!("Failed to save {}: {}", kind.label(), e);
                if !showing {
                    return;
                }
                let text = if e.is_network() {
                    "Network error."
                } else {
                    "Failed to save."
                };
                self.status = Some(StatusMessage::error(text));
            }
        }
    }

    fn finish_close(&mut self, kind: EntryKind) {
        self.company_name.clear();
        self.link.clear();
        self.focus = DraftField::CompanyName;
        self.status = None;
        self.open = false;
        self.notifier.publish(kind.event());
    }

    fn accepts_input(&self) -> bool {
        !self.submitting && !self.closing.is_scheduled()
    }

    fn field_slot(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::CompanyName => &mut self.company_name,
            DraftField::Link => &mut self.link,
        }
    }
}

fn spawn_create<R: Editable>(
    api: Arc<dyn EditableApi<R>>,
    draft: R::Draft,
    kind: EntryKind,
    tx: mpsc::UnboundedSender<CreateResult>,
) {
    info!("Creating {}", R::LABEL);
    tokio::spawn(async move {
        let result = api.create(&draft).await.map(|_| ());
        let _ = tx.send((kind, result));
    });
}
