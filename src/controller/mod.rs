//! View state controllers
//!
//! A [`ResourceController`] owns the local copy of one remote collection. It issues the HTTP
//! calls on tokio tasks and applies their results when the UI loop calls [`poll`]. The local
//! list only ever changes from server responses:
//!
//! * a successful load replaces the whole list,
//! * a successful update replaces the one entry with the returned id,
//! * a successful delete filters the id out.
//!
//! Each mount starts a new generation; results that arrive for an older generation are
//! dropped, so a view that was switched away from never acts on stale responses.
//!
//! [`poll`]: ResourceController::poll

use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ApiError, EditableApi, ResourceApi};
use crate::models::{
    CareerEntry, DraftField, Editable, EmailRecord, EntryDraft, ReferralEntry, Resource,
};
use crate::notifier::{Notifier, Signal, Subscription};
use crate::utils::matches_query;

/// Shown when a list fails to load and the server gave no reason
pub const LOAD_FAILED: &str = "Failed to fetch data";

pub mod add_entry;
pub mod compose;
pub mod template;
pub use add_entry::{AddEntryForm, EntryKind};
pub use compose::ComposeForm;
pub use template::TemplateController;

pub type CareersController = ResourceController<CareerEntry, dyn EditableApi<CareerEntry>>;
pub type ReferralsController = ResourceController<ReferralEntry, dyn EditableApi<ReferralEntry>>;
pub type HistoryController = ResourceController<EmailRecord, dyn ResourceApi<EmailRecord>>;

/// Why a UI action was refused before any request was sent
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("a request for this entry is already in flight")]
    Busy,
    #[error("the list is still loading")]
    NotReady,
    #[error("no entry with id {0}")]
    NotFound(i64),
    #[error("no form is open")]
    NothingOpen,
    #[error("{0}")]
    Invalid(String),
}

/// Colour of an inline status pill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

/// Dismissible inline message shown under a form or list header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

/// Where the list is in its load cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Per-row edit form
#[derive(Debug, Clone)]
pub struct EditForm<D> {
    pub id: i64,
    pub draft: D,
    pub focus: DraftField,
    pub submitting: bool,
    pub error: Option<String>,
}

impl<D: EntryDraft> EditForm<D> {
    fn new(id: i64, draft: D) -> Self {
        Self {
            id,
            draft,
            focus: DraftField::CompanyName,
            submitting: false,
            error: None,
        }
    }

    /// The input that currently has focus
    pub fn focused_mut(&mut self) -> &mut String {
        self.draft.field_mut(self.focus)
    }
}

/// Open "are you sure?" dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub id: i64,
    pub deleting: bool,
    pub error: Option<String>,
}

enum Completion<R> {
    Loaded {
        seq: u64,
        result: Result<Vec<R>, ApiError>,
    },
    Updated {
        id: i64,
        result: Result<R, ApiError>,
    },
    Deleted {
        id: i64,
        result: Result<(), ApiError>,
    },
}

struct Envelope<R> {
    generation: u64,
    completion: Completion<R>,
}

/// Local mirror of one remote collection
pub struct ResourceController<R: Resource, A: ?Sized> {
    api: Arc<A>,
    notifier: Notifier,
    subscription: Option<Subscription>,
    items: Vec<R>,
    phase: LoadPhase,
    query: String,
    edit: Option<EditForm<R::Draft>>,
    delete: Option<DeleteConfirmation>,
    in_flight: HashSet<i64>,
    load_seq: u64,
    loading: Option<u64>,
    load_task: Option<JoinHandle<()>>,
    generation: u64,
    mounted: bool,
    tx: mpsc::UnboundedSender<Envelope<R>>,
    rx: mpsc::UnboundedReceiver<Envelope<R>>,
}

impl<R, A> ResourceController<R, A>
where
    R: Resource,
    A: ResourceApi<R> + ?Sized + 'static,
{
    pub fn new(api: Arc<A>, notifier: Notifier) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            notifier,
            subscription: None,
            items: Vec::new(),
            phase: LoadPhase::Idle,
            query: String::new(),
            edit: None,
            delete: None,
            in_flight: HashSet::new(),
            load_seq: 0,
            loading: None,
            load_task: None,
            generation: 0,
            mounted: false,
            tx,
            rx,
        }
    }

    /// Start listening for refresh events and fetch the collection
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.generation += 1;
        self.subscription = Some(self.notifier.subscribe());
        debug!("Mounted {} view (generation {})", R::COLLECTION, self.generation);
        self.load();
    }

    /// Stop listening and forget all view state
    ///
    /// An in-flight load is aborted. Mutations already sent are left to finish on the
    /// server, but their results are ignored.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.generation += 1;
        self.subscription = None;
        if let Some(task) = self.load_task.take() {
            task.abort();
        }
        if !self.in_flight.is_empty() {
            warn!(
                "Unmounting {} view with {} request(s) in flight; results will be ignored",
                R::COLLECTION,
                self.in_flight.len()
            );
        }
        self.in_flight.clear();
        self.loading = None;
        self.items.clear();
        self.phase = LoadPhase::Idle;
        self.query.clear();
        self.edit = None;
        self.delete = None;
        debug!("Unmounted {} view", R::COLLECTION);
    }

    /// Fetch the full collection, superseding any load already in flight
    pub fn load(&mut self) {
        if let Some(task) = self.load_task.take() {
            task.abort();
        }
        self.load_seq += 1;
        let seq = self.load_seq;
        self.loading = Some(seq);
        self.phase = LoadPhase::Loading;

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        debug!("Loading {} (request {})", R::COLLECTION, seq);
        self.load_task = Some(tokio::spawn(async move {
            let result = api.list().await;
            let _ = tx.send(Envelope {
                generation,
                completion: Completion::Loaded { seq, result },
            });
        }));
    }

    /// Manual retry after a failed load
    pub fn retry(&mut self) {
        info!("Retrying {} load", R::COLLECTION);
        self.load();
    }

    /// Apply finished requests and react to refresh events. Never blocks.
    pub fn poll(&mut self) {
        while let Ok(envelope) = self.rx.try_recv() {
            self.apply(envelope);
        }

        let signals = match self.subscription.as_mut() {
            Some(subscription) => subscription.drain(),
            None => return,
        };
        for signal in signals {
            match signal {
                Signal::Event(event) if R::refreshed_by(event) => {
                    info!("🔄 {:?} received, refreshing {}", event, R::COLLECTION);
                    self.load();
                }
                Signal::Event(_) => {}
                Signal::Missed(count) => {
                    warn!("Missed {} refresh event(s), reloading {}", count, R::COLLECTION);
                    self.load();
                }
            }
        }
    }

    /// Wait until no request issued by this controller is outstanding
    pub async fn settle(&mut self) {
        while self.is_busy() {
            match self.rx.recv().await {
                Some(envelope) => self.apply(envelope),
                None => break,
            }
        }
    }

    fn apply(&mut self, envelope: Envelope<R>) {
        if envelope.generation != self.generation {
            debug!("Dropping stale {} response", R::COLLECTION);
            return;
        }

        match envelope.completion {
            Completion::Loaded { seq, result } => {
                if self.loading != Some(seq) {
                    debug!("Dropping superseded {} load {}", R::COLLECTION, seq);
                    return;
                }
                self.loading = None;
                self.load_task = None;
                match result {
                    Ok(items) => {
                        info!("Loaded {} {} record(s)", items.len(), R::COLLECTION);
                        self.items = items;
                        self.phase = LoadPhase::Ready;
                    }
                    Err(e) => {
                        warn!("Failed to load {}: {}", R::COLLECTION, e);
                        self.phase = LoadPhase::Failed(e.user_message_or(LOAD_FAILED));
                    }
                }
            }
            Completion::Updated { id, result } => {
                self.in_flight.remove(&id);
                match result {
                    Ok(updated) => {
                        let updated_id = updated.id();
                        match self.items.iter_mut().find(|item| item.id() == updated_id) {
                            Some(slot) => *slot = updated,
                            None => warn!("Updated {} {} is not in the list", R::LABEL, updated_id),
                        }
                        if self.edit.as_ref().map(|form| form.id) == Some(id) {
                            self.edit = None;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to update {} {}: {}", R::LABEL, id, e);
                        if let Some(form) = self.edit.as_mut().filter(|form| form.id == id) {
                            form.submitting = false;
                            form.error = Some(e.user_message());
                        }
                    }
                }
            }
            Completion::Deleted { id, result } => {
                self.in_flight.remove(&id);
                match result {
                    Ok(()) => {
                        self.items.retain(|item| item.id() != id);
                        if self.delete.as_ref().map(|confirm| confirm.id) == Some(id) {
                            self.delete = None;
                        }
                        if self.edit.as_ref().map(|form| form.id) == Some(id) {
                            self.edit = None;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to delete {} {}: {}", R::LABEL, id, e);
                        if let Some(confirm) = self.delete.as_mut().filter(|c| c.id == id) {
                            confirm.deleting = false;
                            confirm.error = Some(e.user_message());
                        }
                    }
                }
            }
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Entries matching the search query, in list order
    pub fn visible(&self) -> Vec<&R> {
        self.items
            .iter()
            .filter(|item| matches_query(item.search_key(), &self.query))
            .collect()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            LoadPhase::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.loading.is_some() || !self.in_flight.is_empty()
    }

    pub fn is_in_flight(&self, id: i64) -> bool {
        self.in_flight.contains(&id)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn edit_form(&self) -> Option<&EditForm<R::Draft>> {
        self.edit.as_ref()
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut EditForm<R::Draft>> {
        self.edit.as_mut()
    }

    pub fn delete_confirmation(&self) -> Option<&DeleteConfirmation> {
        self.delete.as_ref()
    }

    fn find(&self, id: i64) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn ensure_ready(&self) -> Result<(), ControllerError> {
        if self.loading.is_some() {
            return Err(ControllerError::NotReady);
        }
        Ok(())
    }
}

impl<R, A> ResourceController<R, A>
where
    R: Editable,
    A: EditableApi<R> + ?Sized + 'static,
{
    /// Open the edit form pre-filled from the current entry
    pub fn begin_edit(&mut self, id: i64) -> Result<(), ControllerError> {
        self.ensure_ready()?;
        let draft = self
            .find(id)
            .map(|item| item.to_draft())
            .ok_or(ControllerError::NotFound(id))?;
        self.edit = Some(EditForm::new(id, draft));
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Replace one input of the open edit form
    pub fn edit_field(
        &mut self,
        field: DraftField,
        value: impl Into<String>,
    ) -> Result<(), ControllerError> {
        let form = self.edit.as_mut().ok_or(ControllerError::NothingOpen)?;
        if form.submitting {
            return Err(ControllerError::Busy);
        }
        *form.draft.field_mut(field) = value.into();
        Ok(())
    }

    /// Send the edit form; the list changes only once the server answers
    pub fn submit_edit(&mut self) -> Result<(), ControllerError> {
        let form = self.edit.as_mut().ok_or(ControllerError::NothingOpen)?;
        if self.loading.is_some() || self.in_flight.contains(&form.id) {
            return Err(ControllerError::Busy);
        }
        if let Err(message) = form.draft.validate() {
            form.error = Some(message.clone());
            return Err(ControllerError::Invalid(message));
        }
        form.submitting = true;
        form.error = None;

        let id = form.id;
        let draft = form.draft.clone();
        self.in_flight.insert(id);

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        info!("Updating {} {}", R::LABEL, id);
        tokio::spawn(async move {
            let result = api.update(id, &draft).await;
            let _ = tx.send(Envelope {
                generation,
                completion: Completion::Updated { id, result },
            });
        });
        Ok(())
    }

    /// First step of a delete: open the confirmation dialog
    pub fn request_delete(&mut self, id: i64) -> Result<(), ControllerError> {
        self.ensure_ready()?;
        if self.find(id).is_none() {
            return Err(ControllerError::NotFound(id));
        }
        if self.in_flight.contains(&id) {
            return Err(ControllerError::Busy);
        }
        self.delete = Some(DeleteConfirmation {
            id,
            deleting: false,
            error: None,
        });
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.delete = None;
    }

    /// Second step of a delete: issue the request
    pub fn confirm_delete(&mut self) -> Result<(), ControllerError> {
        let confirm = self.delete.as_mut().ok_or(ControllerError::NothingOpen)?;
        if self.loading.is_some() || self.in_flight.contains(&confirm.id) {
            return Err(ControllerError::Busy);
        }
        confirm.deleting = true;
        confirm.error = None;

        let id = confirm.id;
        self.in_flight.insert(id);

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        info!("Deleting {} {}", R::LABEL, id);
        tokio::spawn(async move {
            let result = api.delete(id).await;
            let _ = tx.send(Envelope {
                generation,
                completion: Completion::Deleted { id, result },
            });
        });
        Ok(())
    }
}
