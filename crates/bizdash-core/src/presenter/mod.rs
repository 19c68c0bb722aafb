// ── CrudPresenter ──
//
// Generic table/modal state bound to one `ResourceDataStore`. Owns only
// ephemeral UI state (search text, modal, form draft, client page) and
// never mutates the store's page directly: every write goes through the
// store's mutation methods, which refetch on success.
//
// Long-running work is split into a plan (`Submission`, `Removal`) that
// owns a store handle and can be moved onto a task, plus a synchronous
// `apply_*` step that updates the presenter once the work finishes.

mod form;
mod paging;
mod search;

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

pub use form::{FieldErrors, FormDraft};
pub use paging::{CLIENT_PAGE_SIZE, Paging, SERVER_PAGE_SIZE};
pub use search::filter_records;

use crate::error::{CoreError, ErrorClass};
use crate::model::{FieldDescriptor, Record, RecordId, Resource};
use crate::store::{ResourceDataStore, StoreSnapshot};

// ── Notices ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }

    /// Message for a failed create/update, chosen by HTTP status alone.
    pub fn for_submit_error(err: &CoreError) -> Self {
        Self::error(match ErrorClass::classify(err) {
            ErrorClass::NotFound => "Resource not found.",
            ErrorClass::Server => "Server error, please retry later.",
            ErrorClass::Other => "Something went wrong, please check your connection.",
        })
    }
}

// ── Modal ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ModalState {
    #[default]
    Closed,
    Create,
    Edit(Arc<Record>),
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn editing(&self) -> Option<&Arc<Record>> {
        match self {
            Self::Edit(record) => Some(record),
            _ => None,
        }
    }
}

// ── Deferred operations ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    /// `None` when the record being edited carries no usable id.
    Update(Option<RecordId>),
}

/// Outcome of a finished create/update/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub succeeded: bool,
    pub notice: Notice,
}

/// A pending create or update, detached from the presenter.
#[derive(Clone)]
pub struct Submission {
    store: ResourceDataStore,
    mode: SubmitMode,
}

impl Submission {
    pub fn mode(&self) -> &SubmitMode {
        &self.mode
    }

    pub async fn run(self, values: &Value) -> Outcome {
        let result = match &self.mode {
            SubmitMode::Create => self.store.add_record(values).await.map(drop),
            SubmitMode::Update(Some(id)) => self.store.update_record(id, values).await.map(drop),
            SubmitMode::Update(None) => Err(CoreError::MissingId),
        };
        match result {
            Ok(()) => Outcome {
                succeeded: true,
                notice: Notice::success(match self.mode {
                    SubmitMode::Create => "Created successfully",
                    SubmitMode::Update(_) => "Updated successfully",
                }),
            },
            Err(e) => Outcome {
                succeeded: false,
                notice: Notice::for_submit_error(&e),
            },
        }
    }
}

/// A pending delete, detached from the presenter.
#[derive(Clone)]
pub struct Removal {
    store: ResourceDataStore,
    id: RecordId,
}

impl Removal {
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub async fn run(self) -> Outcome {
        match self.store.delete_record(&self.id).await {
            Ok(()) => Outcome {
                succeeded: true,
                notice: Notice::success("Deleted successfully"),
            },
            Err(_) => Outcome {
                succeeded: false,
                notice: Notice::error("Could not delete, please retry."),
            },
        }
    }
}

// ── Presenter ────────────────────────────────────────────────────────

/// Table, search and modal state for one resource.
pub struct CrudPresenter {
    store: ResourceDataStore,
    fields: Vec<FieldDescriptor>,
    noun: String,
    search: String,
    modal: ModalState,
    draft: FormDraft,
    field_errors: FieldErrors,
    client_page: usize,
}

impl CrudPresenter {
    pub fn new(store: ResourceDataStore, fields: Vec<FieldDescriptor>, noun: impl Into<String>) -> Self {
        let draft = FormDraft::empty(&fields);
        Self {
            store,
            fields,
            noun: noun.into(),
            search: String::new(),
            modal: ModalState::Closed,
            draft,
            field_errors: FieldErrors::new(),
            client_page: 1,
        }
    }

    /// Presenter wired with a built-in resource's field list.
    pub fn for_resource(store: ResourceDataStore, resource: Resource) -> Self {
        Self::new(store, resource.fields(), resource.singular())
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn store(&self) -> &ResourceDataStore {
        &self.store
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    pub fn loading(&self) -> bool {
        self.store.snapshot().loading
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut FormDraft {
        &mut self.draft
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    // ── Search ───────────────────────────────────────────────────────

    /// Filter the loaded page. Never re-queries the server.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.client_page = 1;
    }

    /// Clear the search and show the full loaded page again.
    pub fn refresh_view(&mut self) {
        self.search.clear();
        self.client_page = 1;
    }

    /// Loaded rows matching the search, before client-side paging.
    pub fn filtered(&self) -> Vec<Arc<Record>> {
        filter_records(&self.store.snapshot().records, &self.search)
    }

    /// Rows to render: search applied, then the client slice in client mode.
    pub fn visible_rows(&self) -> Vec<Arc<Record>> {
        let snapshot = self.store.snapshot();
        let rows = filter_records(&snapshot.records, &self.search);
        match Paging::resolve(&snapshot, self.client_page, rows.len()) {
            Paging::Server { .. } => rows,
            Paging::Client { current, .. } => {
                rows[paging::client_window(rows.len(), current)].to_vec()
            }
        }
    }

    // ── Pagination ───────────────────────────────────────────────────

    pub fn paging(&self) -> Paging {
        let snapshot = self.store.snapshot();
        let rows = filter_records(&snapshot.records, &self.search).len();
        Paging::resolve(&snapshot, self.client_page, rows)
    }

    /// Move to page `n`. Client mode slices locally and returns `None`;
    /// server mode returns the page the caller must fetch.
    pub fn request_page(&mut self, n: u32) -> Option<u32> {
        if self.paging().is_server() {
            Some(n.max(1))
        } else {
            self.client_page = usize::try_from(n.max(1)).unwrap_or(usize::MAX);
            None
        }
    }

    /// Move to page `n`, fetching from the server in server mode.
    pub async fn change_page(&mut self, n: u32) {
        if let Some(page) = self.request_page(n) {
            self.store.fetch_page(page).await;
        }
    }

    // ── Modal ────────────────────────────────────────────────────────

    pub fn open_create(&mut self) {
        self.draft = FormDraft::empty(&self.fields);
        self.field_errors.clear();
        self.modal = ModalState::Create;
    }

    pub fn open_edit(&mut self, record: Arc<Record>) {
        self.draft = FormDraft::from_record(&self.fields, &record);
        self.field_errors.clear();
        self.modal = ModalState::Edit(record);
    }

    pub fn close_modal(&mut self) {
        self.modal = ModalState::Closed;
        self.draft = FormDraft::empty(&self.fields);
        self.field_errors.clear();
    }

    pub fn modal_title(&self) -> String {
        match self.modal {
            ModalState::Edit(_) => format!("Update {}", self.noun),
            _ => format!("Create {}", self.noun),
        }
    }

    /// Validate the draft, keeping per-field messages for display.
    pub fn validate(&mut self) -> bool {
        match self.draft.validate(&self.fields) {
            Ok(()) => {
                self.field_errors.clear();
                true
            }
            Err(errors) => {
                debug!(fields = errors.len(), "form validation failed");
                self.field_errors = errors;
                false
            }
        }
    }

    /// The draft coerced into a request body.
    pub fn draft_values(&self) -> Value {
        self.draft.to_values(&self.fields)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Plan a submit: update when editing, create otherwise.
    pub fn submission(&self) -> Submission {
        let mode = match &self.modal {
            ModalState::Edit(record) => SubmitMode::Update(record.id()),
            _ => SubmitMode::Create,
        };
        Submission {
            store: self.store.clone(),
            mode,
        }
    }

    /// Close the modal after a successful submit; keep it open otherwise.
    pub fn apply_submit(&mut self, outcome: &Outcome) {
        if outcome.succeeded {
            self.close_modal();
        }
    }

    pub async fn submit(&mut self, values: &Value) -> Notice {
        let outcome = self.submission().run(values).await;
        self.apply_submit(&outcome);
        outcome.notice
    }

    pub fn removal(&self, id: RecordId) -> Removal {
        Removal {
            store: self.store.clone(),
            id,
        }
    }

    /// Delete without confirmation; callers confirm first.
    pub async fn remove(&self, id: RecordId) -> Notice {
        self.removal(id).run().await.notice
    }
}
