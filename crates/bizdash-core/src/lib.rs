// bizdash-core: resource state and presentation logic between bizdash-api
// and its consumers (CLI/TUI).

pub mod config;
pub mod error;
pub mod model;
pub mod presenter;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::BackendConfig;
pub use error::{CoreError, ErrorClass};
pub use presenter::{
    CrudPresenter, FieldErrors, FormDraft, ModalState, Notice, NoticeLevel, Outcome, Paging,
    Removal, SubmitMode, Submission, filter_records,
};
pub use session::{LoginOutcome, MemoryVault, Session, SessionVault, UserSession};
pub use store::{FetchState, ResourceDataStore, StoreSnapshot, StoreStream};

pub use model::{
    Column, FieldDescriptor, ListResponse, Page, PageShape, Pagination, Record, RecordId,
    Resource, SelectOption, Validator, Widget, display_value,
};
