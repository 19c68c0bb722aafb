// ── Domain model ──
//
// Records are schema-less field maps; the per-resource schema lives in
// `FieldDescriptor` lists consumed by the form layer.

pub mod field;
pub mod page;
pub mod record;
pub mod resource;

pub use field::{FieldDescriptor, SelectOption, Validator, Widget};
pub use page::{ListResponse, Page, PageShape, Pagination};
pub use record::{Record, RecordId, display_value};
pub use resource::{Column, Resource};
