// ── Resource data stores ──
//
// One store per bound collection endpoint, publishing immutable
// snapshots through a `watch` channel.

mod resource_store;
mod stream;

pub use resource_store::{FetchState, ResourceDataStore, StoreSnapshot, page_path};
pub use stream::StoreStream;
