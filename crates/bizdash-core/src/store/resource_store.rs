// ── ResourceDataStore ──
//
// Holds the current page of one REST collection and exposes CRUD
// mutations. Reads fail soft to an empty page; writes log and propagate.
// Every successful mutation refetches page 1.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bizdash_api::ApiClient;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, error};

use super::stream::StoreStream;
use crate::error::CoreError;
use crate::model::{ListResponse, Page, PageShape, Pagination, Record, RecordId};

// ── Snapshot ─────────────────────────────────────────────────────────

/// Fetch lifecycle. A failed fetch lands in `Ready` with an empty page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Ready,
}

/// Immutable view of a store, published on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub endpoint: String,
    pub records: Arc<Vec<Arc<Record>>>,
    pub pagination: Pagination,
    pub shape: PageShape,
    pub loading: bool,
    pub fetch_state: FetchState,
    /// Page number of the last applied fetch.
    pub current_page: u32,
}

impl StoreSnapshot {
    fn idle(endpoint: String) -> Self {
        Self {
            endpoint,
            records: Arc::new(Vec::new()),
            pagination: Pagination::default(),
            shape: PageShape::default(),
            loading: false,
            fetch_state: FetchState::Idle,
            current_page: 1,
        }
    }

    fn apply(&mut self, page: Page, page_number: u32) {
        self.records = page.records;
        self.pagination = page.pagination;
        self.shape = page.shape;
        self.loading = false;
        self.fetch_state = FetchState::Ready;
        self.current_page = page_number;
    }
}

/// Append the `page` query parameter, joining with `&` when the endpoint
/// already carries a query string.
pub fn page_path(endpoint: &str, page: u32) -> String {
    let sep = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{sep}page={page}")
}

fn record_path(endpoint: &str, id: &RecordId) -> String {
    format!("{endpoint}{id}/")
}

// ── Store ────────────────────────────────────────────────────────────

/// Per-endpoint state holder. Cheaply cloneable.
#[derive(Clone)]
pub struct ResourceDataStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    client: Arc<ApiClient>,
    state: watch::Sender<StoreSnapshot>,
    /// Bumped by every fetch and rebind; responses from older generations
    /// are discarded.
    generation: AtomicU64,
}

impl ResourceDataStore {
    /// Create an idle store for `endpoint` without fetching.
    pub fn new(client: Arc<ApiClient>, endpoint: impl Into<String>) -> Self {
        let (state, _) = watch::channel(StoreSnapshot::idle(endpoint.into()));
        Self {
            inner: Arc::new(StoreInner {
                client,
                state,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Create a store for `endpoint` and run the initial `fetch_page(1)`.
    pub async fn bind(client: Arc<ApiClient>, endpoint: impl Into<String>) -> Self {
        let store = Self::new(client, endpoint);
        store.fetch_page(1).await;
        store
    }

    /// Switch to a different endpoint: reset to `Idle`, then load page 1.
    ///
    /// Any fetch still in flight for the previous endpoint is ignored.
    pub async fn rebind(&self, endpoint: impl Into<String>) {
        let endpoint = endpoint.into();
        debug!(endpoint = %endpoint, "rebinding store");
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_replace(StoreSnapshot::idle(endpoint));
        self.fetch_page(1).await;
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn endpoint(&self) -> String {
        self.inner.state.borrow().endpoint.clone()
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.inner.client
    }

    /// Current snapshot (cheap clone of `Arc`s).
    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StoreStream {
        StoreStream::new(self.inner.state.subscribe())
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Load one page. Never fails: errors are logged and leave an empty
    /// page with `{count: 0, next: None, previous: None}`.
    pub async fn fetch_page(&self, page: u32) {
        let page = page.max(1);
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let endpoint = self.endpoint();

        self.inner.state.send_modify(|s| {
            s.loading = true;
            s.fetch_state = FetchState::Loading;
        });

        let result = match self.inner.client.get(&page_path(&endpoint, page)).await {
            Ok(body) => ListResponse::from_value(body, &endpoint),
            Err(e) => Err(CoreError::from(e)),
        };

        if self.inner.generation.load(Ordering::SeqCst) != generation {
            debug!(endpoint = %endpoint, page, "discarding stale page response");
            return;
        }

        let page_data = match result {
            Ok(list) => {
                let page_data = Page::from(list);
                debug!(
                    endpoint = %endpoint,
                    page,
                    records = page_data.records.len(),
                    count = page_data.pagination.count,
                    "page loaded"
                );
                page_data
            }
            Err(e) => {
                error!(endpoint = %endpoint, page, error = %e, "error fetching page");
                Page::empty()
            }
        };

        self.inner.state.send_modify(|s| s.apply(page_data, page));
    }

    /// Reload page 1.
    pub async fn refetch(&self) {
        self.fetch_page(1).await;
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// POST a new record, then refetch page 1. Returns the created body.
    pub async fn add_record<B>(&self, values: &B) -> Result<Value, CoreError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let endpoint = self.endpoint();
        match self.inner.client.post(&endpoint, values).await {
            Ok(created) => {
                self.fetch_page(1).await;
                Ok(created)
            }
            Err(e) => {
                error!(endpoint = %endpoint, error = %e, "error adding record");
                Err(e.into())
            }
        }
    }

    /// PUT `{endpoint}{id}/`, then refetch page 1. Returns the updated body.
    pub async fn update_record<B>(&self, id: &RecordId, values: &B) -> Result<Value, CoreError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let endpoint = self.endpoint();
        match self.inner.client.put(&record_path(&endpoint, id), values).await {
            Ok(updated) => {
                self.fetch_page(1).await;
                Ok(updated)
            }
            Err(e) => {
                error!(endpoint = %endpoint, %id, error = %e, "error updating record");
                Err(e.into())
            }
        }
    }

    /// DELETE `{endpoint}{id}/`, then refetch page 1.
    pub async fn delete_record(&self, id: &RecordId) -> Result<(), CoreError> {
        let endpoint = self.endpoint();
        match self.inner.client.delete(&record_path(&endpoint, id)).await {
            Ok(_) => {
                self.fetch_page(1).await;
                Ok(())
            }
            Err(e) => {
                error!(endpoint = %endpoint, %id, error = %e, "error deleting record");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_path_appends_query() {
        assert_eq!(page_path("/employees/", 1), "/employees/?page=1");
        assert_eq!(
            page_path("/employees/?department=IT", 3),
            "/employees/?department=IT&page=3"
        );
    }

    #[test]
    fn record_path_is_slash_terminated() {
        assert_eq!(record_path("/assets/", &RecordId::Int(7)), "/assets/7/");
        assert_eq!(
            record_path("/assets/", &RecordId::Str("a-1".into())),
            "/assets/a-1/"
        );
    }

    #[test]
    fn idle_snapshot_is_empty() {
        let snap = StoreSnapshot::idle("/t/".into());
        assert!(snap.records.is_empty());
        assert!(!snap.loading);
        assert_eq!(snap.fetch_state, FetchState::Idle);
        assert_eq!(snap.pagination, Pagination::default());
    }
}
