// ── Pagination mode ──

use crate::model::PageShape;
use crate::store::StoreSnapshot;

/// Page size the backend uses for paginated envelopes.
pub const SERVER_PAGE_SIZE: u32 = 20;
/// Page size for slicing a raw list locally.
pub const CLIENT_PAGE_SIZE: usize = 10;

/// How the table pages: by asking the server, or by slicing locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    Server {
        current: u32,
        total: u64,
        page_size: u32,
    },
    Client {
        current: usize,
        total: usize,
        page_size: usize,
    },
}

impl Paging {
    /// Server mode for envelope pages, client mode otherwise. `rows` is the
    /// number of rows left after search, which client mode slices.
    pub(crate) fn resolve(snapshot: &StoreSnapshot, client_page: usize, rows: usize) -> Self {
        match snapshot.shape {
            PageShape::Envelope => Self::Server {
                current: snapshot.current_page,
                total: snapshot.pagination.count,
                page_size: SERVER_PAGE_SIZE,
            },
            PageShape::RawList => Self::Client {
                current: client_page.clamp(1, page_count(rows, CLIENT_PAGE_SIZE)),
                total: rows,
                page_size: CLIENT_PAGE_SIZE,
            },
        }
    }

    pub fn current(&self) -> u64 {
        match *self {
            Self::Server { current, .. } => u64::from(current),
            Self::Client { current, .. } => to_u64(current),
        }
    }

    /// Number of pages, never less than one.
    pub fn page_count(&self) -> u64 {
        match *self {
            Self::Server {
                total, page_size, ..
            } => total.div_ceil(u64::from(page_size)).max(1),
            Self::Client {
                total, page_size, ..
            } => to_u64(page_count(total, page_size)),
        }
    }

    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

fn to_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

fn page_count(rows: usize, page_size: usize) -> usize {
    rows.div_ceil(page_size).max(1)
}

/// Rows of client page `page` (1-based) out of `len` rows.
pub(crate) fn client_window(len: usize, page: usize) -> std::ops::Range<usize> {
    let start = (page.max(1) - 1).saturating_mul(CLIENT_PAGE_SIZE).min(len);
    let end = start.saturating_add(CLIENT_PAGE_SIZE).min(len);
    start..end
}
