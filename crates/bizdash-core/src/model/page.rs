// ── Page and pagination ──
//
// Collection endpoints answer either with a paginated envelope
// `{count, next, previous, results}` or with a bare array. The shape is
// resolved once, here, into `ListResponse`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::Record;
use crate::error::CoreError;

/// Pagination metadata mirrored from the server envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// Which response shape produced the current page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageShape {
    Envelope,
    #[default]
    RawList,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    previous: Option<String>,
    results: Vec<Record>,
}

/// A collection response with its shape made explicit.
#[derive(Debug, Clone, PartialEq)]
pub enum ListResponse {
    Envelope {
        count: u64,
        next: Option<String>,
        previous: Option<String>,
        results: Vec<Record>,
    },
    RawList(Vec<Record>),
}

impl ListResponse {
    /// Resolve a loosely typed response body.
    ///
    /// Objects carrying `results` are envelopes, arrays are raw lists, and
    /// `null` (no content) is an empty raw list. Anything else is rejected.
    pub fn from_value(value: Value, endpoint: &str) -> Result<Self, CoreError> {
        let unexpected = |kind: &str, detail: String| CoreError::UnexpectedShape {
            endpoint: endpoint.to_owned(),
            kind: format!("{kind}: {detail}"),
        };

        match value {
            Value::Null => Ok(Self::RawList(Vec::new())),
            Value::Array(_) => serde_json::from_value(value)
                .map(Self::RawList)
                .map_err(|e| unexpected("array", e.to_string())),
            Value::Object(ref map) if map.contains_key("results") => {
                let env: Envelope = serde_json::from_value(value)
                    .map_err(|e| unexpected("envelope", e.to_string()))?;
                Ok(Self::Envelope {
                    count: env.count.unwrap_or(0),
                    next: env.next,
                    previous: env.previous,
                    results: env.results,
                })
            }
            Value::Object(_) => Err(unexpected("object", "missing `results`".into())),
            Value::String(_) => Err(unexpected("text", "non-JSON body".into())),
            Value::Bool(_) | Value::Number(_) => Err(unexpected("scalar", value.to_string())),
        }
    }
}

/// One fetched page of records plus its pagination metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub records: Arc<Vec<Arc<Record>>>,
    pub pagination: Pagination,
    pub shape: PageShape,
}

impl Page {
    /// The page published after a failed fetch: no records, `{0, null, null}`.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<ListResponse> for Page {
    fn from(resp: ListResponse) -> Self {
        match resp {
            ListResponse::Envelope {
                count,
                next,
                previous,
                results,
            } => Self {
                records: Arc::new(results.into_iter().map(Arc::new).collect()),
                pagination: Pagination {
                    count,
                    next,
                    previous,
                },
                shape: PageShape::Envelope,
            },
            ListResponse::RawList(records) => Self {
                pagination: Pagination {
                    count: u64::try_from(records.len()).unwrap_or(u64::MAX),
                    next: None,
                    previous: None,
                },
                records: Arc::new(records.into_iter().map(Arc::new).collect()),
                shape: PageShape::RawList,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn bare_array_counts_its_own_length() {
        let resp = ListResponse::from_value(json!([{ "id": "1", "name": "X" }]), "/t/").unwrap();
        let page = Page::from(resp);
        assert_eq!(page.shape, PageShape::RawList);
        assert_eq!(
            page.pagination,
            Pagination {
                count: 1,
                next: None,
                previous: None
            }
        );
        assert_eq!(page.records[0].display_value("name"), "X");
    }

    #[test]
    fn envelope_mirrors_metadata() {
        let body = json!({
            "count": 25,
            "next": "http://x/api/t/?page=2",
            "previous": null,
            "results": [{ "id": 1 }, { "id": 2 }]
        });
        let page = Page::from(ListResponse::from_value(body, "/t/").unwrap());
        assert_eq!(page.shape, PageShape::Envelope);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.pagination.count, 25);
        assert_eq!(
            page.pagination.next.as_deref(),
            Some("http://x/api/t/?page=2")
        );
        assert!(page.pagination.previous.is_none());
    }

    #[test]
    fn envelope_without_count_defaults_to_zero() {
        let page =
            Page::from(ListResponse::from_value(json!({ "results": [] }), "/t/").unwrap());
        assert_eq!(page.pagination, Pagination::default());
        assert_eq!(page.shape, PageShape::Envelope);
    }

    #[test]
    fn null_is_an_empty_list() {
        let page = Page::from(ListResponse::from_value(Value::Null, "/t/").unwrap());
        assert!(page.records.is_empty());
        assert_eq!(page.pagination.count, 0);
    }

    #[test]
    fn object_without_results_is_rejected() {
        let err = ListResponse::from_value(json!({ "detail": "nope" }), "/t/").unwrap_err();
        assert!(matches!(err, CoreError::UnexpectedShape { .. }));
    }

    #[test]
    fn text_body_is_rejected() {
        let err = ListResponse::from_value(Value::String("<html>".into()), "/t/").unwrap_err();
        assert!(matches!(err, CoreError::UnexpectedShape { .. }));
    }
}
