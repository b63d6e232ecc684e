use serde::{Deserialize, Serialize};

/// Raw pagination numbers as reported alongside a list response. Aliases
/// cover both envelope dialects (`first`/`start`, `rows`/`max`,
/// `length`/`page`, `all`/`total`).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawCounts {
    #[serde(alias = "start")]
    pub first: Option<i64>,
    #[serde(alias = "max")]
    pub rows: Option<i64>,
    #[serde(alias = "page")]
    pub length: Option<i64>,
    pub filtered: Option<i64>,
    #[serde(alias = "total")]
    pub all: Option<i64>,
}

/// Pagination bookkeeping for one page of a list response: first row on
/// the page, requested page size, rows actually returned, total matching
/// the filter, total ignoring the filter. Immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionCounts {
    pub first: i64,
    pub rows: i64,
    pub length: i64,
    pub filtered: i64,
    pub all: i64,
}

impl CollectionCounts {
    /// Build from raw fields, normalizing missing numbers to 0.
    pub fn new(raw: RawCounts) -> CollectionCounts {
        CollectionCounts {
            first: raw.first.unwrap_or(0),
            rows: raw.rows.unwrap_or(0),
            length: raw.length.unwrap_or(0),
            filtered: raw.filtered.unwrap_or(0),
            all: raw.all.unwrap_or(0),
        }
    }

    /// 1-based index of the last row on this page.
    pub fn last(&self) -> i64 {
        self.first + self.length - 1
    }

    pub fn has_next_page(&self) -> bool {
        self.last() < self.filtered
    }

    pub fn has_previous_page(&self) -> bool {
        self.first > 1
    }
}

impl From<RawCounts> for CollectionCounts {
    fn from(raw: RawCounts) -> CollectionCounts {
        CollectionCounts::new(raw)
    }
}
