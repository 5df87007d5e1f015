use chrono::{DateTime, Utc};

/// A video as the upstream store sees it. We never write these.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ContentRecord {
    pub id: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ContentRecord {
    /// Blank titles are treated as missing.
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }
}

/// One page of a content query. `total` counts every matching record, not only the
/// fetched ones, and is never less than the page itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPage {
    pub records: Vec<ContentRecord>,
    pub total: usize,
}

impl ContentPage {
    pub fn new(records: Vec<ContentRecord>, total: usize) -> Self {
        let total = total.max(records.len());
        Self { records, total }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl From<Vec<ContentRecord>> for ContentPage {
    fn from(records: Vec<ContentRecord>) -> Self {
        let total = records.len();
        Self { records, total }
    }
}
