use chrono::{DateTime, Utc};
use url::Url;

/// A feed entry waiting for classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateItem {
    pub title: String,
    /// Plain text body, possibly empty.
    pub body: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedItem {
    pub title: String,
    pub url: String,
    /// Host of `url`, empty when it has none.
    pub source: String,
    pub published: DateTime<Utc>,
    pub summary: Option<String>,
}

impl AcceptedItem {
    pub fn new(title: &str, url: &str, published: DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            source: host_of(url),
            published,
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: String) -> Self {
        self.summary = Some(summary);
        self
    }

    /// `published` as an ISO-8601 string in UTC, e.g. `2025-08-01T09:30:00+00:00`.
    pub fn published_iso(&self) -> String {
        self.published.to_rfc3339()
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(無題)"
        } else {
            &self.title
        }
    }

    pub fn display_url(&self) -> &str {
        if self.url.is_empty() {
            "#"
        } else {
            &self.url
        }
    }
}

/// Authority part of `url` as written: port kept, Unicode hosts not punycoded.
///
/// Empty when `url` does not parse or has no host.
pub fn host_of(url: &str) -> String {
    let url = url.trim();
    match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => url
            .split_once("//")
            .and_then(|(_, rest)| rest.split(['/', '?', '#']).next())
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// Accepted items, newest first, capped in length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    items: Vec<AcceptedItem>,
}

impl ResultSet {
    /// Callers must pass items already in presentation order.
    pub(crate) fn from_sorted(items: Vec<AcceptedItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[AcceptedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AcceptedItem> {
        self.items.iter()
    }

    pub fn into_inner(self) -> Vec<AcceptedItem> {
        self.items
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a AcceptedItem;
    type IntoIter = std::slice::Iter<'a, AcceptedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
