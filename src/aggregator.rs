use chrono::{DateTime, SubsecRound, Utc};

use crate::item::{AcceptedItem, ResultSet};

/// Pick the entry's publication time: published, then updated, then `now`.
///
/// Timestamps are kept at whole-second precision in UTC.
pub fn resolve_published<F>(
    published: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
    now: F,
) -> DateTime<Utc>
where
    F: FnOnce() -> DateTime<Utc>,
{
    published.or(updated).unwrap_or_else(now).trunc_subsecs(0)
}

/// Collects accepted items across feeds in arrival order.
#[derive(Debug)]
pub struct Aggregator {
    items: Vec<AcceptedItem>,
    max_items: usize,
}

impl Aggregator {
    pub fn new(max_items: usize) -> Self {
        Self {
            items: Vec::new(),
            max_items,
        }
    }

    pub fn push(&mut self, item: AcceptedItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sort newest first and keep the `max_items` most recent.
    ///
    /// The sort is stable, so equal timestamps keep their arrival order.
    pub fn finish(self) -> ResultSet {
        let mut items = self.items;
        items.sort_by(|a, b| b.published.cmp(&a.published));
        items.truncate(self.max_items);
        ResultSet::from_sorted(items)
    }
}
