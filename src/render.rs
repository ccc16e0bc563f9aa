use std::path::{Path, PathBuf};

use askama::Template;
use chrono::{DateTime, FixedOffset, Utc};
use tracing::info;

use crate::config::SiteConfig;
use crate::error::Result;
use crate::item::{AcceptedItem, ResultSet};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    site: &'a SiteConfig,
    groups: Vec<DateGroup<'a>>,
    updated_at: String,
    offset_label: String,
}

/// Items published on one calendar day in the display offset.
#[derive(Debug)]
pub struct DateGroup<'a> {
    pub day: String,
    pub items: Vec<&'a AcceptedItem>,
}

/// Paths written by [`SiteRenderer::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSite {
    pub index: PathBuf,
    pub archive: PathBuf,
}

pub struct SiteRenderer {
    site: SiteConfig,
    site_dir: PathBuf,
    offset: FixedOffset,
}

impl SiteRenderer {
    pub fn new(site: SiteConfig, site_dir: impl Into<PathBuf>, offset: FixedOffset) -> Self {
        Self {
            site,
            site_dir: site_dir.into(),
            offset,
        }
    }

    pub fn site_dir(&self) -> &Path {
        &self.site_dir
    }

    /// Render the page. `now` only feeds the "last updated" line.
    pub fn render(&self, items: &ResultSet, now: DateTime<Utc>) -> Result<String> {
        let template = IndexTemplate {
            site: &self.site,
            groups: group_by_day(items, self.offset),
            updated_at: now.with_timezone(&self.offset).format("%Y-%m-%d %H:%M").to_string(),
            offset_label: self.offset.to_string(),
        };
        Ok(template.render()?)
    }

    /// Write `index.html` and `archive/<date>.html` under the site directory.
    ///
    /// Archive files accumulate; a second run on the same day replaces that day's file.
    pub fn write(&self, items: &ResultSet, now: DateTime<Utc>) -> Result<RenderedSite> {
        let html = self.render(items, now)?;

        let archive_dir = self.site_dir.join("archive");
        std::fs::create_dir_all(&archive_dir)?;

        let index = self.site_dir.join("index.html");
        std::fs::write(&index, &html)?;

        let day = now.with_timezone(&self.offset).format("%Y-%m-%d");
        let archive = archive_dir.join(format!("{}.html", day));
        std::fs::write(&archive, &html)?;

        info!("Wrote {} ({} items) and {}", index.display(), items.len(), archive.display());
        Ok(RenderedSite { index, archive })
    }
}

/// Group items by display-offset date, newest date first.
///
/// Within a day items keep their order in `items`.
pub fn group_by_day(items: &ResultSet, offset: FixedOffset) -> Vec<DateGroup<'_>> {
    let mut groups: Vec<DateGroup<'_>> = Vec::new();

    for item in items {
        let day = item.published.with_timezone(&offset).format("%Y-%m-%d").to_string();
        match groups.iter().position(|g| g.day == day) {
            Some(index) => groups[index].items.push(item),
            None => groups.push(DateGroup {
                day,
                items: vec![item],
            }),
        }
    }

    groups.sort_by(|a, b| b.day.cmp(&a.day));
    groups
}
