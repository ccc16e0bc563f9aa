use std::time::Duration;

use async_trait::async_trait;
use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::{NewsError, Result};
use crate::item::CandidateItem;
use crate::normalize::clean_html;

pub const USER_AGENT: &str = "IwateNews/1.0 (RSS Aggregator)";

/// Anything that can turn a feed url into candidate entries.
#[async_trait]
pub trait FeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<CandidateItem>>;
}

pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    /// Parse a feed document into candidates, in document order.
    pub fn parse_feed(bytes: &[u8]) -> Result<Vec<CandidateItem>> {
        let parsed = parser::parse(bytes)?;
        Ok(parsed.entries.into_iter().map(Self::candidate_from_entry).collect())
    }

    pub fn candidate_from_entry(entry: Entry) -> CandidateItem {
        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .unwrap_or_default();

        let link = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();

        // Full content when the feed carries it, the summary otherwise
        let body = entry
            .content
            .as_ref()
            .and_then(|c| c.body.as_deref())
            .map(clean_html)
            .filter(|b| !b.trim().is_empty())
            .or_else(|| entry.summary.as_ref().map(|s| clean_html(&s.content)))
            .unwrap_or_default();

        CandidateItem {
            title,
            body,
            link,
            published: entry.published,
            updated: entry.updated,
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<CandidateItem>> {
        info!("Fetching feed: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        debug!("Received {} bytes from {}", bytes.len(), url);

        Self::parse_feed(&bytes)
    }
}
