use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::aggregator::{resolve_published, Aggregator};
use crate::classifier::accept;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{FeedSource, HttpFeedSource};
use crate::item::{AcceptedItem, ResultSet};
use crate::resolver::{resolve, GlobalWordSets};
use crate::rules::{default_rules, FeedRule};
use crate::scrape::MetaScraper;
use crate::summarizer::{summarize_or_fallback, OpenAiSummarizer, Summarizer};

/// Counters for one run, logged when it finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub feeds: usize,
    pub failed_feeds: usize,
    pub total_entries: usize,
    pub extracted: usize,
    pub scraped: usize,
}

/// One pass over every configured feed. Feeds are handled one at a time, in order.
pub struct Pipeline<S> {
    source: S,
    globals: GlobalWordSets,
    max_items: usize,
    default_feeds: Vec<String>,
    scraper: MetaScraper,
    summarize: bool,
    summarizer: Option<Box<dyn Summarizer>>,
    clock: fn() -> DateTime<Utc>,
}

impl Pipeline<HttpFeedSource> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = HttpFeedSource::new(Duration::from_secs(config.request_timeout_secs))?;

        let scraper = if config.scrape.enabled {
            MetaScraper::new(
                config.scrape.max_per_run,
                Duration::from_secs(config.scrape.timeout_secs),
            )?
        } else {
            MetaScraper::disabled()
        };

        let mut pipeline = Self::new(source, config.keywords.word_sets(), config.max_items)
            .with_default_feeds(config.default_feeds.clone())
            .with_scraper(scraper);

        if config.summarizer.enabled {
            let summarizer = OpenAiSummarizer::from_env(&config.summarizer)?
                .map(|s| Box::new(s) as Box<dyn Summarizer>);
            pipeline = pipeline.with_summaries(summarizer);
        }

        Ok(pipeline)
    }
}

impl<S: FeedSource> Pipeline<S> {
    pub fn new(source: S, globals: GlobalWordSets, max_items: usize) -> Self {
        Self {
            source,
            globals,
            max_items,
            default_feeds: Vec::new(),
            scraper: MetaScraper::disabled(),
            summarize: false,
            summarizer: None,
            clock: Utc::now,
        }
    }

    /// Feeds to use when the rule list is empty.
    pub fn with_default_feeds(mut self, urls: Vec<String>) -> Self {
        self.default_feeds = urls;
        self
    }

    pub fn with_scraper(mut self, scraper: MetaScraper) -> Self {
        self.scraper = scraper;
        self
    }

    /// Attach a summary to every accepted item. Without a summarizer the
    /// tagged fallback text is used.
    pub fn with_summaries(mut self, summarizer: Option<Box<dyn Summarizer>>) -> Self {
        self.summarize = true;
        self.summarizer = summarizer;
        self
    }

    /// Clock used for entries that carry no timestamp.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn run(&mut self, rules: Vec<FeedRule>) -> (ResultSet, RunStats) {
        let rules = if rules.is_empty() {
            let defaults = default_rules(&self.default_feeds);
            info!("No feed rules configured, using {} default feeds", defaults.len());
            defaults
        } else {
            rules
        };

        self.scraper.reset();
        let mut stats = RunStats::default();
        let mut aggregator = Aggregator::new(self.max_items);

        for rule in &rules {
            stats.feeds += 1;
            let effective = resolve(rule, &self.globals);

            info!("Fetching {}{}", rule.url, if rule.pass_all { " (ALL)" } else { "" });
            let start = Instant::now();
            let candidates = match self.source.fetch(&rule.url).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    error!("Failed to fetch feed '{}': {}", rule.url, e);
                    stats.failed_feeds += 1;
                    continue;
                }
            };
            info!(
                "Fetched {} entries from {} in {:.1}s",
                candidates.len(),
                rule.url,
                start.elapsed().as_secs_f64()
            );

            for mut candidate in candidates {
                stats.total_entries += 1;

                if candidate.body.trim().is_empty() && !self.scraper.exhausted() {
                    if let Some(description) = self.scraper.describe(&candidate.link).await {
                        candidate.body = description;
                        stats.scraped += 1;
                    }
                }

                if !accept(&candidate, &effective) {
                    continue;
                }

                let published = resolve_published(candidate.published, candidate.updated, self.clock);
                let mut item = AcceptedItem::new(&candidate.title, &candidate.link, published);
                if self.summarize {
                    let summary = summarize_or_fallback(
                        self.summarizer.as_deref(),
                        &candidate.title,
                        &candidate.body,
                        &candidate.link,
                    )
                    .await;
                    item = item.with_summary(summary);
                }

                debug!("Accepted: {} {}", item.title, item.url);
                aggregator.push(item);
            }
        }

        stats.extracted = aggregator.len();
        info!(
            "Run complete: feeds={}, failed={}, total_entries={}, extracted={}, scraped={}",
            stats.feeds, stats.failed_feeds, stats.total_entries, stats.extracted, stats.scraped
        );

        (aggregator.finish(), stats)
    }
}
