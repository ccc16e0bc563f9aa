//! Iwate News - a keyword-filtered RSS digest
//!
//! Fetches a list of RSS/Atom feeds, keeps the entries that match the
//! configured topic keywords (per-feed rules can override, extend or tighten
//! them), and renders the newest matches as a static page with a dated
//! archive copy.
//!
//! ```text
//! rules file -> FeedSource -> Classifier -> Aggregator -> SiteRenderer
//! ```

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod item;
pub mod normalize;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod rules;
pub mod scrape;
pub mod summarizer;
