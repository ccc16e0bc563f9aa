//! Fallback body text from an article's own page.
//!
//! Some municipal feeds ship titles only. When that happens the linked page's
//! `og:description` / `description` meta tag is the cheapest usable body.

use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::error::{NewsError, Result};
use crate::fetcher::USER_AGENT;

const META_SELECTORS: [&str; 2] = [
    r#"meta[property="og:description"]"#,
    r#"meta[name="description"]"#,
];

pub struct MetaScraper {
    client: Option<Client>,
    max_per_run: usize,
    attempts: usize,
}

impl MetaScraper {
    /// A scraper that never makes a request.
    pub fn disabled() -> Self {
        Self {
            client: None,
            max_per_run: 0,
            attempts: 0,
        }
    }

    pub fn new(max_per_run: usize, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Some(client),
            max_per_run,
            attempts: 0,
        })
    }

    /// Requests made so far in this run.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Start a new run with the full request allowance.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn exhausted(&self) -> bool {
        self.client.is_none() || self.attempts >= self.max_per_run
    }

    /// Fetch `url` and return its meta description.
    ///
    /// Every request counts toward the per-run cap, successful or not.
    /// Failures are logged and yield `None`.
    pub async fn describe(&mut self, url: &str) -> Option<String> {
        if url.is_empty() || self.exhausted() {
            return None;
        }
        let client = self.client.as_ref()?;
        self.attempts += 1;

        match Self::fetch_page(client, url).await {
            Ok(html) => {
                let description = extract_meta_description(&html);
                if description.is_some() {
                    info!("Captured meta description from {}", url);
                }
                description
            }
            Err(e) => {
                debug!("Meta description lookup failed for {}: {}", url, e);
                None
            }
        }
    }

    async fn fetch_page(client: &Client, url: &str) -> Result<String> {
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

/// `og:description` if present, `description` otherwise; blank values count as absent.
pub fn extract_meta_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    META_SELECTORS.iter().find_map(|selector| {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    mod extract_meta_description_tests {
        use super::*;

        #[test]
        fn test_og_description_preferred() {
            let html = r#"<html><head>
                <meta name="description" content="一般">
                <meta property="og:description" content="OGの説明">
            </head></html>"#;
            assert_eq!(extract_meta_description(html), Some("OGの説明".to_string()));
        }

        #[test]
        fn test_name_description_fallback() {
            let html = r#"<html><head><meta name="description" content=" 用地取得について "></head></html>"#;
            assert_eq!(extract_meta_description(html), Some("用地取得について".to_string()));
        }

        #[test]
        fn test_blank_og_description_skipped() {
            let html = r#"<html><head>
                <meta property="og:description" content="  ">
                <meta name="description" content="本文">
            </head></html>"#;
            assert_eq!(extract_meta_description(html), Some("本文".to_string()));
        }

        #[test]
        fn test_no_meta() {
            assert_eq!(extract_meta_description("<html><body>x</body></html>"), None);
        }
    }

    mod describe_tests {
        use super::*;

        fn page() -> ResponseTemplate {
            ResponseTemplate::new(200).set_body_string(
                r#"<html><head><meta name="description" content="保留地の公売"></head></html>"#,
            )
        }

        #[tokio::test]
        async fn test_disabled_makes_no_request() {
            let mut scraper = MetaScraper::disabled();
            assert!(scraper.exhausted());
            assert_eq!(scraper.describe("http://127.0.0.1:1/x").await, None);
            assert_eq!(scraper.attempts(), 0);
        }

        #[tokio::test]
        async fn test_describe_page() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/page"))
                .respond_with(page())
                .mount(&server)
                .await;

            let mut scraper = MetaScraper::new(10, Duration::from_secs(5)).unwrap();
            let got = scraper.describe(&format!("{}/page", server.uri())).await;

            assert_eq!(got, Some("保留地の公売".to_string()));
            assert_eq!(scraper.attempts(), 1);
        }

        #[tokio::test]
        async fn test_cap_counts_failed_requests() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/missing"))
                .respond_with(ResponseTemplate::new(404))
                .expect(2)
                .mount(&server)
                .await;

            let mut scraper = MetaScraper::new(2, Duration::from_secs(5)).unwrap();
            let url = format!("{}/missing", server.uri());
            assert_eq!(scraper.describe(&url).await, None);
            assert_eq!(scraper.describe(&url).await, None);
            assert!(scraper.exhausted());
            // third call is refused before any request is made
            assert_eq!(scraper.describe(&url).await, None);
            assert_eq!(scraper.attempts(), 2);
        }

        #[tokio::test]
        async fn test_reset_restores_allowance() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(page())
                .expect(2)
                .mount(&server)
                .await;

            let mut scraper = MetaScraper::new(1, Duration::from_secs(5)).unwrap();
            assert!(scraper.describe(&server.uri()).await.is_some());
            assert!(scraper.exhausted());

            scraper.reset();
            assert_eq!(scraper.attempts(), 0);
            assert!(!scraper.exhausted());
            assert!(scraper.describe(&server.uri()).await.is_some());
        }

        #[test]
        fn test_reset_keeps_disabled_scraper_disabled() {
            let mut scraper = MetaScraper::disabled();
            scraper.reset();
            assert!(scraper.exhausted());
        }

        #[tokio::test]
        async fn test_empty_url_not_counted() {
            let mut scraper = MetaScraper::new(1, Duration::from_secs(5)).unwrap();
            assert_eq!(scraper.describe("").await, None);
            assert_eq!(scraper.attempts(), 0);
        }
    }
}
