use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iwate_news::config::Config;
use iwate_news::pipeline::Pipeline;
use iwate_news::render::SiteRenderer;
use iwate_news::rules::read_rules_file;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iwate_news=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let root = PathBuf::from(std::env::var("IWATE_ROOT").unwrap_or_else(|_| ".".to_string()));
    let config_path = std::env::var("IWATE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| root.join("iwate-news.toml"));

    // Load configuration
    let config = Config::load_or_default(&config_path)?;
    let rules_path = root.join(&config.rules_path);
    let rules = read_rules_file(&rules_path)
        .with_context(|| format!("reading rules from {}", rules_path.display()))?;
    info!("Loaded {} feed rules from {}", rules.len(), rules_path.display());

    let offset = config.display_offset()?;

    let mut pipeline = Pipeline::from_config(&config)?;
    let (results, stats) = pipeline.run(rules).await;

    let renderer = SiteRenderer::new(config.site.clone(), root.join(&config.site_dir), offset);
    let written = renderer.write(&results, Utc::now())?;

    info!(
        "Generated {} ({} of {} extracted items, {} feeds failed)",
        written.index.display(),
        results.len(),
        stats.extracted,
        stats.failed_feeds
    );

    Ok(())
}
