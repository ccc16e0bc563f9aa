use std::path::Path;

use anyhow::Context;
use chrono::FixedOffset;
use serde::Deserialize;
use tracing::info;

use crate::resolver::GlobalWordSets;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Upper bound on items in the rendered page
    pub max_items: usize,
    /// Rule file, relative to the working root
    pub rules_path: String,
    /// Output directory, relative to the working root
    pub site_dir: String,
    /// Offset used to group items by date and to name archive files
    pub utc_offset_hours: i32,
    /// Feed request timeout in seconds
    pub request_timeout_secs: u64,
    /// Feeds used when the rule file is missing or empty
    pub default_feeds: Vec<String>,
    pub keywords: KeywordConfig,
    pub site: SiteConfig,
    pub scrape: ScrapeConfig,
    pub summarizer: SummarizerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            rules_path: "config/feeds.txt".to_string(),
            site_dir: "site".to_string(),
            utc_offset_hours: 9,
            request_timeout_secs: 6,
            default_feeds: default_feeds(),
            keywords: KeywordConfig::default(),
            site: SiteConfig::default(),
            scrape: ScrapeConfig::default(),
            summarizer: SummarizerConfig::default(),
        }
    }
}

fn default_max_items() -> usize {
    1000
}

fn default_feeds() -> Vec<String> {
    vec![
        "https://www.pref.iwate.jp/news.rss".to_string(),
        "https://www.city.morioka.iwate.jp/news.rss".to_string(),
    ]
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KeywordConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            include: words(&[
                // prices and taxes
                "不動産", "地価", "地価調査", "公示地価", "路線価", "固定資産税", "地価指数",
                // housing
                "住宅", "空き家", "空家", "賃貸", "分譲", "マンション", "戸建", "団地",
                // land and development
                "用地", "用地取得", "収用", "保留地", "造成", "宅地", "宅地造成", "区画", "区画整理",
                // planning
                "都市計画", "用途地域", "市街化", "地区計画", "立地適正化", "再開発", "再整備", "再生",
                "PFI", "PPP", "土地", "建物", "老朽化", "建て替え", "建替", "物件", "着工", "閉館",
                "竣工", "解体", "開業", "閉業", "開店", "閉店", "用途変更", "売却", "譲渡", "利活用",
                "店舗", "工場", "観光", "ホテル", "経済効果", "統計", "推移", "施設", "老人ホーム",
                "建築", "閉校", "廃校", "統廃合", "跡地", "旅館", "温泉", "改修", "ショッピングセンター",
            ]),
            exclude: words(&[
                "暴風", "雷", "台風", "被害", "火災", "全焼", "半焼", "焼け跡", "クマ", "グマ",
                "猛暑", "天候", "天気",
            ]),
        }
    }
}

impl KeywordConfig {
    pub fn word_sets(&self) -> GlobalWordSets {
        GlobalWordSets::new(self.include.clone(), self.exclude.clone())
    }
}

/// Page chrome. The `*_html` fields are inserted without escaping.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SiteConfig {
    /// Browser tab title
    pub title: String,
    pub heading_html: String,
    pub description_html: String,
    pub footer_html: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "岩手県 不動産まとめサイト（毎日7:00自動更新）".to_string(),
            heading_html: "岩手県 不動産まとめサイト<br>（毎日7:00自動更新）".to_string(),
            description_html: "岩手×不動産・土地・建設・都市計画の新着情報をRSSから自動抽出".to_string(),
            footer_html: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Look up the page's meta description when an entry has no body
    pub enabled: bool,
    /// Page requests allowed per run
    pub max_per_run: usize,
    pub timeout_secs: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_per_run: 10,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SummarizerConfig {
    pub enabled: bool,
    /// Subject line given to the model
    pub topic: String,
    pub model: String,
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            topic: "岩手県の不動産・土地・建設・都市計画".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Like [`Config::load`], but a missing file means all defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// The offset pages are dated in.
    pub fn display_offset(&self) -> anyhow::Result<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .with_context(|| {
                format!("utc_offset_hours out of range: {}", self.utc_offset_hours)
            })
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
