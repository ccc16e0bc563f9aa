use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SummarizerConfig;
use crate::error::{NewsError, Result};
use crate::normalize::collapse_whitespace;

/// Target summary length in characters.
pub const SUMMARY_LEN: usize = 120;

pub const NO_API_TAG: &str = "[NO-API]";
pub const FALLBACK_TAG: &str = "[FALLBACK]";

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, title: &str, body: &str, url: &str) -> Result<String>;
}

/// First [`SUMMARY_LEN`] characters of the body, or of the title when the body is empty.
pub fn fallback_summary(title: &str, body: &str) -> String {
    let base = if body.trim().is_empty() { title } else { body };
    truncate_chars(&collapse_whitespace(base), SUMMARY_LEN)
}

/// Summarize with `summarizer`, degrading to a tagged [`fallback_summary`].
pub async fn summarize_or_fallback(
    summarizer: Option<&dyn Summarizer>,
    title: &str,
    body: &str,
    url: &str,
) -> String {
    let Some(summarizer) = summarizer else {
        return format!("{} {}", NO_API_TAG, fallback_summary(title, body));
    };

    match summarizer.summarize(title, body, url).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Summarizer failed for {}: {}", url, e);
            format!("{} {}", FALLBACK_TAG, fallback_summary(title, body))
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Whether a generated summary merely restates the title.
pub fn repeats_title(title: &str, summary: &str) -> bool {
    let title: String = title.chars().filter(|c| !c.is_whitespace()).collect();
    let summary: String = summary.chars().filter(|c| !c.is_whitespace()).collect();
    if title.is_empty() {
        return false;
    }
    if summary == title {
        return true;
    }
    let window = 20usize.max(title.chars().count() + 5);
    truncate_chars(&summary, window).contains(&title)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Chat-completions client for OpenAI compatible endpoints.
pub struct OpenAiSummarizer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    topic: String,
}

impl OpenAiSummarizer {
    pub fn new(config: &SummarizerConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            topic: config.topic.clone(),
        })
    }

    /// Build from config and environment.
    ///
    /// Returns `None` when summarizing is disabled or no API key is set. The model
    /// can be overridden with `OPENAI_MODEL`.
    pub fn from_env(config: &SummarizerConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        let api_key = match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                warn!("{} is not set, summaries use the fallback", config.api_key_env);
                return Ok(None);
            }
        };
        let mut summarizer = Self::new(config, api_key)?;
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            summarizer.model = model;
        }
        Ok(Some(summarizer))
    }

    fn prompt(&self, title: &str, body: &str, url: &str, avoid_repetition: bool) -> String {
        let mut rules = vec![
            "日本語で専門家向けに事実ベース、約120字。",
            "地名・主体・金額・面積・期日など固有情報を含める（可能なら）。",
            "不要: 絵文字・感想・推測。",
        ];
        if avoid_repetition {
            rules.push("絶対にタイトルの文言を繰り返さない。タイトルと異なる言い換え要約にする。");
        }
        let body = if body.is_empty() { "(本文情報が乏しい)" } else { body };

        let mut prompt = format!("以下は{}に関するニュース素材です。\n", self.topic);
        for rule in rules {
            prompt.push_str(&format!("- {}\n", rule));
        }
        prompt.push_str(&format!(
            "\n【タイトル】{}\n【本文候補】{}\n【URL】{}\n",
            title, body, url
        ));
        prompt
    }

    async fn complete(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "あなたは日本語の要約編集者です。".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: 0.2,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let reply: ChatResponse = response.json().await?;
        let text = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(NewsError::Summarizer("empty completion".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, title: &str, body: &str, url: &str) -> Result<String> {
        let body = collapse_whitespace(body);

        let mut text = self.complete(self.prompt(title, &body, url, false)).await?;
        if repeats_title(title, &text) {
            debug!("Summary repeats the title, regenerating: {}", url);
            text = self.complete(self.prompt(title, &body, url, true)).await?;
        }

        Ok(truncate_chars(&text, SUMMARY_LEN * 2))
    }
}
