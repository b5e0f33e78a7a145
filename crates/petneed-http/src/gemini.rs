//! Gemini-backed criteria extractor.
//!
//! The model is prompted with the criteria vocabulary used by the upstream
//! dataset and asked for a JSON object. Anything that does not parse, or that
//! parses to no criteria at all, is treated as "not a search".
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use petneed_core::config::GeminiSettings;
use petneed_core::traits::CriteriaExtractor;
use petneed_core::{Error, Result, SearchCriteria};

use crate::build_client;

const API_KEY_HEADER: &str = "x-goog-api-key";

const PROMPT: &str = r#"
You are a pet adoption assistant. Your task is to analyze the user's request and extract search criteria for finding a pet.
The user's request is: "{query}"

Based on the request, identify the following criteria:
- kind: "貓" or "狗"
- sex: "公" or "母"
- body_type: "小型", "中型", or "大型"
- age: "幼年", "成年"
- color: "白", "黑", "黃", "棕", "灰", "虎斑", "三花", "其他"

Return the criteria as a JSON object. If a criterion is not mentioned, omit it from the JSON.
For example, if the user says "我想找一隻小隻的母狗", you should return:
{
  "kind": "狗",
  "sex": "母",
  "body_type": "小型"
}
If the user says "有貓嗎", you should return:
{
  "kind": "貓"
}
If the user's query is not related to finding a pet, return an empty JSON object {}.
"#;

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

pub struct GeminiExtractor {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiExtractor {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::InvalidConfig("gemini api key is empty".to_string()));
        }
        Ok(Self {
            client: build_client(timeout)?,
            api_key,
            model: model.into(),
            base_url: base_url.into(),
        })
    }

    /// `None` when no API key is configured.
    pub fn from_settings(
        settings: &GeminiSettings,
        timeout: Option<Duration>,
    ) -> Result<Option<Self>> {
        match settings.api_key.as_deref() {
            Some(key) if !key.is_empty() => {
                Self::new(key, settings.model.clone(), settings.base_url.clone(), timeout).map(Some)
            }
            _ => Ok(None),
        }
    }

    async fn generate(&self, prompt: String) -> Result<Option<String>> {
        // key goes in a header; urls end up in logs and error text
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/models/{}:generateContent", self.model);
        let request = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
        };
        debug!(url = %url, "sending criteria prompt");
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::fetch(&url, e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(&url, format!("HTTP {status}")));
        }
        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.without_url().to_string()))?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text);
        Ok(text)
    }
}

#[async_trait]
impl CriteriaExtractor for GeminiExtractor {
    async fn extract(&self, text: &str) -> Result<Option<SearchCriteria>> {
        let Some(reply) = self.generate(build_prompt(text)).await? else { return Ok(None) };
        Ok(criteria_from_reply(&reply))
    }
}

pub fn build_prompt(query: &str) -> String { PROMPT.replace("{query}", query) }

/// Strip a ```json fence the model may wrap its answer in.
pub fn clean_json_string(s: &str) -> &str {
    let s = s.trim();
    match s.strip_prefix("```json") {
        Some(inner) => inner.strip_suffix("```").unwrap_or(inner).trim(),
        None => s,
    }
}

pub fn criteria_from_reply(reply: &str) -> Option<SearchCriteria> {
    let json = clean_json_string(reply);
    match serde_json::from_str::<SearchCriteria>(json) {
        Ok(criteria) if criteria.is_empty() => None,
        Ok(criteria) => Some(criteria),
        Err(e) => { warn!(error = %e, raw = json, "model reply is not criteria JSON"); None }
    }
}
