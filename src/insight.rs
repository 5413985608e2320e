use std::env;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::http_client::http_client;
use crate::model::{DEFAULT_INSIGHT, Team};

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-5-nano";

const SYSTEM_PROMPT: &str = "You are an expert FTC (FIRST Tech Challenge) scouting assistant that provides unbiased, data-driven team analysis. Evaluate the team objectively from its performance metrics; the main factor is point scoring. Use a 1.0-10.0 scoring system with one decimal place. Respond in exactly this format:\n$STRENGTH: <li>[strength 1]</li> <li>[strength 2]</li>\n$WEAKNESS: <li>[weakness 1]</li> <li>[weakness 2]</li>\n$SCORE: [numerical score]";

/// Black-box natural-language analysis generator: team summary in,
/// formatted text out.
pub trait InsightGenerator {
    fn generate(&self, team: &Team) -> Result<String>;
}

/// Sections parsed out of generated insight text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insight {
    pub strength: Option<String>,
    pub weakness: Option<String>,
    pub score: Option<String>,
}

pub struct OpenAiInsight {
    api_key: String,
    model: String,
}

impl OpenAiInsight {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let model = env::var("FTC_INSIGHT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self { api_key, model })
    }
}

impl InsightGenerator for OpenAiInsight {
    fn generate(&self, team: &Team) -> Result<String> {
        let client = http_client()?;
        let summary = summary_payload(team)?;
        let resp = client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": format!("Analyze: {summary}") },
                ],
            }))
            .send()
            .context("insight request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {status}: {body}"));
        }
        parse_completion_json(&body)
    }
}

/// Serializes the team record for the generator with any previously stored
/// insight cleared, so stale analysis never leaks into the summary context.
pub fn summary_payload(team: &Team) -> Result<String> {
    let mut payload = team.clone();
    for season in &mut payload.seasons {
        season.ai_insight = DEFAULT_INSIGHT.to_string();
    }
    serde_json::to_string(&payload).context("serialize insight payload")
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: String,
}

pub fn parse_completion_json(raw: &str) -> Result<String> {
    let resp: CompletionResponse =
        serde_json::from_str(raw.trim()).context("invalid completion json")?;
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("completion response has no choices"))?;
    Ok(choice.message.content)
}

/// Pulls the $STRENGTH / $WEAKNESS / $SCORE sections out of generated text.
/// Tolerates the stray closing markers some generations emit.
pub fn format_insight(text: &str) -> Insight {
    let mut cleaned = text.to_string();
    for marker in [
        "</$WEAKNESS$>",
        "</$WEAKNESS>",
        "</$STRENGTH$>",
        "</$STRENGTH>",
    ] {
        cleaned = cleaned.replace(marker, "");
    }
    Insight {
        strength: section(&cleaned, "$STRENGTH:"),
        weakness: section(&cleaned, "$WEAKNESS:"),
        score: section(&cleaned, "$SCORE:"),
    }
}

fn section(text: &str, tag: &str) -> Option<String> {
    let start = text.find(tag)? + tag.len();
    let rest = &text[start..];
    let end = rest.find('$').unwrap_or(rest.len());
    let value = rest[..end].trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
