use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::env;
use std::error::Error;
use std::fmt;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// How much of a raw LLM reply we keep when parsing fails. Enough for
/// diagnostics without dumping whole completions into responses and logs.
const RAW_TEXT_TRUNCATE_LEN: usize = 500;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
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
    message: ChatMessage,
}

#[derive(Debug)]
pub enum LlmError {
    EnvironmentError(String),
    HttpError(reqwest::Error),
    ResponseError(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::EnvironmentError(msg) => write!(f, "Environment error: {}", msg),
            LlmError::HttpError(err) => write!(f, "HTTP error: {}", err),
            LlmError::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::HttpError(err)
    }
}

/// Prompt in, free text out. The reply is NOT guaranteed to be valid JSON;
/// callers go through [`parse_llm_json`] when they expect structure.
pub trait TextCompletion {
    fn complete(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new() -> Result<Self, LlmError> {
        let api_key = env::var("LLM_API_KEY")
            .map_err(|_| LlmError::EnvironmentError("LLM_API_KEY not set".to_string()))?;
        let api_base = env::var("LLM_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let model = env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            client: Client::new(),
            api_base,
            api_key,
            model,
        })
    }
}

impl TextCompletion for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.7,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LlmError::ResponseError(format!(
                "LLM API returned error status: {}",
                response.status()
            )));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::ResponseError("LLM reply had no choices".to_string()))
    }
}

/// Parse an LLM reply that is supposed to be a JSON object.
///
/// Strict parse first; on failure, extract the first brace-balanced object
/// from the text (models love to wrap JSON in prose or markdown fences) and
/// retry. On total failure the `Err` carries a structured error value with
/// the raw reply truncated for diagnostics.
pub fn parse_llm_json(text: &str) -> Result<Value, Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
        if value.is_object() {
            return Ok(value);
        }
    }

    if let Some(candidate) = extract_json_object(text) {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            return Ok(value);
        }
    }

    Err(json!({
        "error": "LLM reply was not valid JSON",
        "raw": truncate_raw(text),
    }))
}

/// First brace-balanced `{...}` block in the text, if any. Braces inside
/// string literals are skipped.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn truncate_raw(text: &str) -> String {
    if text.len() <= RAW_TEXT_TRUNCATE_LEN {
        return text.to_string();
    }
    let mut end = RAW_TEXT_TRUNCATE_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_json_parses_directly() {
        let parsed = parse_llm_json(r#"{"summary": "ok"}"#).unwrap();
        assert_eq!(parsed["summary"], "ok");
    }

    #[test]
    fn json_wrapped_in_prose_is_recovered() {
        let text = "Sure! Here is the plan:\n```json\n{\"days\": 2}\n```\nEnjoy!";
        let parsed = parse_llm_json(text).unwrap();
        assert_eq!(parsed["days"], 2);
    }

    #[test]
    fn braces_inside_strings_do_not_break_extraction() {
        let text = r#"reply: {"note": "use {curly} braces", "n": 1} trailing"#;
        let parsed = parse_llm_json(text).unwrap();
        assert_eq!(parsed["n"], 1);
    }

    #[test]
    fn unparseable_reply_yields_truncated_error_object() {
        let text = "x".repeat(2000);
        let err = parse_llm_json(&text).unwrap_err();
        let raw = err["raw"].as_str().unwrap();
        assert!(raw.len() < 600);
        assert!(raw.ends_with("..."));
        assert_eq!(err["error"], "LLM reply was not valid JSON");
    }
}
