use ollama_core::{ChatMessage, LlmConfig, Transcript};
use reqwest::blocking::Client;
use serde_json::{Value, json};
use std::process::Command;
use std::time::Duration;
use thiserror::Error;

/// Why a chat request produced no assistant text.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("invalid JSON in response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response is missing message.content")]
    MissingContent,
}

/// Prefix shared by every chat failure shown to the user.
pub fn chat_error_text(err: &LlmError) -> String {
    format!("Error communicating with Ollama: {err}")
}

pub trait ChatBackend {
    /// Sends `message` with the conversation so far. On success the exchange
    /// is appended to the transcript; on failure the transcript is untouched.
    fn try_chat(&mut self, message: &str, system_prompt: Option<&str>) -> Result<String, LlmError>;

    /// Like [`ChatBackend::try_chat`], with failures rendered as text.
    fn chat(&mut self, message: &str, system_prompt: Option<&str>) -> String {
        match self.try_chat(message, system_prompt) {
            Ok(text) => text,
            Err(err) => chat_error_text(&err),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    model: String,
    base_url: String,
    transcript: Transcript,
    client: Client,
}

impl OllamaClient {
    pub fn new(cfg: &LlmConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()?;
        Ok(Self {
            model: cfg.model.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            transcript: Transcript::new(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn clear_conversation(&mut self) {
        self.transcript.clear();
    }

    /// Switches model. The old conversation does not carry over.
    pub fn set_model(&mut self, model: &str) {
        self.model = model.to_string();
        self.transcript.clear();
    }

    /// Models known to the server, falling back to the `ollama` binary when
    /// the HTTP listing is unavailable. Empty when neither works.
    pub fn list_models(&self) -> Vec<String> {
        match self.fetch_tags() {
            Ok(models) => models,
            Err(_) => list_models_via_cli(),
        }
    }

    fn fetch_tags(&self) -> Result<Vec<String>, LlmError> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }
        parse_tags_payload(&body)
    }

    fn build_payload(&self, message: &str, system_prompt: Option<&str>) -> Value {
        let mut messages = Vec::with_capacity(self.transcript.len() + 2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage::system(system));
        }
        messages.extend(self.transcript.messages().iter().cloned());
        messages.push(ChatMessage::user(message));
        json!({
            "model": self.model,
            "messages": messages,
            "stream": false
        })
    }
}

impl ChatBackend for OllamaClient {
    fn try_chat(&mut self, message: &str, system_prompt: Option<&str>) -> Result<String, LlmError> {
        let payload = self.build_payload(message, system_prompt);
        let resp = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&payload)
            .send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }
        let reply = parse_chat_payload(&body)?;
        self.transcript.push_exchange(message, &reply);
        Ok(reply)
    }
}

fn status_error(status: u16, body: &str) -> LlmError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(ToString::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect());
    LlmError::Status { status, detail }
}

fn parse_chat_payload(body: &str) -> Result<String, LlmError> {
    let value: Value = serde_json::from_str(body)?;
    value
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(ToString::to_string)
        .ok_or(LlmError::MissingContent)
}

fn parse_tags_payload(body: &str) -> Result<Vec<String>, LlmError> {
    let value: Value = serde_json::from_str(body)?;
    Ok(value
        .get("models")
        .and_then(|v| v.as_array())
        .map(|models| {
            models
                .iter()
                .filter_map(|m| m.get("name").and_then(|n| n.as_str()))
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default())
}

fn list_models_via_cli() -> Vec<String> {
    let Ok(output) = Command::new("ollama").arg("list").output() else {
        return Vec::new();
    };
    if !output.status.success() {
        return Vec::new();
    }
    parse_ollama_list(&String::from_utf8_lossy(&output.stdout))
}

/// Extracts model names from `ollama list` output (header line skipped).
pub fn parse_ollama_list(stdout: &str) -> Vec<String> {
    stdout
        .trim()
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(ToString::to_string)
        .collect()
}
