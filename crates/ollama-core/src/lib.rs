mod config;
mod workdir;

pub use config::{AppConfig, LlmConfig, ToolsConfig, UiConfig};
pub use workdir::{WorkingDir, resolve_path};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub type Result<T> = anyhow::Result<T>;

pub const DEFAULT_MODEL: &str = "gemma2:9b";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Directory holding the per-user settings and the observer log.
pub fn user_runtime_dir() -> Option<PathBuf> {
    let home = std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok())?;
    Some(Path::new(&home).join(".ollama-agent"))
}

/// Directory holding project-level settings for `workspace`.
pub fn runtime_dir(workspace: &Path) -> PathBuf {
    workspace.join(".ollama-agent")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A message in a multi-turn conversation, serialized in the shape the
/// `/api/chat` endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered conversation history. Only grows, except through [`Transcript::clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed exchange.
    pub fn push_exchange(&mut self, user: &str, assistant: &str) {
        self.messages.push(ChatMessage::user(user));
        self.messages.push(ChatMessage::assistant(assistant));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// The file, shell and code-analysis operations a model response can invoke.
///
/// Every method returns user-visible text. Implementations convert their own
/// failures into descriptive strings; nothing here is allowed to fail.
pub trait ToolHost {
    fn run_command(&self, command: &str) -> String;
    fn read_file(&self, path: &str) -> String;
    fn write_file(&self, path: &str, content: &str) -> String;
    fn list_files(&self, dir: &str) -> String;
    /// Returns the message and the directory that should become current. On
    /// failure the returned directory is the unchanged current one.
    fn change_directory(&self, dir: &str) -> (String, PathBuf);
    fn search_code(&self, query: &str, file_pattern: Option<&str>) -> String;
    fn find_functions(&self, name: &str, file_pattern: Option<&str>) -> String;
    fn find_todos(&self) -> String;
    fn find_imports(&self, module: &str) -> String;
}
