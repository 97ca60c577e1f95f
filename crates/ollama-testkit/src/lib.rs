use anyhow::Result;
use ollama_core::{ToolHost, Transcript, WorkingDir};
use ollama_llm::{ChatBackend, LlmError};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Creates a scratch workspace holding `files` (relative path, content).
pub fn workspace_with(files: &[(&str, &str)]) -> Result<TempDir> {
    let dir = TempDir::new()?;
    for (rel, content) in files {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    Ok(dir)
}

/// Chat backend that answers from a fixed script and remembers every prompt.
#[derive(Debug, Default)]
pub struct ScriptedChatBackend {
    replies: VecDeque<std::result::Result<String, String>>,
    prompts: Vec<(String, Option<String>)>,
    transcript: Transcript,
}

impl ScriptedChatBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, text: impl Into<String>) -> Self {
        self.replies.push_back(Ok(text.into()));
        self
    }

    /// Queues a failure reported as an HTTP 500 with `detail`.
    pub fn fail(mut self, detail: impl Into<String>) -> Self {
        self.replies.push_back(Err(detail.into()));
        self
    }

    /// `(message, system_prompt)` for every request, in order.
    pub fn prompts(&self) -> Vec<(String, Option<String>)> {
        self.prompts.clone()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}

impl ChatBackend for ScriptedChatBackend {
    fn try_chat(
        &mut self,
        message: &str,
        system_prompt: Option<&str>,
    ) -> std::result::Result<String, LlmError> {
        self.prompts
            .push((message.to_string(), system_prompt.map(ToString::to_string)));
        match self.replies.pop_front() {
            Some(Ok(text)) => {
                self.transcript.push_exchange(message, &text);
                Ok(text)
            }
            Some(Err(detail)) => Err(LlmError::Status {
                status: 500,
                detail,
            }),
            None => Err(LlmError::MissingContent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    RunCommand(String),
    ReadFile(String),
    WriteFile { path: String, content: String },
    ListFiles(String),
    ChangeDirectory(String),
    SearchCode { query: String, pattern: Option<String> },
    FindFunctions { name: String, pattern: Option<String> },
    FindTodos,
    FindImports(String),
}

/// Tool host that records calls and answers with `[operation argument]`.
///
/// Clones share the call log, so a test can keep one clone while handing
/// another to the code under test.
#[derive(Debug, Clone)]
pub struct RecordingToolHost {
    workdir: WorkingDir,
    calls: Arc<Mutex<Vec<ToolCall>>>,
    dirs: Arc<Mutex<Vec<String>>>,
}

impl RecordingToolHost {
    pub fn new(workdir: WorkingDir) -> Self {
        Self {
            workdir,
            calls: Arc::default(),
            dirs: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The working directory seen by each call.
    pub fn observed_dirs(&self) -> Vec<String> {
        self.dirs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, call: ToolCall) {
        self.dirs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(self.workdir.get().display().to_string());
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }
}

impl ToolHost for RecordingToolHost {
    fn run_command(&self, command: &str) -> String {
        self.record(ToolCall::RunCommand(command.to_string()));
        format!("[run_command {command}]")
    }

    fn read_file(&self, path: &str) -> String {
        self.record(ToolCall::ReadFile(path.to_string()));
        format!("[read_file {path}]")
    }

    fn write_file(&self, path: &str, content: &str) -> String {
        self.record(ToolCall::WriteFile {
            path: path.to_string(),
            content: content.to_string(),
        });
        format!("[write_file {path}]")
    }

    fn list_files(&self, dir: &str) -> String {
        self.record(ToolCall::ListFiles(dir.to_string()));
        format!("[list_files {dir}]")
    }

    fn change_directory(&self, dir: &str) -> (String, PathBuf) {
        self.record(ToolCall::ChangeDirectory(dir.to_string()));
        let next = self.workdir.resolve(dir);
        (format!("Changed directory to {}", next.display()), next)
    }

    fn search_code(&self, query: &str, file_pattern: Option<&str>) -> String {
        self.record(ToolCall::SearchCode {
            query: query.to_string(),
            pattern: file_pattern.map(ToString::to_string),
        });
        format!("[search_code {query}]")
    }

    fn find_functions(&self, name: &str, file_pattern: Option<&str>) -> String {
        self.record(ToolCall::FindFunctions {
            name: name.to_string(),
            pattern: file_pattern.map(ToString::to_string),
        });
        format!("[find_functions {name}]")
    }

    fn find_todos(&self) -> String {
        self.record(ToolCall::FindTodos);
        "[find_todos]".to_string()
    }

    fn find_imports(&self, module: &str) -> String {
        self.record(ToolCall::FindImports(module.to_string()));
        format!("[find_imports {module}]")
    }
}
