use anyhow::Result;
use chrono::Utc;
use ollama_core::user_runtime_dir;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Something worth keeping in the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    ChatTurn { model: String, ok: bool },
    Directive { directive: String, arg: String },
    ModelSwitched { model: String },
    DirectoryChanged { path: String },
    SlashCommand { name: String },
}

#[derive(Debug, Clone, Default)]
pub struct Observer {
    log_path: Option<PathBuf>,
    verbose: bool,
}

impl Observer {
    /// Logs to `observe.log` inside `dir`, creating the directory.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            log_path: Some(dir.join("observe.log")),
            verbose: false,
        })
    }

    /// Logs under `~/.ollama-agent`, or nowhere if that is unavailable.
    pub fn for_user() -> Self {
        user_runtime_dir()
            .and_then(|dir| Self::new(&dir).ok())
            .unwrap_or_default()
    }

    /// An observer that only ever writes to stderr.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn record_event(&self, event: &SessionEvent) -> Result<()> {
        self.append_log_line(&format!(
            "{} EVENT {}",
            Utc::now().to_rfc3339(),
            serde_json::to_string(event)?
        ))
    }

    /// Like [`Observer::record_event`], reporting failures as a verbose note.
    pub fn record(&self, event: &SessionEvent) {
        if let Err(err) = self.record_event(event) {
            self.verbose_log(&format!("could not write session log: {err}"));
        }
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Log a message to stderr with `[ollama-agent]` prefix when verbose mode is on.
    pub fn verbose_log(&self, msg: &str) {
        if self.verbose {
            eprintln!("[ollama-agent] {msg}");
        }
    }

    /// Log a warning to stderr and the log file.
    pub fn warn_log(&self, msg: &str) {
        eprintln!("[ollama-agent WARN] {msg}");
        let _ = self.append_log_line(&format!("{} WARN {msg}", Utc::now().to_rfc3339()));
    }

    fn append_log_line(&self, line: &str) -> Result<()> {
        let Some(path) = &self.log_path else {
            return Ok(());
        };
        let mut f = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}
