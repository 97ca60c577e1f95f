use anyhow::Result;
use ollama_core::UiConfig;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{Config, Editor};
use std::fs;
use std::io::{self, BufRead, IsTerminal, Read, StdinLock, Write};
use std::path::PathBuf;

pub(crate) enum ReadOutcome {
    Line(String),
    Interrupted,
    Eof,
}

/// Where session input comes from: a line editor with persistent history on
/// a terminal, plain stdin otherwise.
pub(crate) enum LineInput {
    Editor {
        editor: Box<Editor<(), FileHistory>>,
        history: Option<PathBuf>,
    },
    Piped(StdinLock<'static>),
}

impl LineInput {
    pub(crate) fn open(ui: &UiConfig) -> Result<Self> {
        if !(io::stdin().is_terminal() && io::stdout().is_terminal()) {
            return Ok(Self::Piped(io::stdin().lock()));
        }
        let config = Config::builder()
            .max_history_size(ui.history_limit)?
            .history_ignore_space(true)
            .build();
        let mut editor: Editor<(), FileHistory> = Editor::with_config(config)?;
        let history = ui.history_path();
        if let Some(path) = &history {
            let _ = editor.load_history(path);
        }
        Ok(Self::Editor {
            editor: Box::new(editor),
            history,
        })
    }

    pub(crate) fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self {
            Self::Editor { editor, history } => match editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                        if let Some(path) = history.as_ref() {
                            let _ = editor.save_history(path);
                        }
                    }
                    Ok(ReadOutcome::Line(line))
                }
                Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
                Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
                Err(err) => Err(err.into()),
            },
            Self::Piped(stdin) => {
                print!("{prompt}");
                io::stdout().flush()?;
                let mut line = String::new();
                if stdin.read_line(&mut line)? == 0 {
                    return Ok(ReadOutcome::Eof);
                }
                Ok(ReadOutcome::Line(line))
            }
        }
    }

    /// Reads everything left on stdin, for `/write`.
    pub(crate) fn read_to_end(&mut self) -> io::Result<String> {
        let mut content = String::new();
        match self {
            Self::Editor { .. } => {
                io::stdin().read_to_string(&mut content)?;
            }
            Self::Piped(stdin) => {
                stdin.read_to_string(&mut content)?;
            }
        }
        Ok(content)
    }

    /// Forgets the line-editing history, including the file on disk.
    pub(crate) fn clear_history(&mut self) -> Result<()> {
        if let Self::Editor { editor, history } = self {
            editor.clear_history()?;
            if let Some(path) = history.as_ref()
                && path.exists()
            {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}
