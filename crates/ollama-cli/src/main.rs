use anyhow::{Result, anyhow};
use clap::Parser;
use ollama_core::{AppConfig, WorkingDir};
use ollama_observe::Observer;
use std::path::PathBuf;

mod commands;
mod input;

use commands::chat::run_chat;

#[derive(Parser)]
#[command(name = "ollama-agent")]
#[command(about = "Terminal coding assistant backed by a local Ollama server", long_about = None)]
struct Cli {
    /// Ollama model to use [default: gemma2:9b]
    #[arg(short = 'm', long)]
    model: Option<String>,

    /// Ollama server URL [default: http://localhost:11434]
    #[arg(long)]
    url: Option<String>,

    /// Start in this directory instead of the current one
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Log diagnostics to stderr
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let start = match &cli.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let start = std::fs::canonicalize(&start)
        .map_err(|err| anyhow!("cannot use {} as working directory: {err}", start.display()))?;
    if !start.is_dir() {
        return Err(anyhow!("{} is not a directory", start.display()));
    }

    let mut cfg = AppConfig::load(&start)?;
    cfg.apply_overrides(cli.model.as_deref(), cli.url.as_deref());

    let mut observer = Observer::for_user();
    observer.set_verbose(cli.verbose);
    observer.verbose_log(&format!(
        "model={} base_url={} cwd={}",
        cfg.llm.model,
        cfg.llm.base_url,
        start.display()
    ));
    if let Some(path) = observer.log_path() {
        observer.verbose_log(&format!("session log: {}", path.display()));
    }

    run_chat(&cfg, WorkingDir::new(start), observer)
}
