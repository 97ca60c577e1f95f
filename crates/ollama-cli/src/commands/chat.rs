use crate::input::{LineInput, ReadOutcome};
use anyhow::Result;
use ollama_agent::{ResponseProcessor, system_prompt};
use ollama_core::{AppConfig, ToolHost, WorkingDir};
use ollama_llm::{ChatBackend, OllamaClient, chat_error_text};
use ollama_observe::{Observer, SessionEvent};
use ollama_tools::LocalToolHost;
use ollama_ui::{HelpSystem, HelpTopic, SlashCommand};
use std::io::{Write, stdout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

struct ChatSession {
    client: OllamaClient,
    processor: ResponseProcessor,
    help: HelpSystem,
    observer: Observer,
}

pub(crate) fn run_chat(cfg: &AppConfig, workdir: WorkingDir, observer: Observer) -> Result<()> {
    let host = LocalToolHost::new(workdir.clone(), &cfg.tools)?;
    let processor = ResponseProcessor::new(Box::new(host), workdir).with_observer(observer.clone());
    let mut session = ChatSession {
        client: OllamaClient::new(&cfg.llm)?,
        processor,
        help: HelpSystem::new(),
        observer,
    };
    let mut input = LineInput::open(&cfg.ui)?;

    session.print_banner();
    loop {
        let line = match input.read_line("💬 ")? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Interrupted | ReadOutcome::Eof => {
                println!("\n👋 Goodbye!");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(cmd) = SlashCommand::parse(line) {
            if session.handle_slash(cmd, &mut input)? == Flow::Exit {
                break;
            }
        } else {
            session.handle_chat(line)?;
        }
    }
    Ok(())
}

impl ChatSession {
    fn host(&self) -> &dyn ToolHost {
        self.processor.host()
    }

    fn print_banner(&self) {
        println!("🤖 Ollama Agent - terminal coding assistant");
        println!("Model: {}", self.client.model());
        println!("Working Directory: {}", self.processor.workdir().get().display());
        println!("Type /help for commands or start chatting!\n");
    }

    fn handle_chat(&mut self, message: &str) -> Result<()> {
        print!("🤔 Thinking...");
        stdout().flush()?;
        let prompt = system_prompt(&self.processor.workdir().get());
        let (reply, failed) = match self.client.try_chat(message, Some(&prompt)) {
            Ok(reply) => {
                self.record_turn(true);
                (reply, false)
            }
            Err(err) => {
                self.record_turn(false);
                self.observer.verbose_log(&format!("chat request failed: {err}"));
                (chat_error_text(&err), true)
            }
        };
        print!("\r{}\r", " ".repeat(15));
        stdout().flush()?;

        let processed = self.processor.process(&reply, &mut self.client);
        println!("🤖 {processed}\n");
        if failed {
            println!("{}\n", self.help.contextual_help(HelpTopic::ModelError));
        }
        Ok(())
    }

    fn record_turn(&self, ok: bool) {
        self.observer.record(&SessionEvent::ChatTurn {
            model: self.client.model().to_string(),
            ok,
        });
    }

    fn handle_slash(&mut self, cmd: SlashCommand, input: &mut LineInput) -> Result<Flow> {
        self.observer.record(&SessionEvent::SlashCommand {
            name: cmd.name().to_string(),
        });
        match cmd {
            SlashCommand::Exit => {
                println!("👋 Goodbye!");
                return Ok(Flow::Exit);
            }
            SlashCommand::Help(topic) => println!("{}", self.help.render(topic.as_deref())),
            SlashCommand::Clear => {
                self.client.clear_conversation();
                println!("🧹 Conversation history cleared");
            }
            SlashCommand::Cls => {
                print!("\x1b[H\x1b[2J\x1b[3J");
                stdout().flush()?;
                self.client.clear_conversation();
                self.print_banner();
            }
            SlashCommand::ClearHistory => match input.clear_history() {
                Ok(()) => println!("🧹 Command history cleared"),
                Err(err) => self
                    .observer
                    .warn_log(&format!("could not clear command history: {err}")),
            },
            SlashCommand::Models => {
                let models = self.client.list_models();
                println!("Available models:");
                for model in models {
                    let marker = if model == self.client.model() {
                        " 👈 (current)"
                    } else {
                        ""
                    };
                    println!("  • {model}{marker}");
                }
            }
            SlashCommand::Model(model) => {
                self.client.set_model(&model);
                self.observer.record(&SessionEvent::ModelSwitched {
                    model: model.clone(),
                });
                println!("🔄 Switched to model: {}", self.client.model());
            }
            SlashCommand::Read(path) => {
                let content = self.host().read_file(&path);
                println!("{content}");
                if content.starts_with("Error reading file") {
                    println!("{}", self.help.contextual_help(HelpTopic::FileNotFound));
                }
            }
            SlashCommand::Write(path) => {
                println!("Enter content for {path} (Ctrl+D to finish):");
                match input.read_to_end() {
                    Ok(content) => println!("{}", self.host().write_file(&path, &content)),
                    Err(err) => println!("❌ Write cancelled: {err}"),
                }
            }
            SlashCommand::Run(command) => {
                println!("🔧 Running: {command}");
                println!("{}", self.host().run_command(&command));
            }
            SlashCommand::Ls(dir) => {
                println!("{}", self.host().list_files(dir.as_deref().unwrap_or(".")));
            }
            SlashCommand::Cd(dir) => {
                let (message, next) = self.host().change_directory(&dir);
                let workdir = self.processor.workdir();
                if next != workdir.get() {
                    self.observer.record(&SessionEvent::DirectoryChanged {
                        path: next.display().to_string(),
                    });
                }
                workdir.set(next);
                println!("{message}");
            }
            SlashCommand::Search(query) => println!("{}", self.host().search_code(&query, None)),
            SlashCommand::FindFunc(name) => {
                println!(
                    "{}",
                    self.host().find_functions(name.as_deref().unwrap_or(""), None)
                );
            }
            SlashCommand::FindTodo => println!("{}", self.host().find_todos()),
            SlashCommand::FindImport(module) => println!("{}", self.host().find_imports(&module)),
            SlashCommand::Unknown { name, .. } => {
                println!("❓ Unknown command: {name}");
                println!("Type /help for available commands");
                println!("{}", self.help.contextual_help(HelpTopic::CommandNotFound));
            }
        }
        Ok(Flow::Continue)
    }
}
