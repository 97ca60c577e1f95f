use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDoc {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub examples: &'static [&'static str],
    pub notes: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Workflow {
    scenario: &'static str,
    description: &'static str,
    /// Slash commands, or free text sent to the model.
    steps: &'static [&'static str],
}

/// Situations that get a short targeted hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    FileNotFound,
    CommandNotFound,
    ModelError,
}

const COMMANDS: &[CommandDoc] = &[
    CommandDoc {
        name: "read",
        description: "Read and display a file's contents",
        usage: "/read <file_path>",
        examples: &["/read main.py", "/read config/settings.json", "/read ../README.md"],
        notes: "Supports relative and absolute paths",
    },
    CommandDoc {
        name: "write",
        description: "Write content to a file (interactive mode)",
        usage: "/write <file_path>",
        examples: &["/write test.py", "/write docs/api.md"],
        notes: "Enter content, then Ctrl+D to finish.",
    },
    CommandDoc {
        name: "ls",
        description: "List files and directories",
        usage: "/ls [directory]",
        examples: &["/ls", "/ls src/", "/ls /home/user/projects"],
        notes: "Defaults to current directory if no path specified",
    },
    CommandDoc {
        name: "cd",
        description: "Change working directory",
        usage: "/cd <directory>",
        examples: &["/cd src", "/cd ..", "/cd /absolute/path"],
        notes: "Updates working directory for all operations",
    },
    CommandDoc {
        name: "search",
        description: "Search for code patterns in files",
        usage: "/search <query>",
        examples: &["/search function main", "/search import requests", "/search TODO"],
        notes: "Case-insensitive text match across common source file types.",
    },
    CommandDoc {
        name: "find-func",
        description: "Find function and class definitions",
        usage: "/find-func [name]",
        examples: &["/find-func", "/find-func main", "/find-func Calculator"],
        notes: "Without name, shows all functions. Primarily for Python files.",
    },
    CommandDoc {
        name: "find-todo",
        description: "Find TODO comments in codebase",
        usage: "/find-todo",
        examples: &["/find-todo"],
        notes: "Matches TODO after #, //, /* or <!-- comment markers",
    },
    CommandDoc {
        name: "find-import",
        description: "Find files that import a specific module",
        usage: "/find-import <module>",
        examples: &["/find-import requests", "/find-import numpy", "/find-import .config"],
        notes: "Finds both direct imports and from-imports",
    },
    CommandDoc {
        name: "run",
        description: "Execute shell commands",
        usage: "/run <command>",
        examples: &["/run ls -la", "/run python test.py", "/run git status"],
        notes: "⚠️  Be careful with destructive commands",
    },
    CommandDoc {
        name: "models",
        description: "List available Ollama models",
        usage: "/models",
        examples: &["/models"],
        notes: "Shows all models with current model marked",
    },
    CommandDoc {
        name: "model",
        description: "Switch to a different model",
        usage: "/model <model_name>",
        examples: &["/model codellama", "/model gemma2:9b", "/model llama3.1"],
        notes: "Model must be available in Ollama. Starts a fresh conversation.",
    },
    CommandDoc {
        name: "clear",
        description: "Clear conversation history",
        usage: "/clear",
        examples: &["/clear"],
        notes: "Keeps command history intact",
    },
    CommandDoc {
        name: "clear-history",
        description: "Clear command input history",
        usage: "/clear-history",
        examples: &["/clear-history"],
        notes: "Clears arrow-key navigation history",
    },
    CommandDoc {
        name: "cls",
        description: "Clear screen and conversation history",
        usage: "/cls",
        examples: &["/cls"],
        notes: "Fresh start - clears both screen and conversation",
    },
    CommandDoc {
        name: "help",
        description: "Show help information",
        usage: "/help [command]",
        examples: &["/help", "/help search", "/help examples", "/help tips"],
        notes: "Without command, shows overview. With command, shows details.",
    },
    CommandDoc {
        name: "exit",
        description: "Exit the program",
        usage: "/exit",
        examples: &["/exit"],
        notes: "Also: Ctrl+C or Ctrl+D",
    },
];

const CATEGORIES: &[(&str, &[&str])] = &[
    ("📁 File Operations", &["read", "write", "ls", "cd"]),
    ("🔍 Code Analysis", &["search", "find-func", "find-todo", "find-import"]),
    ("⚙️ Command Execution", &["run"]),
    ("🤖 AI/Model Management", &["models", "model"]),
    ("🗂️ Session Management", &["clear", "clear-history", "cls"]),
    ("❓ System", &["help", "exit"]),
];

const WORKFLOWS: &[Workflow] = &[
    Workflow {
        scenario: "Exploring A New Codebase",
        description: "Get oriented in an unfamiliar project",
        steps: &["/ls", "/find-func", "/search main", "/find-todo"],
    },
    Workflow {
        scenario: "Code Review Workflow",
        description: "Systematic code review with AI assistance",
        steps: &[
            "/search FIXME",
            "/find-import requests",
            "/read src/main.py",
            "Can you review this code for potential issues?",
        ],
    },
    Workflow {
        scenario: "Debugging Session",
        description: "Investigate and debug issues",
        steps: &[
            "/run python debug.py",
            "/search Error",
            "/find-func handle_error",
            "The error logs show X, what might be causing this?",
        ],
    },
    Workflow {
        scenario: "Documentation Writing",
        description: "Create documentation with AI help",
        steps: &[
            "/find-func public",
            "/read api.py",
            "/write docs/api.md",
            "Generate API documentation for these functions",
        ],
    },
];

const QUICK_TIPS: &[&str] = &[
    "Use arrow keys (↑/↓) to navigate command history",
    "Ctrl+A jumps to beginning of line, Ctrl+E to end",
    "Ctrl+K deletes from cursor to end of line",
    "You can combine slash commands with natural conversation",
    "The AI remembers context from previous messages in the session",
];

const TIP_SECTIONS: &[(&str, &[&str])] = &[
    (
        "⌨️ Keyboard Shortcuts",
        &[
            "↑/↓ arrows: Navigate command history",
            "←/→ arrows: Move cursor within input",
            "Ctrl+A: Jump to beginning of line",
            "Ctrl+E: Jump to end of line",
            "Ctrl+K: Delete from cursor to end",
            "Ctrl+C or Ctrl+D: Exit program",
        ],
    ),
    (
        "📂 File Operations",
        &[
            "File paths can be relative (./file) or absolute (/path/to/file)",
            "Most commands handle missing files gracefully",
        ],
    ),
    (
        "🔍 Search & Analysis",
        &[
            "/search matches text case-insensitively",
            "/find-func without arguments shows all functions",
            "Code analysis works best with Python files",
        ],
    ),
    (
        "🤖 AI Interaction",
        &[
            "Ask questions in natural language",
            "The AI remembers context from the current session",
            "You can reference files by name in conversation",
            "Combine slash commands with conversation for best results",
        ],
    ),
    (
        "⚡ Productivity",
        &[
            "Use /cls for a completely fresh start",
            "Switching models starts a new conversation",
            "/clear only clears conversation, not command history",
            "Commands are case-insensitive",
        ],
    ),
];

/// Static help content for the interactive session.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelpSystem;

impl HelpSystem {
    pub fn new() -> Self {
        Self
    }

    pub fn command(&self, name: &str) -> Option<&'static CommandDoc> {
        let name = name.trim_start_matches('/').to_lowercase();
        COMMANDS.iter().find(|doc| doc.name == name)
    }

    /// Renders `/help [arg]`: the overview, `examples`, `tips` or one command.
    pub fn render(&self, topic: Option<&str>) -> String {
        match topic.map(str::to_lowercase).as_deref() {
            None => self.overview(),
            Some("examples") => self.examples_help(),
            Some("tips") => self.tips_help(),
            Some(name) => self.command_help(name),
        }
    }

    pub fn overview(&self) -> String {
        let mut out = String::from("📖 Ollama Agent - Comprehensive Help\n\n");
        for (category, names) in CATEGORIES {
            let _ = writeln!(out, "{category}:");
            for doc in names.iter().filter_map(|name| self.command(name)) {
                let _ = writeln!(out, "  {:<20} - {}", doc.usage, doc.description);
            }
            out.push('\n');
        }

        out.push_str("💡 Quick Tips:\n");
        for tip in QUICK_TIPS {
            let _ = writeln!(out, "• {tip}");
        }

        out.push_str("\n💬 Natural Conversation:\n");
        out.push_str("• Ask questions: 'What does this function do?'\n");
        out.push_str("• Request actions: 'Create a test file for main.py'\n");
        out.push_str("• Get suggestions: 'How can I optimize this code?'\n");
        out.push_str("• Code generation: 'Write a function that sorts a list'\n\n");

        out.push_str("📚 For detailed command help: /help <command>\n");
        out.push_str("🚀 Quick start examples: /help examples\n");
        out
    }

    pub fn command_help(&self, name: &str) -> String {
        let Some(doc) = self.command(name) else {
            let name = name.trim_start_matches('/').to_lowercase();
            let mut out =
                format!("❓ Unknown command: {name}\nType /help to see all available commands.");
            let related = self.search(&name);
            if !related.is_empty() {
                let related = related
                    .iter()
                    .map(|name| format!("/{name}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = write!(out, "\n💡 Related commands: {related}");
            }
            return out;
        };
        let mut out = format!("📖 Help for /{}\n\n", doc.name);
        let _ = writeln!(out, "Description: {}", doc.description);
        let _ = writeln!(out, "Usage: {}\n", doc.usage);
        if !doc.examples.is_empty() {
            out.push_str("Examples:\n");
            for example in doc.examples {
                let _ = writeln!(out, "  {example}");
            }
            out.push('\n');
        }
        if !doc.notes.is_empty() {
            let _ = writeln!(out, "Notes: {}", doc.notes);
        }
        out
    }

    pub fn examples_help(&self) -> String {
        let mut out = String::from("🚀 Ollama Agent - Usage Examples\n\n");
        for workflow in WORKFLOWS {
            let _ = writeln!(out, "📋 {}:", workflow.scenario);
            let _ = writeln!(out, "{}\n", workflow.description);
            for (idx, step) in workflow.steps.iter().enumerate() {
                if step.starts_with('/') {
                    let _ = writeln!(out, "  {}. {step}", idx + 1);
                } else {
                    let _ = writeln!(out, "  {}. \"{step}\"", idx + 1);
                }
            }
            out.push('\n');
        }
        out
    }

    pub fn tips_help(&self) -> String {
        let mut out = String::from("💡 Ollama Agent - Tips & Tricks\n\n");
        for (section, tips) in TIP_SECTIONS {
            let _ = writeln!(out, "{section}:");
            for tip in *tips {
                let _ = writeln!(out, "  • {tip}");
            }
            out.push('\n');
        }
        out
    }

    pub fn contextual_help(&self, topic: HelpTopic) -> &'static str {
        match topic {
            HelpTopic::FileNotFound => {
                "💡 File not found? Try:\n• /ls to see available files\n• Use absolute paths: /read /full/path/to/file\n• Check spelling and case sensitivity"
            }
            HelpTopic::CommandNotFound => {
                "💡 Command not recognized? Try:\n• /help to see all commands\n• Check command spelling (case insensitive)\n• Use natural language for AI assistance"
            }
            HelpTopic::ModelError => {
                "💡 Model issues? Try:\n• /models to see available models\n• Check if Ollama is running\n• Verify the model name spelling"
            }
        }
    }

    /// Commands whose name, description or examples mention `query`.
    pub fn search(&self, query: &str) -> Vec<&'static str> {
        let query = query.to_lowercase();
        COMMANDS
            .iter()
            .filter(|doc| {
                doc.name.contains(&query)
                    || doc.description.to_lowercase().contains(&query)
                    || doc
                        .examples
                        .iter()
                        .any(|example| example.to_lowercase().contains(&query))
            })
            .map(|doc| doc.name)
            .collect()
    }
}
