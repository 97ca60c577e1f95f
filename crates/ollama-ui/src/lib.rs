mod help;

pub use help::{CommandDoc, HelpSystem, HelpTopic};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Read(String),
    Write(String),
    Run(String),
    Ls(Option<String>),
    Cd(String),
    Search(String),
    FindFunc(Option<String>),
    FindTodo,
    FindImport(String),
    Models,
    Model(String),
    Clear,
    Cls,
    ClearHistory,
    Help(Option<String>),
    Exit,
    /// An unrecognized name, or a known command missing its required argument.
    Unknown { name: String, args: Vec<String> },
}

impl SlashCommand {
    /// Parses a `/name args...` line. Arguments follow shell quoting rules;
    /// the name is case-insensitive.
    pub fn parse(input: &str) -> Option<Self> {
        let line = input.trim();
        let rest = line.strip_prefix('/')?;
        let parts = shell_words::split(rest)
            .unwrap_or_else(|_| rest.split_whitespace().map(ToString::to_string).collect());
        let mut parts = parts.into_iter();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let args = parts.collect::<Vec<_>>();
        let first = args.first().cloned();

        let cmd = match (name.as_str(), first) {
            ("read", Some(path)) => Self::Read(path),
            ("write", Some(path)) => Self::Write(path),
            ("run", Some(_)) => Self::Run(args.join(" ")),
            ("ls", dir) => Self::Ls(dir),
            ("cd", Some(dir)) => Self::Cd(dir),
            ("search", Some(_)) => Self::Search(args.join(" ")),
            ("find-func", name) => Self::FindFunc(name),
            ("find-todo", _) => Self::FindTodo,
            ("find-import", Some(module)) => Self::FindImport(module),
            ("models", _) => Self::Models,
            ("model", Some(model)) => Self::Model(model),
            ("clear", _) => Self::Clear,
            ("cls", _) => Self::Cls,
            ("clear-history", _) => Self::ClearHistory,
            ("help", topic) => Self::Help(topic),
            ("exit", _) => Self::Exit,
            _ => Self::Unknown {
                name: name.clone(),
                args,
            },
        };
        Some(cmd)
    }

    /// Lowercase command name without the slash.
    pub fn name(&self) -> &str {
        match self {
            Self::Read(_) => "read",
            Self::Write(_) => "write",
            Self::Run(_) => "run",
            Self::Ls(_) => "ls",
            Self::Cd(_) => "cd",
            Self::Search(_) => "search",
            Self::FindFunc(_) => "find-func",
            Self::FindTodo => "find-todo",
            Self::FindImport(_) => "find-import",
            Self::Models => "models",
            Self::Model(_) => "model",
            Self::Clear => "clear",
            Self::Cls => "cls",
            Self::ClearHistory => "clear-history",
            Self::Help(_) => "help",
            Self::Exit => "exit",
            Self::Unknown { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slash_commands() {
        assert_eq!(SlashCommand::parse("/exit"), Some(SlashCommand::Exit));
        assert_eq!(SlashCommand::parse("  /HELP  "), Some(SlashCommand::Help(None)));
        assert_eq!(
            SlashCommand::parse("/help find-func"),
            Some(SlashCommand::Help(Some("find-func".to_string())))
        );
        assert_eq!(
            SlashCommand::parse("/read \"my notes.txt\""),
            Some(SlashCommand::Read("my notes.txt".to_string()))
        );
        assert_eq!(SlashCommand::parse("/ls"), Some(SlashCommand::Ls(None)));
        assert_eq!(SlashCommand::parse("/find-func"), Some(SlashCommand::FindFunc(None)));
        assert_eq!(SlashCommand::parse("hello"), None);
    }

    #[test]
    fn joins_arguments_for_run_and_search() {
        assert_eq!(
            SlashCommand::parse("/run ls   -la"),
            Some(SlashCommand::Run("ls -la".to_string()))
        );
        assert_eq!(
            SlashCommand::parse("/search 'fn main' now"),
            Some(SlashCommand::Search("fn main now".to_string()))
        );
    }

    #[test]
    fn missing_arguments_are_unknown() {
        assert_eq!(
            SlashCommand::parse("/read"),
            Some(SlashCommand::Unknown {
                name: "read".to_string(),
                args: vec![],
            })
        );
        assert_eq!(
            SlashCommand::parse("/model"),
            Some(SlashCommand::Unknown {
                name: "model".to_string(),
                args: vec![],
            })
        );
        let unknown = SlashCommand::parse("/frobnicate now").expect("parsed");
        assert_eq!(unknown.name(), "frobnicate");
        assert_eq!(
            SlashCommand::parse("/"),
            Some(SlashCommand::Unknown {
                name: String::new(),
                args: vec![],
            })
        );
    }

    #[test]
    fn unbalanced_quotes_fall_back_to_whitespace_split() {
        assert_eq!(
            SlashCommand::parse("/cd \"src"),
            Some(SlashCommand::Cd("\"src".to_string()))
        );
    }
}
