/// The operations a model response can request, one per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Command,
    Read,
    Ls,
    Cd,
    Write,
    WriteContent,
    Search,
    SearchFunc,
    FindTodo,
    FindImport,
}

impl DirectiveKind {
    pub const ALL: [DirectiveKind; 10] = [
        Self::Command,
        Self::Read,
        Self::Ls,
        Self::Cd,
        Self::Write,
        Self::WriteContent,
        Self::Search,
        Self::SearchFunc,
        Self::FindTodo,
        Self::FindImport,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Command => "COMMAND",
            Self::Read => "READ",
            Self::Ls => "LS",
            Self::Cd => "CD",
            Self::Write => "WRITE",
            Self::WriteContent => "WRITE_CONTENT",
            Self::Search => "SEARCH",
            Self::SearchFunc => "SEARCH_FUNC",
            Self::FindTodo => "FIND_TODO",
            Self::FindImport => "FIND_IMPORT",
        }
    }

    /// Whether `KEYWORD:` with nothing after it is still a directive.
    fn allows_bare(self) -> bool {
        matches!(
            self,
            Self::Ls | Self::Search | Self::SearchFunc | Self::FindTodo
        )
    }

    /// Matches this keyword at the start of an already trimmed line and
    /// returns the trimmed argument.
    fn match_line(self, line: &str) -> Option<&str> {
        let rest = line.strip_prefix(self.keyword())?.strip_prefix(':')?;
        if self == Self::FindTodo {
            return Some("");
        }
        if let Some(arg) = rest.strip_prefix(' ') {
            return Some(arg.trim());
        }
        (rest.is_empty() && self.allows_bare()).then_some("")
    }
}

/// Block delimiters that are dropped when they appear on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Content,
    EndContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineToken<'a> {
    Blank,
    Text(&'a str),
    Directive { kind: DirectiveKind, arg: &'a str },
    Marker(Marker),
}

/// Classifies one line of a response outside a `WRITE_CONTENT` block.
pub fn lex_line(raw: &str) -> LineToken<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return LineToken::Blank;
    }
    for kind in DirectiveKind::ALL {
        if let Some(arg) = kind.match_line(line) {
            return LineToken::Directive { kind, arg };
        }
    }
    match line {
        "CONTENT:" => LineToken::Marker(Marker::Content),
        "END_CONTENT" => LineToken::Marker(Marker::EndContent),
        _ => LineToken::Text(line),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    AwaitingContentMarker,
    Collecting,
}

/// Reads a `WRITE_CONTENT` payload starting at `lines[start]`, the line after
/// the directive. Returns the payload lines and the index of the first line
/// after the block.
///
/// Payload lines keep their original indentation. Text following a
/// `CONTENT:` marker on the same line is trimmed and becomes a payload line.
/// Lines seen before the first marker are discarded.
pub fn collect_content_block<'a>(lines: &[&'a str], start: usize) -> (Vec<&'a str>, usize) {
    let mut state = BlockState::AwaitingContentMarker;
    let mut payload = Vec::new();
    let mut cursor = start;
    while cursor < lines.len() {
        let raw = lines[cursor];
        let line = raw.trim();
        cursor += 1;
        if let Some(inline) = line.strip_prefix("CONTENT:") {
            state = BlockState::Collecting;
            let inline = inline.trim();
            if !inline.is_empty() {
                payload.push(inline);
            }
        } else if line.starts_with("END_CONTENT") {
            break;
        } else if state == BlockState::Collecting {
            payload.push(raw);
        }
    }
    (payload, cursor)
}

/// Unwraps text that opens with a code fence: the opening line goes, and so
/// does a trailing line that is exactly a closing fence. Text that does not
/// open with a fence is returned unchanged.
pub fn strip_code_fences(text: &str) -> String {
    if !text.starts_with("```") {
        return text.to_string();
    }
    let mut lines = text.split('\n').skip(1).collect::<Vec<_>>();
    if lines.last().is_some_and(|line| line.trim() == "```") {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(kind: DirectiveKind, arg: &str) -> LineToken<'_> {
        LineToken::Directive { kind, arg }
    }

    #[test]
    fn lexes_each_keyword_with_trimmed_argument() {
        assert_eq!(lex_line("  COMMAND:   ls -la  "), directive(DirectiveKind::Command, "ls -la"));
        assert_eq!(lex_line("READ: src/main.rs"), directive(DirectiveKind::Read, "src/main.rs"));
        assert_eq!(lex_line("LS: src"), directive(DirectiveKind::Ls, "src"));
        assert_eq!(lex_line("CD: .."), directive(DirectiveKind::Cd, ".."));
        assert_eq!(lex_line("WRITE: a.txt"), directive(DirectiveKind::Write, "a.txt"));
        assert_eq!(
            lex_line("WRITE_CONTENT: b.txt"),
            directive(DirectiveKind::WriteContent, "b.txt")
        );
        assert_eq!(
            lex_line("SEARCH: error handling"),
            directive(DirectiveKind::Search, "error handling")
        );
        assert_eq!(
            lex_line("SEARCH_FUNC: connect"),
            directive(DirectiveKind::SearchFunc, "connect")
        );
        assert_eq!(lex_line("FIND_TODO:"), directive(DirectiveKind::FindTodo, ""));
        assert_eq!(
            lex_line("FIND_IMPORT: requests"),
            directive(DirectiveKind::FindImport, "requests")
        );
    }

    #[test]
    fn bare_keywords_only_where_argument_is_optional() {
        assert_eq!(lex_line("LS:"), directive(DirectiveKind::Ls, ""));
        assert_eq!(lex_line("SEARCH:"), directive(DirectiveKind::Search, ""));
        assert_eq!(lex_line("SEARCH_FUNC:"), directive(DirectiveKind::SearchFunc, ""));
        assert_eq!(lex_line("COMMAND:"), LineToken::Text("COMMAND:"));
        assert_eq!(lex_line("READ:"), LineToken::Text("READ:"));
        assert_eq!(lex_line("LS:src"), LineToken::Text("LS:src"));
    }

    #[test]
    fn find_todo_ignores_trailing_text() {
        assert_eq!(lex_line("FIND_TODO: in src"), directive(DirectiveKind::FindTodo, ""));
        assert_eq!(lex_line("FIND_TODO:now"), directive(DirectiveKind::FindTodo, ""));
    }

    #[test]
    fn keywords_are_case_sensitive_and_anchored() {
        assert_eq!(lex_line("command: ls"), LineToken::Text("command: ls"));
        assert_eq!(
            lex_line("Run this: COMMAND: ls"),
            LineToken::Text("Run this: COMMAND: ls")
        );
    }

    #[test]
    fn markers_blanks_and_text() {
        assert_eq!(lex_line("   "), LineToken::Blank);
        assert_eq!(lex_line(" CONTENT: "), LineToken::Marker(Marker::Content));
        assert_eq!(lex_line("END_CONTENT"), LineToken::Marker(Marker::EndContent));
        assert_eq!(lex_line("CONTENT: hi"), LineToken::Text("CONTENT: hi"));
        assert_eq!(lex_line("  Sure thing!  "), LineToken::Text("Sure thing!"));
    }

    #[test]
    fn block_keeps_indentation_and_consumes_end_marker() {
        let lines = ["CONTENT:", "def f():", "    return 1", "", "END_CONTENT", "after"];
        let (payload, next) = collect_content_block(&lines, 0);
        assert_eq!(payload, vec!["def f():", "    return 1", ""]);
        assert_eq!(next, 5);
    }

    #[test]
    fn block_discards_lines_before_marker_and_takes_inline_text() {
        let lines = ["ignored", "  CONTENT:  first  ", "second", "END_CONTENT"];
        let (payload, next) = collect_content_block(&lines, 0);
        assert_eq!(payload, vec!["first", "second"]);
        assert_eq!(next, 4);
    }

    #[test]
    fn block_without_marker_or_end_is_empty_or_runs_to_end() {
        let (payload, next) = collect_content_block(&["END_CONTENT", "tail"], 0);
        assert!(payload.is_empty());
        assert_eq!(next, 1);

        let (payload, next) = collect_content_block(&["CONTENT:", "a", "b"], 0);
        assert_eq!(payload, vec!["a", "b"]);
        assert_eq!(next, 3);
    }

    #[test]
    fn repeated_content_marker_appends_inline_text() {
        let lines = ["CONTENT:", "a", "CONTENT: b", "c", "END_CONTENT"];
        let (payload, _) = collect_content_block(&lines, 0);
        assert_eq!(payload, vec!["a", "b", "c"]);
    }

    #[test]
    fn strips_only_fence_lines() {
        assert_eq!(strip_code_fences("```python\nprint(1)\n```"), "print(1)");
        assert_eq!(strip_code_fences("```python\nprint(1)\n  ```  "), "print(1)");
        assert_eq!(strip_code_fences("print(1)\n  ```  "), "print(1)\n  ```  ");
        assert_eq!(strip_code_fences("```\nprint(1)"), "print(1)");
        assert_eq!(strip_code_fences("print(1)```"), "print(1)```");
        assert_eq!(strip_code_fences("```rust\nfn main() {}```"), "fn main() {}```");
        assert_eq!(strip_code_fences("plain\ntext"), "plain\ntext");
    }

    #[test]
    fn unfenced_markdown_keeps_its_closing_fence() {
        let readme = "# Build\n\n```bash\nmake\n```";
        assert_eq!(strip_code_fences(readme), readme);
    }
}
