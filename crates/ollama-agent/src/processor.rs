use crate::directive::{
    DirectiveKind, LineToken, collect_content_block, lex_line, strip_code_fences,
};
use ollama_core::{ToolHost, WorkingDir};
use ollama_llm::{ChatBackend, chat_error_text};
use ollama_observe::{Observer, SessionEvent};

pub const NO_CONTENT_SENTINEL: &str = "❌ No content found for WRITE_CONTENT";

type ProgressSink = Box<dyn Fn(&str)>;

/// Executes the directives found in a model response and collects their
/// output together with the response's plain text.
pub struct ResponseProcessor {
    host: Box<dyn ToolHost>,
    workdir: WorkingDir,
    progress: ProgressSink,
    observer: Observer,
}

impl ResponseProcessor {
    /// `workdir` must be the handle the host's collaborators were built with.
    pub fn new(host: Box<dyn ToolHost>, workdir: WorkingDir) -> Self {
        Self {
            host,
            workdir,
            progress: Box::new(|notice| println!("{notice}")),
            observer: Observer::disabled(),
        }
    }

    /// Replaces the default stdout printer for progress notices.
    pub fn with_progress(mut self, progress: impl Fn(&str) + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }

    pub fn host(&self) -> &dyn ToolHost {
        self.host.as_ref()
    }

    pub fn workdir(&self) -> &WorkingDir {
        &self.workdir
    }

    /// Runs every directive in `response` in order and returns the output
    /// elements joined with newlines. `chat` is only used by `WRITE:`.
    pub fn process(&self, response: &str, chat: &mut dyn ChatBackend) -> String {
        if response.contains("WRITE_CONTENT:") {
            self.observer
                .verbose_log(&format!("response with WRITE_CONTENT block: {response:?}"));
        }

        let lines = response.split('\n').collect::<Vec<_>>();
        let mut output = Vec::new();
        let mut cursor = 0;
        while cursor < lines.len() {
            let token = lex_line(lines[cursor]);
            cursor += 1;
            match token {
                LineToken::Blank | LineToken::Marker(_) => {}
                LineToken::Text(text) => output.push(text.to_string()),
                LineToken::Directive { kind, arg } => {
                    self.record_directive(kind, arg);
                    output.push(self.dispatch(kind, arg, &lines, &mut cursor, chat));
                }
            }
        }
        output.join("\n")
    }

    /// `cursor` points at the line after the directive; block directives
    /// advance it past the lines they consume.
    fn dispatch(
        &self,
        kind: DirectiveKind,
        arg: &str,
        lines: &[&str],
        cursor: &mut usize,
        chat: &mut dyn ChatBackend,
    ) -> String {
        match kind {
            DirectiveKind::Command => {
                self.notify(&format!("🔧 Executing: {arg}"));
                format!("Command output:\n{}", self.host.run_command(arg))
            }
            DirectiveKind::Read => {
                self.notify(&format!("📖 Reading: {arg}"));
                self.host.read_file(arg)
            }
            DirectiveKind::Ls => {
                let dir = if arg.is_empty() { "." } else { arg };
                self.notify(&format!("📁 Listing: {dir}"));
                self.host.list_files(dir)
            }
            DirectiveKind::Cd => {
                self.notify(&format!("📂 Changing to: {arg}"));
                let (message, next) = self.host.change_directory(arg);
                if next != self.workdir.get() {
                    self.observer.record(&SessionEvent::DirectoryChanged {
                        path: next.display().to_string(),
                    });
                }
                self.workdir.set(next);
                message
            }
            DirectiveKind::Write => self.generate_and_write(arg, chat),
            DirectiveKind::Search => {
                self.notify(&format!("🔍 Searching for: {arg}"));
                self.host.search_code(arg, None)
            }
            DirectiveKind::SearchFunc => {
                self.notify(&format!("🔍 Finding functions: {arg}"));
                self.host.find_functions(arg, None)
            }
            DirectiveKind::FindTodo => {
                self.notify("🔍 Finding TODO comments");
                self.host.find_todos()
            }
            DirectiveKind::FindImport => {
                self.notify(&format!("🔍 Finding imports of: {arg}"));
                self.host.find_imports(arg)
            }
            DirectiveKind::WriteContent => {
                self.notify(&format!("✏️ Writing to {arg}"));
                let (payload, next) = collect_content_block(lines, *cursor);
                *cursor = next;
                if payload.is_empty() {
                    NO_CONTENT_SENTINEL.to_string()
                } else {
                    self.host.write_file(arg, &payload.join("\n"))
                }
            }
        }
    }

    fn generate_and_write(&self, path: &str, chat: &mut dyn ChatBackend) -> String {
        self.notify(&format!("✏️ Generating content for {path}"));
        let prompt = format!(
            "Generate the content for the file {path}. Only output the file content, nothing else."
        );
        match chat.try_chat(&prompt, None) {
            Ok(generated) => {
                self.notify(&format!("✏️ Writing to {path}"));
                self.host.write_file(path, &strip_code_fences(&generated))
            }
            Err(err) => {
                self.observer
                    .verbose_log(&format!("content generation for {path} failed: {err}"));
                chat_error_text(&err)
            }
        }
    }

    fn notify(&self, notice: &str) {
        (self.progress)(notice);
    }

    fn record_directive(&self, kind: DirectiveKind, arg: &str) {
        self.observer.record(&SessionEvent::Directive {
            directive: kind.keyword().to_string(),
            arg: arg.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ollama_testkit::{RecordingToolHost, ScriptedChatBackend, ToolCall};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Harness {
        processor: ResponseProcessor,
        host: RecordingToolHost,
        notices: Rc<RefCell<Vec<String>>>,
    }

    fn harness() -> Harness {
        let workdir = WorkingDir::new("/work");
        let host = RecordingToolHost::new(workdir.clone());
        let notices = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&notices);
        let processor = ResponseProcessor::new(Box::new(host.clone()), workdir)
            .with_progress(move |notice| sink.borrow_mut().push(notice.to_string()));
        Harness {
            processor,
            host,
            notices,
        }
    }

    #[test]
    fn each_directive_dispatches_once_with_trimmed_argument() {
        let h = harness();
        let mut chat = ScriptedChatBackend::new();
        let out = h.processor.process(
            "COMMAND:   ls -la  \nREAD: a.py\nSEARCH: needle\nSEARCH_FUNC: main\nFIND_TODO:\nFIND_IMPORT: os",
            &mut chat,
        );
        assert_eq!(
            h.host.calls(),
            vec![
                ToolCall::RunCommand("ls -la".to_string()),
                ToolCall::ReadFile("a.py".to_string()),
                ToolCall::SearchCode {
                    query: "needle".to_string(),
                    pattern: None,
                },
                ToolCall::FindFunctions {
                    name: "main".to_string(),
                    pattern: None,
                },
                ToolCall::FindTodos,
                ToolCall::FindImports("os".to_string()),
            ]
        );
        assert_eq!(
            out,
            "Command output:\n[run_command ls -la]\n[read_file a.py]\n[search_code needle]\n[find_functions main]\n[find_todos]\n[find_imports os]"
        );
        assert!(chat.prompts().is_empty());
    }

    #[test]
    fn write_content_block_is_written_verbatim() {
        let h = harness();
        let mut chat = ScriptedChatBackend::new();
        let out = h.processor.process(
            "Creating it now.\nWRITE_CONTENT: f.txt\nCONTENT:\nline1\n    line2\nEND_CONTENT\nDone.",
            &mut chat,
        );
        assert_eq!(
            h.host.calls(),
            vec![ToolCall::WriteFile {
                path: "f.txt".to_string(),
                content: "line1\n    line2".to_string(),
            }]
        );
        assert_eq!(out, "Creating it now.\n[write_file f.txt]\nDone.");
        assert_eq!(*h.notices.borrow(), vec!["✏️ Writing to f.txt".to_string()]);
    }

    #[test]
    fn write_content_without_marker_emits_sentinel() {
        let h = harness();
        let mut chat = ScriptedChatBackend::new();
        let out = h
            .processor
            .process("WRITE_CONTENT: f.txt\nnot content\nEND_CONTENT\nREAD: x", &mut chat);
        assert_eq!(out, format!("{NO_CONTENT_SENTINEL}\n[read_file x]"));
        assert_eq!(h.host.calls(), vec![ToolCall::ReadFile("x".to_string())]);
    }

    #[test]
    fn write_content_runs_to_end_of_input() {
        let h = harness();
        let mut chat = ScriptedChatBackend::new();
        h.processor
            .process("WRITE_CONTENT: f.txt\nCONTENT: first\n\nlast", &mut chat);
        assert_eq!(
            h.host.calls(),
            vec![ToolCall::WriteFile {
                path: "f.txt".to_string(),
                content: "first\n\nlast".to_string(),
            }]
        );
    }

    #[test]
    fn output_preserves_order_and_drops_blanks_and_markers() {
        let h = harness();
        let mut chat = ScriptedChatBackend::new();
        let out = h.processor.process(
            "  Here you go:  \n\n   \nLS: src\nCONTENT:\nEND_CONTENT\nAll set.\n",
            &mut chat,
        );
        assert_eq!(out, "Here you go:\n[list_files src]\nAll set.");
        assert!(!out.split('\n').any(str::is_empty));
    }

    #[test]
    fn bare_ls_lists_current_directory() {
        let h = harness();
        let mut chat = ScriptedChatBackend::new();
        h.processor.process("LS:", &mut chat);
        assert_eq!(h.host.calls(), vec![ToolCall::ListFiles(".".to_string())]);
        assert_eq!(*h.notices.borrow(), vec!["📁 Listing: .".to_string()]);
    }

    #[test]
    fn cd_updates_shared_directory_before_next_line() {
        let h = harness();
        let mut chat = ScriptedChatBackend::new();
        let out = h.processor.process("CD: sub\nREAD: a.txt", &mut chat);
        assert_eq!(h.processor.workdir().get(), std::path::PathBuf::from("/work/sub"));
        assert_eq!(
            h.host.observed_dirs(),
            vec!["/work".to_string(), "/work/sub".to_string()]
        );
        assert!(out.starts_with("Changed directory to /work/sub\n"));
    }

    #[test]
    fn write_generates_content_through_chat() {
        let h = harness();
        let mut chat = ScriptedChatBackend::new().reply("```python\nprint('hi')\n```");
        let out = h.processor.process("WRITE: hello.py", &mut chat);
        assert_eq!(
            chat.prompts(),
            vec![(
                "Generate the content for the file hello.py. Only output the file content, nothing else."
                    .to_string(),
                None
            )]
        );
        assert_eq!(
            h.host.calls(),
            vec![ToolCall::WriteFile {
                path: "hello.py".to_string(),
                content: "print('hi')".to_string(),
            }]
        );
        assert_eq!(out, "[write_file hello.py]");
        assert_eq!(
            *h.notices.borrow(),
            vec![
                "✏️ Generating content for hello.py".to_string(),
                "✏️ Writing to hello.py".to_string(),
            ]
        );
        assert_eq!(chat.transcript().len(), 2);
    }

    #[test]
    fn write_skips_writer_when_chat_fails() {
        let h = harness();
        let mut chat = ScriptedChatBackend::new().fail("connection refused");
        let out = h.processor.process("WRITE: hello.py", &mut chat);
        assert!(h.host.calls().is_empty());
        assert_eq!(
            out,
            "Error communicating with Ollama: HTTP 500: connection refused"
        );
    }

    #[test]
    fn progress_notices_use_fixed_wording() {
        let h = harness();
        let mut chat = ScriptedChatBackend::new();
        h.processor.process(
            "COMMAND: pwd\nREAD: a\nCD: b\nSEARCH: q\nSEARCH_FUNC: f\nFIND_TODO:\nFIND_IMPORT: m",
            &mut chat,
        );
        assert_eq!(
            *h.notices.borrow(),
            vec![
                "🔧 Executing: pwd",
                "📖 Reading: a",
                "📂 Changing to: b",
                "🔍 Searching for: q",
                "🔍 Finding functions: f",
                "🔍 Finding TODO comments",
                "🔍 Finding imports of: m",
            ]
        );
    }

    #[test]
    fn lowercase_keywords_are_plain_text() {
        let h = harness();
        let mut chat = ScriptedChatBackend::new();
        let out = h.processor.process("command: rm -rf /", &mut chat);
        assert_eq!(out, "command: rm -rf /");
        assert!(h.host.calls().is_empty());
    }
}
