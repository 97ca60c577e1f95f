mod analysis;
mod files;
mod shell;

pub use analysis::{CodeSearcher, FunctionFinder, ImportFinder, SearchHit, TodoFinder};
pub use files::{DirectoryNavigator, FileReader, FileWriter};
pub use shell::{CommandExecutor, PlatformShellRunner, ShellRunResult, ShellRunner};

use anyhow::Result;
use ollama_core::{ToolHost, ToolsConfig, WorkingDir};
use std::path::PathBuf;

/// The local filesystem, shell and code-analysis collaborators, all sharing
/// one working directory handle.
pub struct LocalToolHost {
    workdir: WorkingDir,
    executor: CommandExecutor,
    reader: FileReader,
    writer: FileWriter,
    navigator: DirectoryNavigator,
    searcher: CodeSearcher,
    functions: FunctionFinder,
    todos: TodoFinder,
    imports: ImportFinder,
}

impl LocalToolHost {
    pub fn new(workdir: WorkingDir, cfg: &ToolsConfig) -> Result<Self> {
        let executor = CommandExecutor::new(workdir.clone(), cfg.command_timeout_seconds);
        Self::with_executor(workdir, cfg, executor)
    }

    pub fn with_executor(
        workdir: WorkingDir,
        cfg: &ToolsConfig,
        executor: CommandExecutor,
    ) -> Result<Self> {
        Ok(Self {
            executor,
            reader: FileReader::new(workdir.clone()),
            writer: FileWriter::new(workdir.clone()),
            navigator: DirectoryNavigator::new(workdir.clone()),
            searcher: CodeSearcher::new(
                workdir.clone(),
                cfg.search_patterns.clone(),
                cfg.max_search_results,
            ),
            functions: FunctionFinder::new(
                workdir.clone(),
                cfg.function_pattern.clone(),
                cfg.max_search_results,
            )?,
            todos: TodoFinder::new(workdir.clone())?,
            imports: ImportFinder::new(workdir.clone(), cfg.import_pattern.clone()),
            workdir,
        })
    }

    pub fn workdir(&self) -> &WorkingDir {
        &self.workdir
    }
}

impl ToolHost for LocalToolHost {
    fn run_command(&self, command: &str) -> String {
        self.executor.run_command(command)
    }

    fn read_file(&self, path: &str) -> String {
        self.reader.read_file(path)
    }

    fn write_file(&self, path: &str, content: &str) -> String {
        self.writer.write_file(path, content)
    }

    fn list_files(&self, dir: &str) -> String {
        let dir = if dir.trim().is_empty() { "." } else { dir };
        self.navigator.list_files(dir)
    }

    fn change_directory(&self, dir: &str) -> (String, PathBuf) {
        self.navigator.change_directory(dir)
    }

    fn search_code(&self, query: &str, file_pattern: Option<&str>) -> String {
        self.searcher.search_code(query, file_pattern)
    }

    fn find_functions(&self, name: &str, file_pattern: Option<&str>) -> String {
        self.functions.find_functions(name, file_pattern)
    }

    fn find_todos(&self) -> String {
        self.todos.find_todos()
    }

    fn find_imports(&self, module: &str) -> String {
        self.imports.find_imports(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn collaborators_follow_the_shared_working_directory() {
        let dir = TempDir::new().expect("tempdir");
        let root = fs::canonicalize(dir.path()).expect("canonical");
        fs::create_dir_all(root.join("sub")).expect("sub");
        fs::write(root.join("sub/inner.py"), "def inner():\n    pass\n").expect("write");

        let workdir = WorkingDir::new(&root);
        let host = LocalToolHost::new(workdir.clone(), &ToolsConfig::default()).expect("host");

        let (msg, next) = host.change_directory("sub");
        assert_eq!(msg, format!("Changed directory to {}", root.join("sub").display()));
        workdir.set(next);

        assert_eq!(
            host.list_files(""),
            format!("Contents of {}:\n📄 inner.py", root.join("sub").display())
        );
        assert_eq!(
            host.find_functions("inner", None),
            "Functions/Classes found:\ninner.py:1: def inner():"
        );
        host.write_file("out.txt", "hello");
        assert_eq!(
            fs::read_to_string(root.join("sub/out.txt")).expect("read"),
            "hello"
        );
        assert_eq!(host.workdir().get(), root.join("sub"));
    }
}
