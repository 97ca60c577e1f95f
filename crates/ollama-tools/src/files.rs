use ollama_core::WorkingDir;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub struct FileReader {
    workdir: WorkingDir,
}

impl FileReader {
    pub fn new(workdir: WorkingDir) -> Self {
        Self { workdir }
    }

    pub fn read_file(&self, file_path: &str) -> String {
        let path = self.workdir.resolve(file_path);
        match fs::read_to_string(&path) {
            Ok(content) => format!("File: {}\n```\n{content}\n```", path.display()),
            Err(err) => format!("Error reading file {file_path}: {err}"),
        }
    }
}

pub struct FileWriter {
    workdir: WorkingDir,
}

impl FileWriter {
    pub fn new(workdir: WorkingDir) -> Self {
        Self { workdir }
    }

    /// Writes `content` verbatim, creating missing parent directories.
    pub fn write_file(&self, file_path: &str, content: &str) -> String {
        let path = self.workdir.resolve(file_path);
        match write_with_parents(&path, content) {
            Ok(()) => format!("Successfully wrote to {}", path.display()),
            Err(err) => format!("Error writing to file {file_path}: {err}"),
        }
    }
}

fn write_with_parents(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

pub struct DirectoryNavigator {
    workdir: WorkingDir,
}

impl DirectoryNavigator {
    pub fn new(workdir: WorkingDir) -> Self {
        Self { workdir }
    }

    pub fn list_files(&self, directory: &str) -> String {
        let path = self.workdir.resolve(directory);
        if !path.exists() {
            return format!("Directory {} does not exist", path.display());
        }
        if !path.is_dir() {
            return format!("{} is not a directory", path.display());
        }
        match listing_lines(&path) {
            Ok(lines) => format!("Contents of {}:\n{}", path.display(), lines.join("\n")),
            Err(err) => format!("Error listing directory: {err}"),
        }
    }

    /// Validates `directory` and returns the message plus the directory that
    /// should become current. The shared handle itself is not touched.
    pub fn change_directory(&self, directory: &str) -> (String, PathBuf) {
        let current = self.workdir.get();
        let path = self.workdir.resolve(directory);
        if !path.exists() {
            let shown = normalize_lexically(&path);
            return (format!("Directory {} does not exist", shown.display()), current);
        }
        if !path.is_dir() {
            let shown = normalize_lexically(&path);
            return (format!("{} is not a directory", shown.display()), current);
        }
        match fs::canonicalize(&path) {
            Ok(resolved) => (
                format!("Changed directory to {}", resolved.display()),
                resolved,
            ),
            Err(err) => (format!("Error changing directory: {err}"), current),
        }
    }
}

/// Folds `..` into the preceding component without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}

fn listing_lines(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect::<Vec<_>>();
    entries.sort();
    Ok(entries
        .iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy();
            if path.is_file() {
                Some(format!("📄 {name}"))
            } else if path.is_dir() {
                Some(format!("📁 {name}/"))
            } else {
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch() -> (TempDir, WorkingDir) {
        let dir = TempDir::new().expect("tempdir");
        let workdir = WorkingDir::new(fs::canonicalize(dir.path()).expect("canonical"));
        (dir, workdir)
    }

    #[test]
    fn reads_relative_file_with_header() {
        let (_dir, workdir) = scratch();
        fs::write(workdir.get().join("notes.txt"), "alpha\nbeta").expect("write");
        let out = FileReader::new(workdir.clone()).read_file("./notes.txt");
        assert_eq!(
            out,
            format!(
                "File: {}\n```\nalpha\nbeta\n```",
                workdir.get().join("notes.txt").display()
            )
        );
    }

    #[test]
    fn read_failure_names_the_path_as_given() {
        let (_dir, workdir) = scratch();
        let out = FileReader::new(workdir).read_file("missing.txt");
        assert!(out.starts_with("Error reading file missing.txt: "), "{out}");
    }

    #[test]
    fn writer_creates_parent_directories() {
        let (_dir, workdir) = scratch();
        let out = FileWriter::new(workdir.clone()).write_file("src/deep/lib.rs", "fn main() {}\n");
        let target = workdir.get().join("src/deep/lib.rs");
        assert_eq!(out, format!("Successfully wrote to {}", target.display()));
        assert_eq!(fs::read_to_string(target).expect("read"), "fn main() {}\n");
    }

    #[test]
    fn writer_reports_failure() {
        let (_dir, workdir) = scratch();
        fs::write(workdir.get().join("blocker"), "").expect("file");
        let out = FileWriter::new(workdir).write_file("blocker/child.txt", "x");
        assert!(out.starts_with("Error writing to file blocker/child.txt: "), "{out}");
    }

    #[test]
    fn lists_sorted_entries_with_icons() {
        let (_dir, workdir) = scratch();
        let root = workdir.get();
        fs::write(root.join("b.txt"), "").expect("file");
        fs::write(root.join("a.txt"), "").expect("file");
        fs::create_dir(root.join("src")).expect("dir");
        let out = DirectoryNavigator::new(workdir).list_files(".");
        assert_eq!(
            out,
            format!("Contents of {}:\n📄 a.txt\n📄 b.txt\n📁 src/", root.display())
        );
    }

    #[test]
    fn list_reports_missing_and_non_directory() {
        let (_dir, workdir) = scratch();
        let root = workdir.get();
        fs::write(root.join("file.txt"), "").expect("file");
        let nav = DirectoryNavigator::new(workdir);
        assert_eq!(
            nav.list_files("nope"),
            format!("Directory {} does not exist", root.join("nope").display())
        );
        assert_eq!(
            nav.list_files("file.txt"),
            format!("{} is not a directory", root.join("file.txt").display())
        );
    }

    #[test]
    fn change_directory_resolves_without_mutating_handle() {
        let (_dir, workdir) = scratch();
        let root = workdir.get();
        fs::create_dir_all(root.join("pkg/sub")).expect("dirs");
        let nav = DirectoryNavigator::new(workdir.clone());

        let (msg, next) = nav.change_directory("pkg/sub/..");
        assert_eq!(next, root.join("pkg"));
        assert_eq!(msg, format!("Changed directory to {}", root.join("pkg").display()));
        assert_eq!(workdir.get(), root);

        let (msg, next) = nav.change_directory("absent");
        assert_eq!(next, root);
        assert!(msg.starts_with("Directory ") && msg.ends_with(" does not exist"));
    }

    #[test]
    fn failed_change_directory_reports_normalized_path() {
        let (_dir, workdir) = scratch();
        let root = workdir.get();
        fs::create_dir_all(root.join("a")).expect("dir a");
        fs::write(root.join("notes.txt"), "x").expect("notes");
        let nav = DirectoryNavigator::new(workdir);

        let (msg, next) = nav.change_directory("a/../nope");
        assert_eq!(msg, format!("Directory {} does not exist", root.join("nope").display()));
        assert_eq!(next, root);

        let (msg, _) = nav.change_directory("a/../notes.txt");
        assert_eq!(msg, format!("{} is not a directory", root.join("notes.txt").display()));
    }
}
