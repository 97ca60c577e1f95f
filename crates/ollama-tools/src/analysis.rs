use anyhow::{Result, anyhow};
use glob::MatchOptions;
use ollama_core::WorkingDir;
use regex::{Regex, RegexBuilder};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One matching line, rendered as `path:line: text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub path: String,
    pub line: usize,
    pub text: String,
}

impl SearchHit {
    pub fn render(&self) -> String {
        format!("{}:{}: {}", self.path, self.line, self.text)
    }
}

fn render_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(SearchHit::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Files under `root` matching `pattern`, depth-first with entries sorted by
/// file name. A pattern without `/` is matched against the file name; one
/// with `/` against the path relative to `root`, at any depth. Unreadable
/// entries are skipped.
fn matching_files(root: &Path, pattern: &str, skip_hidden: bool) -> Result<Vec<PathBuf>> {
    let nested = pattern.contains('/');
    let source = if nested && !pattern.starts_with("**/") {
        format!("**/{pattern}")
    } else {
        pattern.to_string()
    };
    let compiled = glob::Pattern::new(&source)
        .map_err(|err| anyhow!("invalid glob pattern '{pattern}': {err}"))?;
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(skip_hidden && entry.depth() > 0 && is_hidden(entry.file_name()))
        });

    let mut files = Vec::new();
    for entry in walker {
        let Ok(entry) = entry else {
            continue;
        };
        if !entry.path().is_file() {
            continue;
        }
        let matched = if nested {
            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };
            compiled.matches_with(&normalize_rel_path(rel), options)
        } else {
            compiled.matches(&entry.file_name().to_string_lossy())
        };
        if matched {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn normalize_rel_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Scans every line of `files`, collecting hits accepted by `is_match` until
/// `limit` hits are held. Files that are not UTF-8 text are skipped.
fn scan_lines(
    root: &Path,
    files: &[PathBuf],
    limit: Option<usize>,
    hits: &mut Vec<SearchHit>,
    mut is_match: impl FnMut(&str) -> bool,
) {
    for path in files {
        if limit.is_some_and(|limit| hits.len() >= limit) {
            return;
        }
        let Ok(content) = fs::read_to_string(path) else {
            continue;
        };
        let rel = path
            .strip_prefix(root)
            .map(normalize_rel_path)
            .unwrap_or_else(|_| normalize_rel_path(path));
        for (idx, line) in content.split('\n').enumerate() {
            if !is_match(line) {
                continue;
            }
            hits.push(SearchHit {
                path: rel.clone(),
                line: idx + 1,
                text: line.trim().to_string(),
            });
            if limit.is_some_and(|limit| hits.len() >= limit) {
                return;
            }
        }
    }
}

/// Case-insensitive substring search over source files.
pub struct CodeSearcher {
    workdir: WorkingDir,
    default_patterns: Vec<String>,
    max_results: usize,
}

impl CodeSearcher {
    pub fn new(workdir: WorkingDir, default_patterns: Vec<String>, max_results: usize) -> Self {
        Self {
            workdir,
            default_patterns,
            max_results,
        }
    }

    /// `file_pattern` of `None` or `*` searches the default source patterns,
    /// one after another.
    pub fn search_code(&self, query: &str, file_pattern: Option<&str>) -> String {
        if query.trim().is_empty() {
            return "Error: Search query cannot be empty".to_string();
        }
        match self.collect(query, file_pattern) {
            Ok(hits) if hits.is_empty() => format!("No results found for '{query}'"),
            Ok(hits) => format!("Search results for '{query}':\n{}", render_hits(&hits)),
            Err(err) => format!("Error searching code: {err}"),
        }
    }

    fn collect(&self, query: &str, file_pattern: Option<&str>) -> Result<Vec<SearchHit>> {
        let root = self.workdir.get();
        let patterns = match file_pattern {
            Some(pattern) if pattern != "*" => vec![pattern.to_string()],
            _ => self.default_patterns.clone(),
        };
        let needle = query.to_lowercase();
        let mut hits = Vec::new();
        for pattern in &patterns {
            let files = matching_files(&root, pattern, false)?;
            scan_lines(&root, &files, Some(self.max_results), &mut hits, |line| {
                line.to_lowercase().contains(&needle)
            });
        }
        Ok(hits)
    }
}

/// Lists `def` and `class` definitions.
pub struct FunctionFinder {
    workdir: WorkingDir,
    default_pattern: String,
    max_results: usize,
    definition: Regex,
}

impl FunctionFinder {
    pub fn new(workdir: WorkingDir, default_pattern: String, max_results: usize) -> Result<Self> {
        Ok(Self {
            workdir,
            default_pattern,
            max_results,
            definition: Regex::new(r"^\s*(?:def|class)\s+\w+")?,
        })
    }

    /// An empty `name` lists every definition; otherwise the line must contain
    /// `name`, ignoring case.
    pub fn find_functions(&self, name: &str, file_pattern: Option<&str>) -> String {
        match self.collect(name, file_pattern) {
            Ok(hits) if hits.is_empty() => "No functions/classes found".to_string(),
            Ok(hits) => format!("Functions/Classes found:\n{}", render_hits(&hits)),
            Err(err) => format!("Error finding functions: {err}"),
        }
    }

    fn collect(&self, name: &str, file_pattern: Option<&str>) -> Result<Vec<SearchHit>> {
        let root = self.workdir.get();
        let pattern = file_pattern.unwrap_or(&self.default_pattern);
        let files = matching_files(&root, pattern, false)?;
        let needle = name.to_lowercase();
        let mut hits = Vec::new();
        scan_lines(&root, &files, Some(self.max_results), &mut hits, |line| {
            self.definition.is_match(line)
                && (needle.is_empty() || line.to_lowercase().contains(&needle))
        });
        Ok(hits)
    }
}

pub struct TodoFinder {
    workdir: WorkingDir,
    marker: Regex,
}

impl TodoFinder {
    pub fn new(workdir: WorkingDir) -> Result<Self> {
        let marker = RegexBuilder::new(r"#\s*TODO|//\s*TODO|/\*\s*TODO|<!--\s*TODO")
            .case_insensitive(true)
            .build()?;
        Ok(Self { workdir, marker })
    }

    /// Every TODO comment in non-hidden files, uncapped. Hidden directories
    /// are not entered.
    pub fn find_todos(&self) -> String {
        match self.collect() {
            Ok(hits) if hits.is_empty() => "No TODO comments found".to_string(),
            Ok(hits) => format!("TODO comments found:\n{}", render_hits(&hits)),
            Err(err) => format!("Error finding TODOs: {err}"),
        }
    }

    fn collect(&self) -> Result<Vec<SearchHit>> {
        let root = self.workdir.get();
        let files = matching_files(&root, "*", true)?;
        let mut hits = Vec::new();
        scan_lines(&root, &files, None, &mut hits, |line| {
            self.marker.is_match(line)
        });
        Ok(hits)
    }
}

pub struct ImportFinder {
    workdir: WorkingDir,
    pattern: String,
}

impl ImportFinder {
    pub fn new(workdir: WorkingDir, pattern: String) -> Self {
        Self { workdir, pattern }
    }

    pub fn find_imports(&self, module: &str) -> String {
        match self.collect(module) {
            Ok(hits) if hits.is_empty() => format!("No files found importing '{module}'"),
            Ok(hits) => format!("Files importing '{module}':\n{}", render_hits(&hits)),
            Err(err) => format!("Error finding imports: {err}"),
        }
    }

    fn collect(&self, module: &str) -> Result<Vec<SearchHit>> {
        let root = self.workdir.get();
        let files = matching_files(&root, &self.pattern, false)?;
        let import_form = format!("import {module}");
        let from_form = format!("from {module}");
        let mut hits = Vec::new();
        scan_lines(&root, &files, None, &mut hits, |line| {
            line.contains(&import_form) || line.contains(&from_form)
        });
        Ok(hits)
    }
}
