use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Shared handle to the session's working directory.
///
/// Clones observe the same value: a `set` through one handle is visible to
/// every collaborator holding another clone.
#[derive(Debug, Clone)]
pub struct WorkingDir {
    inner: Arc<RwLock<PathBuf>>,
}

impl WorkingDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(path.into())),
        }
    }

    pub fn get(&self) -> PathBuf {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set(&self, path: impl Into<PathBuf>) {
        let mut slot = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = path.into();
    }

    /// Resolves `raw` against the current value. See [`resolve_path`].
    pub fn resolve(&self, raw: &str) -> PathBuf {
        resolve_path(&self.get(), raw)
    }
}

/// Joins a relative `raw` onto `base`; absolute paths are taken as is.
/// `.` components are dropped, `..` is kept for the filesystem to interpret.
pub fn resolve_path(base: &Path, raw: &str) -> PathBuf {
    let candidate = Path::new(raw);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    };
    joined
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_updates() {
        let a = WorkingDir::new("/tmp/one");
        let b = a.clone();
        b.set("/tmp/two");
        assert_eq!(a.get(), PathBuf::from("/tmp/two"));
    }

    #[test]
    fn resolve_joins_relative_and_drops_cur_dir() {
        let base = Path::new("/work/project");
        assert_eq!(resolve_path(base, "."), PathBuf::from("/work/project"));
        assert_eq!(
            resolve_path(base, "./src/main.rs"),
            PathBuf::from("/work/project/src/main.rs")
        );
        assert_eq!(
            resolve_path(base, "../other"),
            PathBuf::from("/work/project/../other")
        );
    }

    #[cfg(unix)]
    #[test]
    fn resolve_keeps_absolute_paths() {
        let base = Path::new("/work/project");
        assert_eq!(resolve_path(base, "/etc/hosts"), PathBuf::from("/etc/hosts"));
    }
}
