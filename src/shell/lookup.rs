//! Executable discovery on PATH.
//!
//! Resolution walks PATH entries directly instead of shelling out to
//! `which`, whose behavior varies across systems and is sometimes a shell
//! builtin with inconsistent error handling.

use std::path::{Path, PathBuf};

/// Finds executables by name. The binary-lookup collaborator.
pub trait BinaryLookup {
    /// Full path of the first executable called `name`, if any.
    fn find(&self, name: &str) -> Option<PathBuf>;
}

impl<F> BinaryLookup for F
where
    F: Fn(&str) -> Option<PathBuf>,
{
    fn find(&self, name: &str) -> Option<PathBuf> {
        self(name)
    }
}

/// Looks executables up on PATH.
///
/// The system PATH is re-read on every lookup; install commands from an
/// earlier recipe may have dropped new binaries into PATH directories.
#[derive(Debug, Clone, Default)]
pub struct PathLookup {
    /// Fixed search directories (replaces the system PATH when set).
    entries: Option<Vec<PathBuf>>,
    /// Directories searched before the PATH entries.
    prepend: Vec<PathBuf>,
}

impl PathLookup {
    /// Search the process PATH.
    pub fn system() -> Self {
        Self::default()
    }

    /// Search only the given directories.
    pub fn with_entries(entries: Vec<PathBuf>) -> Self {
        Self {
            entries: Some(entries),
            prepend: Vec::new(),
        }
    }

    /// Search `dir` before anything else.
    pub fn prepend(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prepend.push(dir.into());
        self
    }

    /// The directories a lookup would search, in order.
    pub fn search_path(&self) -> Vec<PathBuf> {
        let mut path = self.prepend.clone();
        match &self.entries {
            Some(entries) => path.extend(entries.iter().cloned()),
            None => path.extend(parse_system_path()),
        }
        path
    }
}

impl BinaryLookup for PathLookup {
    fn find(&self, name: &str) -> Option<PathBuf> {
        let found = if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
            let candidate = PathBuf::from(name);
            executable_candidates(&candidate).into_iter().find(|c| is_runnable(c))
        } else {
            resolve_tool_path(name, &self.search_path())
        };
        tracing::debug!("lookup {} -> {:?}", name, found);
        found
    }
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

fn is_runnable(path: &Path) -> bool {
    path.is_file() && is_executable(path)
}

#[cfg(windows)]
fn executable_candidates(path: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![path.to_path_buf()];
    if path.extension().is_none() {
        for ext in ["exe", "cmd", "bat"] {
            candidates.push(path.with_extension(ext));
        }
    }
    candidates
}

#[cfg(not(windows))]
fn executable_candidates(path: &Path) -> Vec<PathBuf> {
    vec![path.to_path_buf()]
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    path_entries
        .iter()
        .flat_map(|dir| executable_candidates(&dir.join(tool)))
        .find(|candidate| is_runnable(candidate))
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Create a fake binary at a path (creates parent dirs as needed).
    fn create_fake_binary(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    /// Create a non-executable file at a path.
    #[cfg(unix)]
    fn create_non_executable_file(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "not executable").unwrap();
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn resolve_tool_path_finds_first_match() {
        let temp = TempDir::new().unwrap();
        let dir_a = temp.path().join("a");
        let dir_b = temp.path().join("b");

        create_fake_binary(&dir_a.join("ninja"));
        create_fake_binary(&dir_b.join("ninja"));

        let result = resolve_tool_path("ninja", &[dir_a.clone(), dir_b.clone()]);
        assert_eq!(result, Some(dir_a.join("ninja")));
    }

    #[test]
    fn resolve_tool_path_returns_none_when_not_found() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("empty");
        fs::create_dir_all(&dir).unwrap();

        assert!(resolve_tool_path("ninja", &[dir]).is_none());
    }

    #[test]
    fn resolve_tool_path_ignores_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("ninja")).unwrap();

        assert!(resolve_tool_path("ninja", &[temp.path().to_path_buf()]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn resolve_tool_path_skips_non_executable() {
        let temp = TempDir::new().unwrap();
        let dir_a = temp.path().join("a");
        let dir_b = temp.path().join("b");

        create_non_executable_file(&dir_a.join("meson"));
        create_fake_binary(&dir_b.join("meson"));

        let result = resolve_tool_path("meson", &[dir_a, dir_b.clone()]);
        assert_eq!(result, Some(dir_b.join("meson")));
    }

    #[test]
    fn path_lookup_with_entries_searches_only_those() {
        let temp = TempDir::new().unwrap();
        create_fake_binary(&temp.path().join("bin/pip3"));

        let lookup = PathLookup::with_entries(vec![temp.path().join("bin")]);
        assert_eq!(lookup.find("pip3"), Some(temp.path().join("bin/pip3")));
        assert!(lookup.find("definitely-not-here").is_none());
    }

    #[test]
    fn prepended_directory_wins() {
        let temp = TempDir::new().unwrap();
        create_fake_binary(&temp.path().join("first/gem"));
        create_fake_binary(&temp.path().join("second/gem"));

        let lookup = PathLookup::with_entries(vec![temp.path().join("second")])
            .prepend(temp.path().join("first"));
        assert_eq!(lookup.find("gem"), Some(temp.path().join("first/gem")));
    }

    #[test]
    fn lookup_sees_binaries_installed_after_creation() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        let lookup = PathLookup::with_entries(vec![bin.clone()]);

        assert!(lookup.find("ninja").is_none());
        create_fake_binary(&bin.join("ninja"));
        assert_eq!(lookup.find("ninja"), Some(bin.join("ninja")));
    }

    #[test]
    fn names_with_separators_are_checked_directly() {
        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("tools/port");
        create_fake_binary(&tool);

        let lookup = PathLookup::with_entries(vec![]);
        assert_eq!(lookup.find(&tool.to_string_lossy()), Some(tool));
    }

    #[test]
    fn closures_are_lookups() {
        let lookup = |name: &str| (name == "brew").then(|| PathBuf::from("/opt/homebrew/bin/brew"));
        assert!(lookup.find("brew").is_some());
        assert!(lookup.find("port").is_none());
    }

    #[test]
    fn is_executable_returns_false_for_nonexistent_file() {
        #[cfg(unix)]
        assert!(!is_executable(Path::new("/nonexistent/path/to/file")));
        assert!(!is_runnable(Path::new("/nonexistent/path/to/file")));
    }
}
