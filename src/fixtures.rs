//! Filesystem store for golden input/output pairs
//!
//! Every call touches the filesystem; nothing is cached. The store holds
//! `<name>.in` files fed to the tool, a shared `default.in` fallback, and
//! `<name>.out` files recording expected stdout for passing cases.

use crate::error::{Error, FatalError};
use crate::filter;

#[derive(Clone, Debug)]
pub struct FixtureDir {
    root: std::path::PathBuf,
}

impl FixtureDir {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// A missing fixture root means no case could ever resolve an input, so
    /// it aborts the run instead of failing every check one by one.
    pub fn require(&self) -> Result<(), FatalError> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(FatalError::FixtureRootMissing {
                path: self.root.clone(),
            })
        }
    }

    /// Resolve the input fixture fed to the tool: `<name>.in` if present,
    /// else the shared `default.in`.
    pub fn resolve_input(&self, name: &str) -> Result<std::path::PathBuf, Error> {
        let named = self.root.join(format!("{name}.in"));
        if named.is_file() {
            return Ok(named);
        }
        let shared = self.root.join("default.in");
        if shared.is_file() {
            return Ok(shared);
        }
        Err(Error::new(format!(
            "No input fixture for `{name}`: neither {} nor {} exists",
            named.display(),
            shared.display()
        )))
    }

    pub fn output_path(&self, name: &str) -> std::path::PathBuf {
        self.root.join(format!("{name}.out"))
    }

    /// Read the expected stdout for `name`, newline normalized.
    pub fn read_output(&self, name: &str) -> Result<String, Error> {
        let path = self.output_path(name);
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| Error::new(format!("Failed to read {}: {}", path.display(), e)))?;
        Ok(filter::normalize_lines(&raw))
    }

    /// Overwrite the expected stdout for `name` with freshly captured text.
    pub fn write_output(&self, name: &str, text: &str) -> Result<(), Error> {
        let path = self.output_path(name);
        std::fs::write(&path, text)
            .map_err(|e| Error::new(format!("Failed to write {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resolve_input_prefers_named_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let store = FixtureDir::new(dir.path());
        std::fs::write(dir.path().join("basic.in"), "stats").unwrap();
        std::fs::write(dir.path().join("default.in"), "fallback").unwrap();

        let resolved = store.resolve_input("basic").unwrap();
        assert_eq!(resolved, dir.path().join("basic.in"));
    }

    #[test]
    fn resolve_input_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = FixtureDir::new(dir.path());
        std::fs::write(dir.path().join("default.in"), "fallback").unwrap();

        let resolved = store.resolve_input("basic").unwrap();
        assert_eq!(resolved, dir.path().join("default.in"));
    }

    #[test]
    fn resolve_input_without_any_fixture_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FixtureDir::new(dir.path());
        assert!(store.resolve_input("basic").is_err());
    }

    #[test]
    fn read_output_normalizes_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let store = FixtureDir::new(dir.path());
        std::fs::write(dir.path().join("basic.out"), "Connections: 3\r\n").unwrap();

        assert_eq!(store.read_output("basic").unwrap(), "Connections: 3\n");
    }

    #[test]
    fn require_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FixtureDir::new(dir.path().join("test_io"));
        assert!(store.require().is_err());
    }
}
