pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A check-level failure message.
///
/// Carried inside per-variant check results; never aborts the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    inner: String,
}

impl Error {
    pub fn new(inner: impl std::fmt::Display) -> Self {
        Self::with_string(inner.to_string())
    }

    fn with_string(inner: String) -> Self {
        Self { inner }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

impl std::error::Error for Error {}

impl<'s> From<&'s str> for Error {
    fn from(other: &'s str) -> Self {
        Self::with_string(other.to_owned())
    }
}

impl<'s> From<&'s String> for Error {
    fn from(other: &'s String) -> Self {
        Self::with_string(other.clone())
    }
}

impl From<String> for Error {
    fn from(other: String) -> Self {
        Self::with_string(other)
    }
}

/// A harness-level failure that aborts the whole run.
///
/// Everything else is converted into a failed check for the affected
/// case/variant and the run continues.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FatalError {
    #[error("Failed to read catalog {}: {source}", path.display())]
    CatalogRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse catalog {}: {source}", path.display())]
    CatalogParse {
        path: std::path::PathBuf,
        #[source]
        source: toml_edit::de::Error,
    },
    #[error("Duplicate case name `{name}` in catalog {}", path.display())]
    DuplicateCase {
        path: std::path::PathBuf,
        name: String,
    },
    #[error("Fixture directory {} does not exist", path.display())]
    FixtureRootMissing { path: std::path::PathBuf },
}
