//! # Golden-fixture conformance harness for `connstat`
//!
//! `connstat-verify` drives the `connstat` binary through the argument
//! combinations declared in a catalog file, captures stdout and the exit
//! status of each run, and compares them against recorded fixtures.
//!
//! ## Getting Started
//!
//! Declare cases in `tests.toml`:
//!
//! ```toml
//! [[case]]
//! name = "basic"
//! exit = 0
//! arguments = ""
//!
//! [[case]]
//! name = "timestamps"
//! exit = 0
//! arguments = ["-T d", "-T u"]
//!
//! [[case]]
//! name = "badflag"
//! exit = 1
//! arguments = "--nope"
//! ```
//!
//! Each case reads its stats from `test_io/<name>.in` (falling back to
//! `test_io/default.in`) and, when `exit = 0`, compares stdout against
//! `test_io/<name>.out`. Timestamp lines are masked on both sides before
//! comparison, so fixtures stay stable across runs.
//!
//! Run `connstat-verify` to verify, or `connstat-verify --regenerate` to
//! refresh the `.out` fixtures after an intentional output change.
//!
//! ## Embedding
//!
//! The same engine is available as a library:
//!
//! ```rust,no_run
//! let summary = connstat_verify::Harness::new()
//!     .catalog("tests.toml")
//!     .fixture_root("test_io")
//!     .tool_path("../cmd/connstat")
//!     .run(connstat_verify::Mode::Verify)?;
//! assert!(summary.success());
//! # Ok::<(), connstat_verify::FatalError>(())
//! ```

pub mod schema;

mod cmd;
mod error;
mod filter;
mod fixtures;
mod macros;
mod report;
mod runner;

pub use error::Error;
pub use error::FatalError;
pub use filter::normalize_lines;
pub use filter::normalize_timestamps;
pub use fixtures::FixtureDir;
pub use runner::Mode;
pub use runner::Summary;

/// Entry point for a verify or regenerate run
#[derive(Clone, Debug)]
pub struct Harness {
    catalog: std::path::PathBuf,
    fixture_root: std::path::PathBuf,
    tool: std::path::PathBuf,
    input_var: String,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            catalog: "tests.toml".into(),
            fixture_root: "test_io".into(),
            tool: "../cmd/connstat".into(),
            input_var: "STATS_FILENAME".into(),
        }
    }

    /// Catalog file driving the run (default `tests.toml`)
    pub fn catalog(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.catalog = path.into();
        self
    }

    /// Directory holding `.in`/`.out` fixtures (default `test_io`)
    pub fn fixture_root(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.fixture_root = path.into();
        self
    }

    /// Tool under test (default `../cmd/connstat`)
    pub fn tool_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.tool = path.into();
        self
    }

    /// Environment variable naming the input fixture for the tool
    /// (default `STATS_FILENAME`)
    pub fn input_env(mut self, var: impl Into<String>) -> Self {
        self.input_var = var.into();
        self
    }

    /// Load the catalog and run every case sequentially.
    ///
    /// Per-check failures are reported on stderr and tallied in the returned
    /// [`Summary`]; only catalog- or fixture-directory-level problems error
    /// out here.
    pub fn run(&self, mode: Mode) -> Result<Summary, FatalError> {
        let catalog = schema::Catalog::load(&self.catalog)?;

        let fixtures = fixtures::FixtureDir::new(&self.fixture_root);
        fixtures.require()?;

        let config = runner::RunConfig {
            fixtures,
            tool: self.tool.clone(),
            input_var: self.input_var.clone(),
        };

        let mut runner = runner::Runner::new();
        for spec in catalog.cases {
            runner.case(runner::Case { spec });
        }

        Ok(runner.run(mode, &config))
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
