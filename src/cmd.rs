//! Spawn the tool under test and capture its behavior

/// Process spawning with a fully constructed environment
///
/// The child's environment is always built from scratch: nothing from the
/// harness's own environment leaks through unless explicitly copied in. A
/// non-zero exit is a normal captured result; only a failed spawn surfaces
/// as an error.
#[derive(Debug)]
pub(crate) struct Command {
    cmd: std::process::Command,
}

impl Command {
    pub(crate) fn new(program: impl AsRef<std::ffi::OsStr>) -> Self {
        let mut cmd = std::process::Command::new(program);
        cmd.env_clear();
        Self { cmd }
    }

    pub(crate) fn args(
        mut self,
        args: impl IntoIterator<Item = impl AsRef<std::ffi::OsStr>>,
    ) -> Self {
        self.cmd.args(args);
        self
    }

    pub(crate) fn env(
        mut self,
        key: impl AsRef<std::ffi::OsStr>,
        value: impl AsRef<std::ffi::OsStr>,
    ) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Copy `PATH` from the current process so the tool can locate its own
    /// helpers, without inheriting anything else.
    pub(crate) fn inherit_path(mut self) -> Self {
        if let Some(path) = std::env::var_os("PATH") {
            self.cmd.env("PATH", path);
        }
        self
    }

    /// Run the command to completion and capture the `Output`.
    ///
    /// stdout and stderr are fully captured, not streamed; stdin is closed.
    /// The child is reaped and its pipes closed on every exit path.
    pub(crate) fn output(mut self) -> Result<std::process::Output, std::io::Error> {
        self.cmd.stdin(std::process::Stdio::null());
        self.cmd.output()
    }
}

/// Converts an [`std::process::ExitStatus`] to a human-readable value
pub(crate) fn display_exit_status(status: std::process::ExitStatus) -> String {
    if let Some(code) = status.code() {
        code.to_string()
    } else {
        "interrupted".to_owned()
    }
}
