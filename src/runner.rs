//! Sequential execution and verification of catalog cases

use std::io::prelude::*;

#[cfg(feature = "color")]
use anstream::eprintln;
#[cfg(feature = "color")]
use anstream::stderr;
#[cfg(not(feature = "color"))]
use std::eprintln;
#[cfg(not(feature = "color"))]
use std::io::stderr;

use crate::cmd;
use crate::error::Error;
use crate::filter;
use crate::fixtures::FixtureDir;
use crate::report;
use crate::schema;

/// Operating mode for a whole run
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Run every variant of every case and compare against fixtures
    Verify,
    /// Refresh `<name>.out` fixtures from a single canonical run per case
    Regenerate,
}

/// Aggregate result of a run
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    fn count(&mut self, result: &Result<Output, Output>) {
        match result {
            Ok(output) if output.is_skipped() => self.skipped += 1,
            Ok(_) => self.passed += 1,
            Err(_) => self.failed += 1,
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} skipped",
            self.passed, self.failed, self.skipped
        )
    }
}

/// Everything a case needs to run, resolved once by the driver
#[derive(Debug)]
pub(crate) struct RunConfig {
    pub(crate) fixtures: FixtureDir,
    pub(crate) tool: std::path::PathBuf,
    pub(crate) input_var: String,
}

#[derive(Debug)]
pub(crate) struct Runner {
    cases: Vec<Case>,
}

impl Runner {
    pub(crate) fn new() -> Self {
        Self {
            cases: Default::default(),
        }
    }

    pub(crate) fn case(&mut self, case: Case) {
        self.cases.push(case);
    }

    /// Run every case in catalog order, one invocation at a time, reporting
    /// each check as it completes.
    pub(crate) fn run(&self, mode: Mode, config: &RunConfig) -> Summary {
        let palette = report::Palette::color();

        if self.cases.is_empty() {
            eprintln!("{}", palette.warn("The catalog lists no cases"));
            return Summary::default();
        }

        let verb = match mode {
            Mode::Verify => "Testing",
            Mode::Regenerate => "Regenerating",
        };

        let mut summary = Summary::default();
        for case in &self.cases {
            let results = case.run(mode, config);

            let stderr = stderr();
            let mut stderr = stderr.lock();

            for result in results {
                summary.count(&result);
                crate::debug!("Check: {:#?}", result);
                match result {
                    Ok(status) => {
                        let _ = write!(
                            stderr,
                            "{} {} ... {}",
                            palette.hint(verb),
                            status.name(),
                            status.summary(),
                        );
                        if let Some(duration) = status.duration {
                            let _ = write!(
                                stderr,
                                " {}",
                                palette.hint(humantime::format_duration(duration)),
                            );
                        }
                        let _ = writeln!(stderr);
                    }
                    Err(status) => {
                        let _ = write!(
                            stderr,
                            "{} {} ... {}",
                            palette.hint(verb),
                            status.name(),
                            palette.error("failed"),
                        );
                        if let Some(duration) = status.duration {
                            let _ = write!(
                                stderr,
                                " {}",
                                palette.hint(humantime::format_duration(duration)),
                            );
                        }
                        let _ = writeln!(stderr);
                        // Assuming `status` will print the newline
                        let _ = write!(stderr, "{}", &status);
                    }
                }
            }
        }

        let stderr = stderr();
        let mut stderr = stderr.lock();
        let _ = writeln!(stderr, "{}", palette.hint(&summary));
        if mode == Mode::Verify && !summary.success() {
            let _ = writeln!(
                stderr,
                "{}",
                palette.hint("Update fixtures with `connstat-verify --regenerate`"),
            );
        }

        summary
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub(crate) struct Case {
    pub(crate) spec: schema::CaseSpec,
}

#[allow(clippy::result_large_err)]
impl Case {
    pub(crate) fn run(&self, mode: Mode, config: &RunConfig) -> Vec<Result<Output, Output>> {
        match mode {
            Mode::Verify => self.verify(config),
            Mode::Regenerate => vec![self.regenerate(config)],
        }
    }

    // Variants are independent sub-checks: a failing variant never blocks
    // the remaining ones from running and being reported.
    fn verify(&self, config: &RunConfig) -> Vec<Result<Output, Output>> {
        self.spec
            .invocations()
            .into_iter()
            .map(|invocation| self.verify_invocation(invocation, config))
            .collect()
    }

    fn verify_invocation(
        &self,
        invocation: schema::Invocation,
        config: &RunConfig,
    ) -> Result<Output, Output> {
        let output = Output::check(invocation);
        let output = self.spawn(output, config)?;
        let output = self.validate_spawn(output);
        let output = self.validate_stdout(output, config);

        if output.is_ok() {
            Ok(output)
        } else {
            Err(output)
        }
    }

    /// Refresh this case's output fixture from its first argument variant.
    ///
    /// Variants of a passing case are assumed to produce equivalent output
    /// modulo timestamp masking, so one canonical run suffices. Cases that
    /// expect a failing exit have nothing to regenerate and are skipped with
    /// their fixture untouched.
    fn regenerate(&self, config: &RunConfig) -> Result<Output, Output> {
        let mut invocations = self.spec.invocations();
        let invocation = invocations.remove(0);

        if !self.spec.expects_success() {
            return Ok(Output::skipped(invocation));
        }

        let output = Output::check(invocation);
        let output = self.spawn(output, config)?;
        let output = self.validate_spawn(output);
        if !output.is_ok() {
            // The tool's stderr is part of the report so the failure can be
            // diagnosed; later cases still regenerate.
            return Err(output);
        }

        let content = match &output.stdout {
            Some(stream) => stream.content.clone(),
            None => return Err(output.error("No stdout captured".into())),
        };
        if let Err(err) = config.fixtures.write_output(&self.spec.name, &content) {
            return Err(output.error(err));
        }

        Ok(output)
    }

    fn spawn(&self, output: Output, config: &RunConfig) -> Result<Output, Output> {
        let input = config
            .fixtures
            .resolve_input(&self.spec.name)
            .map_err(|e| output.clone().error(e))?;

        let cmd = cmd::Command::new(&config.tool)
            .args(output.invocation.argv())
            .inherit_path()
            .env(&config.input_var, &input);

        let timer = std::time::Instant::now();
        let spawned = cmd.output().map_err(|e| {
            output.clone().error(Error::new(format!(
                "Failed to spawn {}: {}",
                config.tool.display(),
                e
            )))
        })?;

        Ok(output.output(spawned).duration(timer.elapsed()))
    }

    // Classification is coarse: an expected exit of 0 must match exactly,
    // anything else accepts any exit code of 1 or above. A signal-terminated
    // tool satisfies neither class.
    fn validate_spawn(&self, mut output: Output) -> Output {
        let Some(status) = output.spawn.exit else {
            return output;
        };

        if self.spec.expects_success() {
            if status.code() != Some(0) {
                output.spawn.status = SpawnStatus::Expected("success".into());
            }
        } else {
            match status.code() {
                Some(code) if code >= 1 => {}
                _ => {
                    output.spawn.status = SpawnStatus::Expected("failure".into());
                }
            }
        }

        output
    }

    // Only passing cases record an output fixture; failing cases are checked
    // on exit class alone.
    fn validate_stdout(&self, mut output: Output, config: &RunConfig) -> Output {
        if !self.spec.expects_success() {
            return output;
        }
        let Some(mut stream) = output.stdout.take() else {
            return output;
        };

        if stream.is_ok() {
            match config.fixtures.read_output(&self.spec.name) {
                Ok(expected) => {
                    // Mask both sides so timestamp drift can never fail a
                    // comparison.
                    let expected = filter::normalize_timestamps(&expected);
                    stream.content = filter::normalize_timestamps(&stream.content);
                    if stream.content != expected {
                        stream.status = StreamStatus::Expected(expected);
                    }
                }
                Err(err) => {
                    stream.status = StreamStatus::Failure(err);
                }
            }
        }

        output.stdout = Some(stream);
        output
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Output {
    invocation: schema::Invocation,
    spawn: Spawn,
    stdout: Option<Stream>,
    stderr: Option<Stream>,
    duration: Option<std::time::Duration>,
}

impl Output {
    fn check(invocation: schema::Invocation) -> Self {
        Self {
            invocation,
            spawn: Default::default(),
            stdout: None,
            stderr: None,
            duration: Default::default(),
        }
    }

    fn skipped(invocation: schema::Invocation) -> Self {
        let output = Self::check(invocation);
        debug_assert_eq!(output.spawn.status, SpawnStatus::Skipped);
        output
    }

    fn output(mut self, output: std::process::Output) -> Self {
        self.spawn.exit = Some(output.status);
        self.spawn.status = SpawnStatus::Ok;
        self.stdout = Some(Stream::new(Stdio::Stdout, output.stdout));
        self.stderr = Some(Stream::new(Stdio::Stderr, output.stderr));
        self
    }

    fn error(mut self, msg: Error) -> Self {
        self.spawn.status = SpawnStatus::Failure(msg);
        self
    }

    fn duration(mut self, duration: std::time::Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    fn is_ok(&self) -> bool {
        self.spawn.is_ok()
            && self.stdout.as_ref().map(|s| s.is_ok()).unwrap_or(true)
            && self.stderr.as_ref().map(|s| s.is_ok()).unwrap_or(true)
    }

    fn is_skipped(&self) -> bool {
        self.spawn.status == SpawnStatus::Skipped
    }

    fn name(&self) -> String {
        self.invocation.to_string()
    }

    fn summary(&self) -> impl std::fmt::Display {
        self.spawn.status.summary()
    }
}

// A failure report reads top-down: what happened, then what the tool wrote.
impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.spawn.fmt(f)?;
        if let Some(stdout) = &self.stdout {
            stdout.fmt(f)?;
        }
        if let Some(stderr) = &self.stderr {
            stderr.fmt(f)?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Spawn {
    exit: Option<std::process::ExitStatus>,
    status: SpawnStatus,
}

impl Spawn {
    fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

impl Default for Spawn {
    fn default() -> Self {
        Self {
            exit: None,
            status: SpawnStatus::Skipped,
        }
    }
}

impl std::fmt::Display for Spawn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let palette = report::Palette::color();

        match &self.status {
            SpawnStatus::Ok => {
                if let Some(exit) = self.exit {
                    if exit.success() {
                        writeln!(f, "Exit: {}", palette.info("success"))?;
                    } else if let Some(code) = exit.code() {
                        writeln!(f, "Exit: {}", palette.error(code))?;
                    } else {
                        writeln!(f, "Exit: {}", palette.error("interrupted"))?;
                    }
                }
            }
            SpawnStatus::Skipped => {
                writeln!(f, "{}", palette.warn("Skipped"))?;
            }
            SpawnStatus::Failure(msg) => {
                writeln!(f, "Failed: {}", palette.error(msg))?;
            }
            SpawnStatus::Expected(expected) => {
                if let Some(exit) = self.exit {
                    if exit.success() {
                        writeln!(
                            f,
                            "Expected {}, was {}",
                            palette.info(expected),
                            palette.error("success")
                        )?;
                    } else {
                        writeln!(
                            f,
                            "Expected {}, was {}",
                            palette.info(expected),
                            palette.error(cmd::display_exit_status(exit))
                        )?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum SpawnStatus {
    Ok,
    Skipped,
    Failure(Error),
    Expected(String),
}

impl SpawnStatus {
    fn is_ok(&self) -> bool {
        match self {
            Self::Ok | Self::Skipped => true,
            Self::Failure(_) | Self::Expected(_) => false,
        }
    }

    fn summary(&self) -> impl std::fmt::Display {
        let palette = report::Palette::color();
        match self {
            Self::Ok => palette.info("ok"),
            Self::Skipped => palette.warn("skipped"),
            Self::Failure(_) | Self::Expected(_) => palette.error("failed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Stream {
    stream: Stdio,
    content: String,
    status: StreamStatus,
}

impl Stream {
    fn new(stream: Stdio, bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(content) => Self {
                stream,
                content: filter::normalize_lines(&content),
                status: StreamStatus::Ok,
            },
            Err(err) => Self {
                content: String::from_utf8_lossy(err.as_bytes()).into_owned(),
                stream,
                status: StreamStatus::Failure(
                    format!("{stream} was not valid UTF-8").into(),
                ),
            },
        }
    }

    fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let palette = report::Palette::color();

        match &self.status {
            StreamStatus::Ok => {
                if !self.content.is_empty() {
                    writeln!(f, "{}:", self.stream)?;
                    writeln!(f, "{}", palette.info(&self.content))?;
                }
            }
            StreamStatus::Failure(msg) => {
                writeln!(
                    f,
                    "{} {}:",
                    self.stream,
                    palette.error(format_args!("({msg})"))
                )?;
                writeln!(f, "{}", palette.info(&self.content))?;
            }
            StreamStatus::Expected(expected) => {
                report::write_diff(
                    f,
                    expected,
                    &self.content,
                    Some(&self.stream),
                    Some(&self.stream),
                    palette,
                )?;
            }
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum StreamStatus {
    Ok,
    Failure(Error),
    Expected(String),
}

impl StreamStatus {
    fn is_ok(&self) -> bool {
        match self {
            Self::Ok => true,
            Self::Failure(_) | Self::Expected(_) => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Stdio {
    Stdout,
    Stderr,
}

impl Stdio {
    fn as_str(&self) -> &str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl std::fmt::Display for Stdio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[cfg(unix)]
    fn exit_code_to_status(code: u8) -> std::process::ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw((code as i32) << 8)
    }

    #[cfg(windows)]
    fn exit_code_to_status(code: u8) -> std::process::ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code as u32)
    }

    fn case(exit: i32) -> Case {
        Case {
            spec: schema::CaseSpec {
                name: "case".into(),
                exit,
                arguments: None,
            },
        }
    }

    fn ran(code: u8) -> Output {
        let invocation = schema::Invocation {
            name: "case".into(),
            arguments: String::new(),
        };
        Output::check(invocation).output(std::process::Output {
            status: exit_code_to_status(code),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }

    #[test]
    fn expected_success_accepts_only_zero() {
        let case = case(0);
        assert!(case.validate_spawn(ran(0)).spawn.is_ok());
        assert!(!case.validate_spawn(ran(1)).spawn.is_ok());
        assert!(!case.validate_spawn(ran(2)).spawn.is_ok());
    }

    #[test]
    fn expected_failure_accepts_any_nonzero() {
        let case = case(1);
        assert!(!case.validate_spawn(ran(0)).spawn.is_ok());
        assert!(case.validate_spawn(ran(1)).spawn.is_ok());
        assert!(case.validate_spawn(ran(2)).spawn.is_ok());
        assert!(case.validate_spawn(ran(255)).spawn.is_ok());
    }

    #[test]
    fn skipped_output_counts_as_skipped() {
        let invocation = schema::Invocation {
            name: "badflag".into(),
            arguments: "--nope".into(),
        };
        let output = Output::skipped(invocation);
        assert!(output.is_ok());
        assert!(output.is_skipped());

        let mut summary = Summary::default();
        summary.count(&Ok(output));
        assert_eq!(
            summary,
            Summary {
                passed: 0,
                failed: 0,
                skipped: 1
            }
        );
    }

    #[test]
    fn non_utf8_stdout_is_a_failed_stream() {
        let stream = Stream::new(Stdio::Stdout, vec![0xff, 0xfe]);
        assert!(!stream.is_ok());
    }
}
