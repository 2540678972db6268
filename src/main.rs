//! Command-line driver: verify by default, regenerate on request

use clap::Parser;

use connstat_verify::Harness;
use connstat_verify::Mode;

/// Verify connstat behavior against golden fixtures
#[derive(Debug, Parser)]
#[command(name = "connstat-verify", version, about)]
struct Cli {
    /// Regenerate expected-output fixtures instead of verifying
    #[arg(short = 'g', long)]
    regenerate: bool,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = if cli.regenerate {
        Mode::Regenerate
    } else {
        Mode::Verify
    };

    match Harness::new().run(mode) {
        Ok(summary) => {
            // Regenerate mode's exit status reflects only harness-level
            // errors; content problems were already reported per case.
            if mode == Mode::Verify && !summary.success() {
                std::process::ExitCode::FAILURE
            } else {
                std::process::ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::ExitCode::from(2)
        }
    }
}
