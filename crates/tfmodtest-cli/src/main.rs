use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod terraform;
mod testing;

/// Exit status when a harness error stopped the run
const EXIT_HARNESS_ERROR: u8 = 2;

/// Terraform module test harness.
///
/// Every directory directly under the test root is a test case: it is
/// applied and then destroyed. A case holding a `prereq/` directory has that
/// stack applied first and destroyed last. The `vendor` directory is never
/// a test case.
///
/// EXAMPLES:
///     tfmodtest test                      Run every case in the current directory
///     tfmodtest test --dir=test           Run cases under test/
///     tfmodtest test vpc                  Only cases whose name contains "vpc"
///     tfmodtest list                      Show cases without provisioning
///
/// ENVIRONMENT VARIABLES:
///     TFMODTEST_TERRAFORM   Terraform executable (default: terraform)
///     TFMODTEST_VENDOR_DIR  Reserved dependency directory (default: vendor)
///     TFMODTEST_JSON        Set to '1' for JSON output by default
///     TFMODTEST_LOG         Log filter (e.g. 'debug'; falls back to RUST_LOG)
///     NO_COLOR              Set to disable colored output
///
/// EXIT STATUS:
///     0  every test case passed
///     1  at least one test case failed
///     2  the harness could not run (unreadable test root, bad config)
#[derive(Parser)]
#[command(name = "tfmodtest")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision and tear down every test case
    ///
    /// Cases run one after another. A failing case is reported and the run
    /// moves on to the next one; teardown is attempted even when apply fails.
    ///
    /// EXAMPLES:
    ///     tfmodtest test                      Run all cases
    ///     tfmodtest test vpc                  Filter by pattern
    ///     tfmodtest test --dir=test           Specific test root
    ///     tfmodtest test --verbose            Show every case name
    ///     tfmodtest test --terraform=tofu     Use another executable
    #[command(visible_alias = "t")]
    Test {
        /// Filter test cases by name pattern
        pattern: Option<String>,
        /// Verbose output (show every case name and provisioning steps)
        #[arg(long, short = 'v')]
        verbose: bool,
        /// Disable colored output
        #[arg(
            long,
            env = "NO_COLOR",
            action = ArgAction::SetTrue,
            value_parser = FalseyValueParser::new()
        )]
        no_color: bool,
        /// Test root (defaults to current directory)
        #[arg(long, default_value = ".")]
        dir: std::path::PathBuf,
        /// Output in JSON format
        #[arg(
            long,
            env = "TFMODTEST_JSON",
            action = ArgAction::SetTrue,
            value_parser = FalseyValueParser::new()
        )]
        json: bool,
        /// Terraform executable (overrides config and TFMODTEST_TERRAFORM)
        #[arg(long)]
        terraform: Option<String>,
    },

    /// List test cases without provisioning anything
    ///
    /// EXAMPLES:
    ///     tfmodtest list                  List cases in the current directory
    ///     tfmodtest list --dir=test       List cases under test/
    ///     tfmodtest list --json           Machine-readable output
    #[command(visible_alias = "ls")]
    List {
        /// Test root (defaults to current directory)
        #[arg(long, default_value = ".")]
        dir: std::path::PathBuf,
        /// Output in JSON format
        #[arg(
            long,
            env = "TFMODTEST_JSON",
            action = ArgAction::SetTrue,
            value_parser = FalseyValueParser::new()
        )]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// Outputs shell completion scripts for bash, zsh, fish, or powershell.
    ///
    /// EXAMPLES:
    ///     tfmodtest completions bash > ~/.bash_completions/tfmodtest.bash
    ///     tfmodtest completions zsh > ~/.zfunc/_tfmodtest
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let cli_config = config::Config::from_env();

    init_logging(&cli, &cli_config);

    match run(cli, &cli_config) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::from(EXIT_HARNESS_ERROR)
        }
    }
}

/// Send logs to stderr, keeping stdout for reports
///
/// Filter precedence: TFMODTEST_LOG, RUST_LOG, then `info` with `--verbose`
/// or `warn` otherwise.
fn init_logging(cli: &Cli, cli_config: &config::Config) {
    let verbose = matches!(cli.command, Commands::Test { verbose: true, .. });
    let no_color =
        cli_config.no_color || matches!(cli.command, Commands::Test { no_color: true, .. });

    let filter = cli_config
        .log_filter
        .as_deref()
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { "info" } else { "warn" }));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli, cli_config: &config::Config) -> Result<ExitCode> {
    match cli.command {
        Commands::Test {
            pattern,
            verbose,
            no_color,
            dir,
            json,
            terraform,
        } => {
            let args = commands::test::TestArgs {
                pattern,
                verbose,
                // Command-line flag or environment
                no_color: no_color || cli_config.no_color,
                dir,
                json,
                terraform,
            };
            let outcome = commands::test::run(args)?;
            tracing::debug!(
                total = outcome.total,
                failed = outcome.failed,
                "test run finished"
            );
            if !outcome.success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::List { dir, json } => {
            if cli_config.no_color {
                colored::control::set_override(false);
            }
            commands::list::run(commands::list::ListArgs { dir, json })?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(ExitCode::SUCCESS)
}
