#![forbid(unsafe_code)]

mod cmd;
mod output;
mod render;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "nag: pull-request attention digests",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Path to the config file (defaults to ./nag.toml, then the user config dir).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags, environment, and the terminal.
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Digests",
        about = "Build pull-request digests for recipients",
        long_about = "Poll the configured repositories and print a digest of open pull requests per recipient.",
        after_help = "EXAMPLES:\n    # Digest every configured recipient\n    nag report\n\n    # Digest one recipient\n    nag report --for alice\n\n    # Restrict the cycle to specific pulls\n    nag report --pull 4211 --pull 4318\n\n    # Emit machine-readable output\n    nag report --json"
    )]
    Report(cmd::report::ReportArgs),

    #[command(
        next_help_heading = "Tracker",
        about = "Evaluate a webhook delivery against a tracker issue",
        long_about = "Decode a pull_request webhook delivery and decide whether the tracker issue named in its title should be linked.",
        after_help = "EXAMPLES:\n    # Evaluate a recorded delivery\n    nag link-check --payload delivery.json\n\n    # Supply the issue's tracker state\n    nag link-check --payload delivery.json --status Active --assignee dave\n\n    # Emit machine-readable output\n    nag link-check --payload delivery.json --json"
    )]
    LinkCheck(cmd::link_check::LinkCheckArgs),

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    nag completions bash\n\n    # Generate zsh completions\n    nag completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("NAG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "nag=debug,nag_core=debug,nag_github=debug,info"
        } else {
            "nag=info,nag_core=info,nag_github=info,warn"
        })
    });

    let format = env::var("NAG_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();

    match cli.command {
        Commands::Report(ref args) => cmd::report::run_report(args, cli.config.as_deref(), output),
        Commands::LinkCheck(ref args) => {
            cmd::link_check::run_link_check(args, cli.config.as_deref(), output)
        }
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_sets_output_mode() {
        let cli = Cli::parse_from(["nag", "--json", "report"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["nag", "report", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn format_flag_wins_over_json() {
        let cli = Cli::parse_from(["nag", "--format", "text", "--json", "report"]);
        assert!(!cli.output_mode().is_json());
    }

    #[test]
    fn config_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["nag", "--config", "team.toml", "report"]);
        assert_eq!(cli.config, Some(PathBuf::from("team.toml")));
    }

    #[test]
    fn config_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["nag", "report", "--config", "team.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("team.toml")));
    }

    #[test]
    fn report_subcommand_parses() {
        let cli = Cli::parse_from(["nag", "report", "--for", "alice", "--pull", "12", "--pull", "34"]);
        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.recipient.as_deref(), Some("alice"));
                assert_eq!(args.pulls, vec![12, 34]);
            }
            other => panic!("expected report, parsed {other:?}"),
        }
    }

    #[test]
    fn link_check_subcommand_parses() {
        let cli = Cli::parse_from(["nag", "link-check", "--payload", "delivery.json"]);
        assert!(matches!(cli.command, Commands::LinkCheck(_)));
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["nag", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["nag", "report"],
            vec!["nag", "link-check", "--payload", "d.json"],
            vec!["nag", "completions", "bash"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(
                result.is_ok(),
                "Failed to parse: {:?} — error: {:?}",
                args,
                result.err()
            );
        }
    }
}
