#![forbid(unsafe_code)]

mod cmd;
mod output;
mod project;
mod validate;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode};
use std::env;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tb: union board for ideas, actions, and member messages",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (pretty, text, json). Overrides `--json`.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a board in the current directory",
        after_help = "EXAMPLES:\n    tb init\n\n    # Rewrite config.toml, keep records\n    tb init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Account",
        about = "Create a board account and sign in",
        after_help = "EXAMPLES:\n    TALKBOARD_SECRET=hunter22 tb register --email rita@union.org"
    )]
    Register(cmd::auth::CredentialArgs),

    #[command(
        next_help_heading = "Account",
        about = "Sign in with an existing account",
        after_help = "EXAMPLES:\n    tb login --email rita@union.org --secret hunter22"
    )]
    Login(cmd::auth::CredentialArgs),

    #[command(next_help_heading = "Account", about = "End the local session")]
    Logout,

    #[command(next_help_heading = "Account", about = "Show who is signed in")]
    Whoami,

    #[command(
        next_help_heading = "Board",
        about = "Member ideas: add, list, show, advance, delete"
    )]
    Idea {
        #[command(subcommand)]
        command: cmd::idea::IdeaCommand,
    },

    #[command(
        next_help_heading = "Board",
        about = "Board actions: add, list, show, advance, delete"
    )]
    Action {
        #[command(subcommand)]
        command: cmd::action::ActionCommand,
    },

    #[command(
        next_help_heading = "Board",
        about = "Voice of the base: send, list, toggle, delete"
    )]
    Voice {
        #[command(subcommand)]
        command: cmd::voice::VoiceCommand,
    },

    #[command(
        next_help_heading = "Board",
        about = "Summary counts",
        after_help = "EXAMPLES:\n    # Dashboard when signed in, public summary otherwise\n    tb stats\n\n    tb stats --public --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    tb completions bash > ~/.local/share/bash-completion/completions/tb"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TALKBOARD_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "talkboard_core=debug,talkboard_cli=debug,warn"
        } else {
            "warn"
        })
    });

    let format = env::var("TALKBOARD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let user_output = match talkboard_core::config::load_user_config() {
        Ok(config) => config.output,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable user config");
            None
        }
    };
    let output = output::resolve_output_mode(cli.format, cli.json, user_output.as_deref());

    match run(&cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is::<cmd::Reported>() => ExitCode::FAILURE,
        Err(e) => {
            // stderr may already be closed; the exit code still reports the failure.
            output::render_error(output, &CliError::new(format!("{e:#}"))).ok();
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    let project_root = env::current_dir()?;
    let quiet = cli.quiet;
    debug!(?output, root = %project_root.display(), "dispatching");

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, &project_root),
        Commands::Register(args) => cmd::auth::run_register(args, output, quiet, &project_root),
        Commands::Login(args) => cmd::auth::run_login(args, output, quiet, &project_root),
        Commands::Logout => cmd::auth::run_logout(output, quiet, &project_root),
        Commands::Whoami => cmd::auth::run_whoami(output, &project_root),
        Commands::Idea { command } => cmd::idea::run_idea(command, output, quiet, &project_root),
        Commands::Action { command } => {
            cmd::action::run_action(command, output, quiet, &project_root)
        }
        Commands::Voice { command } => cmd::voice::run_voice(command, output, quiet, &project_root),
        Commands::Stats(args) => cmd::stats::run_stats(args, output, &project_root),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args.shell, &mut Cli::command())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tb", "idea", "list", "--json", "-q"]);
        assert!(cli.json);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Idea { .. }));
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["tb", "--format", "text", "whoami"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["tb", "completions", "bash"]);
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
            vec!["tb", "init"],
            vec!["tb", "register", "--email", "a@b.org", "--secret", "hunter22"],
            vec!["tb", "login", "--email", "a@b.org", "--secret", "hunter22"],
            vec!["tb", "logout"],
            vec!["tb", "whoami"],
            vec!["tb", "idea", "add", "--author", "Ana", "--description", "x"],
            vec!["tb", "idea", "list", "--status", "done"],
            vec!["tb", "idea", "advance", "id-0a1b2c3d4e", "under-review"],
            vec!["tb", "action", "add", "--name", "n", "--owner", "o", "--description", "d"],
            vec!["tb", "action", "delete", "ac-0a1b2c3d4e", "--force"],
            vec!["tb", "voice", "send", "hello"],
            vec!["tb", "voice", "toggle", "vm-0a1b2c3d4e"],
            vec!["tb", "stats", "--public"],
            vec!["tb", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(
                result.is_ok(),
                "failed to parse {args:?}: {:?}",
                result.err()
            );
        }
    }
}
