//! `tb register`, `tb login`, `tb logout`, `tb whoami`.

use clap::Args;
use serde::Serialize;
use std::path::Path;

use crate::cmd::board_failure;
use crate::output::{OutputMode, pretty_kv, render, render_success};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct CredentialArgs {
    /// Account email.
    #[arg(long)]
    pub email: String,

    /// Account secret (at least 6 characters by default).
    #[arg(long, env = "TALKBOARD_SECRET", hide_env_values = true)]
    pub secret: String,
}

#[derive(Debug, Serialize)]
struct WhoAmI {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

/// Create an account and sign it in on this machine.
///
/// # Errors
///
/// Returns an error if the board is missing or registration is rejected.
pub fn run_register(
    args: &CredentialArgs,
    output: OutputMode,
    quiet: bool,
    project_root: &Path,
) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    let caller = project
        .session()
        .register(&args.email, &args.secret)
        .map_err(|e| board_failure(output, &e))?;
    let email = caller.email().unwrap_or_default();
    render_success(output, quiet, &format!("registered and signed in as {email}"))
}

/// Verify credentials and start a session.
///
/// # Errors
///
/// Returns an error if the board is missing or the credentials are wrong.
pub fn run_login(
    args: &CredentialArgs,
    output: OutputMode,
    quiet: bool,
    project_root: &Path,
) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    let caller = project
        .session()
        .sign_in(&args.email, &args.secret)
        .map_err(|e| board_failure(output, &e))?;
    let email = caller.email().unwrap_or_default();
    render_success(output, quiet, &format!("signed in as {email}"))
}

/// End the local session.
///
/// # Errors
///
/// Returns an error if the board is missing or the session cannot be removed.
pub fn run_logout(output: OutputMode, quiet: bool, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    project
        .session()
        .sign_out()
        .map_err(|e| board_failure(output, &e))?;
    render_success(output, quiet, "signed out")
}

/// Show the signed-in account, if any.
///
/// # Errors
///
/// Returns an error if the board is missing or output fails.
pub fn run_whoami(output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::open(project_root, output)?;
    let caller = project.caller();
    let who = WhoAmI {
        authenticated: caller.capability().is_authenticated(),
        email: caller.email().map(str::to_string),
    };
    render(output, &who, |w, out| match &w.email {
        Some(email) if output.is_pretty() => pretty_kv(out, "signed in", email),
        Some(email) => writeln!(out, "{email}"),
        None => writeln!(out, "anonymous"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: CredentialArgs,
    }

    #[test]
    fn credential_args_parse_from_flags() {
        let w = Wrapper::parse_from(["test", "--email", "a@b.org", "--secret", "hunter22"]);
        assert_eq!(w.args.email, "a@b.org");
        assert_eq!(w.args.secret, "hunter22");
    }

    #[test]
    fn missing_email_is_a_parse_error() {
        assert!(Wrapper::try_parse_from(["test", "--secret", "hunter22"]).is_err());
    }
}
