use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::path::Path;
use talkboard_core::config::{self, PROJECT_DIR};
use talkboard_core::store::SqliteStore;
use tracing::info;

use crate::output::{OutputMode, pretty_kv, render};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite config.toml even if `.talkboard/` already exists. Records and
    /// accounts are kept.
    #[arg(long)]
    pub force: bool,
}

const GITIGNORE: &str = "*.sqlite3\n*.sqlite3-wal\n*.sqlite3-shm\nsession\n";

#[derive(Debug, Serialize)]
struct InitOutput {
    ok: bool,
    path: String,
    database: String,
}

/// Execute `tb init`. Creates the project skeleton:
///
/// ```text
/// .talkboard/
///   config.toml      (default project config)
///   .gitignore       (database files, session token)
///   board.sqlite3    (migrated board database)
/// ```
///
/// # Errors
///
/// Returns an error if `.talkboard/` already exists and `--force` is not
/// set, or if any filesystem or database operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let board_dir = project_root.join(PROJECT_DIR);

    if board_dir.exists() && !args.force {
        anyhow::bail!(
            "{PROJECT_DIR}/ already exists. Use `tb init --force` to rewrite its config."
        );
    }

    std::fs::create_dir_all(&board_dir)
        .with_context(|| format!("create {}", board_dir.display()))?;
    std::fs::write(board_dir.join("config.toml"), config::default_config_toml())
        .context("write config.toml")?;
    std::fs::write(board_dir.join(".gitignore"), GITIGNORE).context("write .gitignore")?;

    let project = config::load_project_config(project_root)?;
    let db_path = project.store_path(project_root);
    SqliteStore::open(&db_path)?;
    info!(path = %board_dir.display(), "initialized board");

    let result = InitOutput {
        ok: true,
        path: board_dir.display().to_string(),
        database: db_path.display().to_string(),
    };
    render(output, &result, |r, w| {
        if output.is_pretty() {
            writeln!(w, "✓ Initialized talkboard")?;
        }
        pretty_kv(w, "path", &r.path)?;
        pretty_kv(w, "database", &r.database)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: InitArgs,
    }

    #[test]
    fn init_args_parse() {
        assert!(!Wrapper::parse_from(["test"]).args.force);
        assert!(Wrapper::parse_from(["test", "--force"]).args.force);
    }

    #[test]
    fn init_creates_skeleton_and_refuses_rerun() {
        let dir = tempfile::tempdir().expect("temp dir");
        run_init(&InitArgs { force: false }, OutputMode::Json, dir.path()).expect("init");

        let board_dir = dir.path().join(PROJECT_DIR);
        assert!(board_dir.join("config.toml").exists());
        assert!(board_dir.join(".gitignore").exists());
        assert!(board_dir.join("board.sqlite3").exists());

        let again = run_init(&InitArgs { force: false }, OutputMode::Json, dir.path());
        assert!(again.is_err());
        run_init(&InitArgs { force: true }, OutputMode::Json, dir.path()).expect("force");
    }
}
