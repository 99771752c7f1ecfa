//! Locating and opening the board for one `tb` invocation.

use std::path::{Path, PathBuf};

use talkboard_core::config::{self, PROJECT_DIR, ProjectConfig};
use talkboard_core::session::{Caller, SESSION_FILE, SessionGuard};
use talkboard_core::store::SqliteStore;
use talkboard_core::{Board, ErrorCode};

use crate::cmd::reported;
use crate::output::{CliError, OutputMode};

pub struct Project {
    pub root: PathBuf,
    pub config: ProjectConfig,
    store: SqliteStore,
}

impl Project {
    /// Find the nearest `.talkboard/` above `start`, load its config, and
    /// open the database.
    ///
    /// # Errors
    ///
    /// Renders and returns an error when the board is not initialized, the
    /// config does not parse, or the database cannot be opened.
    pub fn open(start: &Path, output: OutputMode) -> anyhow::Result<Self> {
        let Some(root) = config::find_project_root(start) else {
            return Err(reported(
                output,
                CliError::from_code(
                    ErrorCode::NotInitialized,
                    "not a talkboard directory: .talkboard/ not found",
                ),
            ));
        };

        let config = config::load_project_config(&root).map_err(|e| {
            reported(
                output,
                CliError::from_code(ErrorCode::ConfigParseError, format!("{e:#}")),
            )
        })?;

        let store = SqliteStore::open(&config.store_path(&root)).map_err(|e| {
            reported(
                output,
                CliError::from_code(ErrorCode::StoreUnavailable, format!("{e:#}")),
            )
        })?;

        Ok(Self {
            root,
            config,
            store,
        })
    }

    pub fn session(&self) -> SessionGuard<'_> {
        SessionGuard::new(
            self.store.connection(),
            self.root.join(PROJECT_DIR).join(SESSION_FILE),
            self.config.auth.min_secret_len,
        )
    }

    /// The caller for this invocation, resolved once up front.
    pub fn caller(&self) -> Caller {
        self.session().caller()
    }

    pub fn into_board(self) -> Board<SqliteStore> {
        Board::new(self.store).with_anonymous_label(self.config.voice.anonymous_label)
    }
}
