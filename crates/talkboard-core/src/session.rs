//! Session guard: accounts, sign-in, and the current caller.
//!
//! Accounts and sessions live in the board database. The active session
//! token is also written to `.talkboard/session` so later `tb` invocations
//! resolve the same caller. There is no ambient "current user": callers get
//! an explicit [`Caller`] and pass it into every board operation.

use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::Utc;
use rand::RngCore;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{info, warn};

use crate::engine::Capability;
use crate::error::{BoardError, Result};
use crate::store::format_timestamp;

/// File under the project directory holding the active session token.
pub const SESSION_FILE: &str = "session";

/// Explicit request context: who is asking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Caller {
    email: Option<String>,
}

impl Caller {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { email: None }
    }

    #[must_use]
    pub fn signed_in(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
        }
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub const fn capability(&self) -> Capability {
        Capability::from_flag(self.email.is_some())
    }
}

pub struct SessionGuard<'a> {
    conn: &'a Connection,
    token_path: PathBuf,
    min_secret_len: usize,
}

impl<'a> SessionGuard<'a> {
    #[must_use]
    pub fn new(conn: &'a Connection, token_path: impl Into<PathBuf>, min_secret_len: usize) -> Self {
        Self {
            conn,
            token_path: token_path.into(),
            min_secret_len,
        }
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// `ValidationMissing`/`ValidationInvalid` for a bad email or short
    /// secret, `AlreadyRegistered` for a taken email, `StoreUnavailable` on
    /// backend failure.
    pub fn register(&self, email: &str, secret: &str) -> Result<Caller> {
        let email = normalize_email(email)?;
        self.check_secret(secret)?;

        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = ?1)",
            params![email],
            |row| row.get(0),
        )?;
        if exists {
            return Err(BoardError::AlreadyRegistered(email));
        }

        let salt = random_hex();
        let digest = secret_digest(&salt, secret);
        self.conn.execute(
            "INSERT INTO accounts (email, salt, digest, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![email, salt, digest.to_hex().as_str(), format_timestamp(Utc::now())],
        )?;
        info!(%email, "registered account");

        self.open_session(email)
    }

    /// Verify credentials and start a session.
    ///
    /// # Errors
    ///
    /// `AuthFailed` for an unknown email or wrong secret, `StoreUnavailable`
    /// on backend failure.
    pub fn sign_in(&self, email: &str, secret: &str) -> Result<Caller> {
        let email = normalize_email(email)?;
        let stored: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT salt, digest FROM accounts WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((salt, digest)) = stored else {
            return Err(BoardError::AuthFailed);
        };

        let expected = blake3::Hash::from_hex(&digest)
            .map_err(|e| BoardError::StoreUnavailable(format!("corrupt account digest: {e}")))?;
        // blake3::Hash equality is constant-time.
        if secret_digest(&salt, secret) != expected {
            return Err(BoardError::AuthFailed);
        }

        self.open_session(email)
    }

    /// End the local session. Signing out while signed out is a no-op.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when the session row or token file cannot be
    /// removed.
    pub fn sign_out(&self) -> Result<()> {
        let Some(token) = self.read_token()? else {
            return Ok(());
        };
        self.conn
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        match std::fs::remove_file(&self.token_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(session_file_error(&e)),
        }
        info!("signed out");
        Ok(())
    }

    /// The signed-in caller, or `None`. A token with no session row is
    /// treated as signed out.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when the token file or database cannot be read.
    pub fn current_user(&self) -> Result<Option<Caller>> {
        let Some(token) = self.read_token()? else {
            return Ok(None);
        };
        let email: Option<String> = self
            .conn
            .query_row(
                "SELECT email FROM sessions WHERE token = ?1",
                params![token],
                |row| row.get(0),
            )
            .optional()?;
        Ok(email.map(Caller::signed_in))
    }

    /// Resolve the caller for one request, treating a session lookup failure
    /// as anonymous.
    #[must_use]
    pub fn caller(&self) -> Caller {
        match self.current_user() {
            Ok(Some(caller)) => caller,
            Ok(None) => Caller::anonymous(),
            Err(error) => {
                warn!(%error, "session lookup failed; continuing signed out");
                Caller::anonymous()
            }
        }
    }

    fn check_secret(&self, secret: &str) -> Result<()> {
        if secret.is_empty() {
            return Err(BoardError::ValidationMissing("secret"));
        }
        if secret.chars().count() < self.min_secret_len {
            return Err(BoardError::ValidationInvalid {
                field: "secret",
                reason: format!("must be at least {} characters", self.min_secret_len),
            });
        }
        Ok(())
    }

    fn open_session(&self, email: String) -> Result<Caller> {
        let token = random_hex();
        self.conn.execute(
            "INSERT INTO sessions (token, email, created_at) VALUES (?1, ?2, ?3)",
            params![token, email, format_timestamp(Utc::now())],
        )?;

        if let Some(parent) = self.token_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| session_file_error(&e))?;
        }
        std::fs::write(&self.token_path, &token).map_err(|e| session_file_error(&e))?;
        info!(%email, "signed in");
        Ok(Caller::signed_in(email))
    }

    fn read_token(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.token_path) {
            Ok(text) => {
                let token = text.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(session_file_error(&e)),
        }
    }
}

fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_ascii_lowercase();
    if email.is_empty() {
        return Err(BoardError::ValidationMissing("email"));
    }
    if !email.contains('@') {
        return Err(BoardError::ValidationInvalid {
            field: "email",
            reason: format!("'{email}' is not an email address"),
        });
    }
    Ok(email)
}

fn secret_digest(salt: &str, secret: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt.as_bytes());
    hasher.update(secret.as_bytes());
    hasher.finalize()
}

fn random_hex() -> String {
    let mut bytes = [0_u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    blake3::hash(&bytes).to_hex().to_string()
}

fn session_file_error(error: &std::io::Error) -> BoardError {
    BoardError::StoreUnavailable(format!("session file: {error}"))
}
