//! talkboard-core library.
//!
//! Ideas, actions, and anonymous voice messages for a union staff board,
//! kept in a flat document store and gated by a single "is a caller signed
//! in" capability.
//!
//! # Conventions
//!
//! - **Errors**: library operations return [`error::Result`] with a typed
//!   [`error::BoardError`]; `anyhow::Result` is used only where a file or
//!   database is opened.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `debug!`).
//! - **Engine purity**: everything under [`engine`] is a pure function of a
//!   supplied snapshot and [`engine::access::Capability`]; it never touches
//!   the store or the session.

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod session;
pub mod store;

pub use board::Board;
pub use error::{BoardError, ErrorCode, Result};
