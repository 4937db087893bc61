//! # draftboard-client
//!
//! State managers behind the dashboard UI.  Each manager owns one slice
//! of application state (session, logs, wiki, resources) and is the only
//! thing that mutates it; the presentation layer reads snapshots and
//! projects them through [`projection`].
//!
//! Sync policy, uniform across the managers:
//!
//! - loads fetch the remote collection and **replace** local state, never
//!   merge into it
//! - soft-delete of a log is **optimistic**: the record leaves local
//!   state first, and a remote failure reconciles by reloading
//! - every other mutation is **remote-first**: local state changes only
//!   after the store confirms
//! - concurrent mutations of one record are serialized in issue order

pub mod error;
pub mod locks;
pub mod logs;
pub mod projection;
pub mod resources;
pub mod session;
pub mod wiki;

#[cfg(test)]
mod testing;

pub use error::{ClientError, Result};
pub use logs::{ImageUpload, LogDraft, LogManager};
pub use resources::{ResourceDraft, ResourceManager};
pub use session::SessionManager;
pub use wiki::WikiManager;
