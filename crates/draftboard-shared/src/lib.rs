//! # draftboard-shared
//!
//! Domain models and wire-format normalization shared by the client
//! managers, the API layer, and the server.
//!
//! All records travel as camelCase JSON.  Fields that were added after the
//! first deployment (`requiresPin`, `accessibleTabs`, `linkedLogIds`) are
//! backfilled by [`normalize`] at every read boundary, so the rest of the
//! code only ever sees the current schema.

pub mod models;
pub mod normalize;

pub use models::*;
