//! # draftboard-store
//!
//! SQLite-backed key-value persistence for the dashboard server.
//!
//! The remote-store API is deliberately schemaless: every record is a JSON
//! document under a namespaced string key (`user:<id>`, `log:<id>`, ...).
//! This crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides the few KV helpers the request
//! handlers need.

pub mod database;
pub mod kv;
pub mod migrations;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
