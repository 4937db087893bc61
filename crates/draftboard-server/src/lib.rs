//! # draftboard-server
//!
//! Self-hostable backend for the draftboard team dashboard:
//!
//! - **REST API** (axum) over a flat SQLite key/value store, one JSON
//!   document per record
//! - **Bearer-token auth** on every data route
//! - **Image uploads** stored on disk and served back publicly
//! - **Startup seeding** of the reserved administrator and guest accounts

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod seed;
pub mod uploads;

pub use api::{build_router, serve, AppState};
pub use config::ServerConfig;
pub use error::ServerError;
pub use uploads::UploadStore;
