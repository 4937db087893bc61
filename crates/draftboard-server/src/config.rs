//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// SQLite database file.  Unset means the platform data directory.
    /// Env: `DRAFTBOARD_DB`
    /// Default: unset
    pub db_path: Option<PathBuf>,

    /// Filesystem path where uploaded images are stored.
    /// Env: `UPLOAD_DIR`
    /// Default: `./uploads`
    pub upload_dir: PathBuf,

    /// Bearer token every API request must present.
    /// Env: `API_TOKEN`
    /// Default: `dev-token` (development only, override in production).
    pub api_token: String,

    /// Externally reachable base URL, used to build image links.
    /// Env: `PUBLIC_URL`
    /// Default: `http://localhost:8080`
    pub public_url: String,

    /// Display name for the seeded administrator account.
    /// Env: `ADMIN_NAME`
    /// Default: `"Admin"`
    pub admin_name: String,

    /// Role label for the seeded administrator account.
    /// Env: `ADMIN_ROLE`
    /// Default: `"Lead Designer"`
    pub admin_role: String,

    /// Maximum upload size in bytes (10 MiB).
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            db_path: None,
            upload_dir: PathBuf::from("./uploads"),
            api_token: "dev-token".to_string(),
            public_url: "http://localhost:8080".to_string(),
            admin_name: "Admin".to_string(),
            admin_role: "Lead Designer".to_string(),
            max_upload_bytes: 10 * 1024 * 1024, // 10 MiB
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(
                    value = %addr,
                    "Invalid HTTP_ADDR, using default"
                );
            }
        }

        if let Ok(path) = std::env::var("DRAFTBOARD_DB") {
            if !path.is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Ok(path) = std::env::var("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(path);
        }

        if let Ok(token) = std::env::var("API_TOKEN") {
            if !token.is_empty() {
                config.api_token = token;
            }
        }

        if let Ok(url) = std::env::var("PUBLIC_URL") {
            config.public_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(name) = std::env::var("ADMIN_NAME") {
            if !name.is_empty() {
                config.admin_name = name;
            }
        }

        if let Ok(role) = std::env::var("ADMIN_ROLE") {
            if !role.is_empty() {
                config.admin_role = role;
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    /// Whether the token was left at the development default.
    pub fn uses_default_token(&self) -> bool {
        self.api_token == "dev-token"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.db_path, None);
        assert!(config.uses_default_token());
    }

    #[test]
    fn test_public_url_has_no_trailing_slash_by_default() {
        let config = ServerConfig::default();
        assert!(!config.public_url.ends_with('/'));
    }
}
