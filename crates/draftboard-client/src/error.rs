use thiserror::Error;

use draftboard_api::ApiError;

/// Errors surfaced by the client managers.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Any failure talking to the remote store.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The entered PIN did not match the stored one.  Nothing changed;
    /// the caller may retry.
    #[error("Invalid PIN")]
    InvalidPin,

    /// The target user is not in the loaded roster.
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    /// The target log is not in the loaded collection.
    #[error("Unknown log: {0}")]
    UnknownLog(String),

    /// The target wiki page is not in the loaded collection.
    #[error("Unknown wiki page: {0}")]
    UnknownPage(String),

    /// The operation needs a signed-in identity.
    #[error("Not signed in")]
    NotSignedIn,

    /// The operation is restricted to the administrator.
    #[error("Administrator access required")]
    Forbidden,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
