//! Error types for Dirsync

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Directory Errors
    #[error("Failed to connect to directory server: {0}")]
    Connection(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled or locked")]
    AccountDisabled,

    #[error("Bind rejected with code {code}: {message}")]
    BindRejected { code: u32, message: String },

    #[error("Directory search failed: {0}")]
    Search(String),

    // Mapping Errors
    #[error("Entry {dn} is missing required attribute: {attribute}")]
    MissingAttribute { dn: String, attribute: String },

    #[error("Entry {dn} has {found} organizational units, {required} required")]
    InsufficientOrgUnits {
        dn: String,
        found: usize,
        required: usize,
    },

    // Configuration Errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Connection(_) => "ConnectionFailed",
            Error::InvalidCredentials => "InvalidCredentials",
            Error::AccountDisabled => "AccountDisabled",
            Error::BindRejected { .. } => "BindRejected",
            Error::Search(_) => "SearchFailed",
            Error::MissingAttribute { .. } => "MissingAttribute",
            Error::InsufficientOrgUnits { .. } => "InsufficientOrgUnits",
            Error::Config(_) => "InvalidConfiguration",
            Error::Other(_) => "InternalError",
        }
    }

    /// Whether the failure came from the directory server or the protocol
    /// exchange, as opposed to local mapping or configuration.
    pub fn is_directory(&self) -> bool {
        matches!(
            self,
            Error::Connection(_)
                | Error::InvalidCredentials
                | Error::AccountDisabled
                | Error::BindRejected { .. }
                | Error::Search(_)
        )
    }
}
