//! Directory client seam
//!
//! The authenticator and synchronizer talk to the directory through these
//! traits. [`Ldap3Connector`] is the production implementation.

mod ldap;

pub use ldap::Ldap3Connector;

use async_trait::async_trait;
use dirsync_core::types::{DirectoryEntry, SearchRequest};
use dirsync_core::{Error, Result};

/// Opens directory sessions
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Open a new, unbound session
    async fn connect(&self) -> Result<Box<dyn DirectorySession>>;
}

/// A single connection to the directory server
#[async_trait]
pub trait DirectorySession: Send {
    /// Simple bind with a prepared bind name
    async fn bind(&mut self, name: &str, password: &str) -> Result<()>;

    /// Start a search; entries are pulled from the returned stream
    async fn search(&mut self, request: &SearchRequest) -> Result<Box<dyn EntryStream>>;

    /// Release the session. Failures are logged, never returned.
    async fn unbind(&mut self);
}

/// Entries of a running search
#[async_trait]
pub trait EntryStream: Send {
    /// Next entry, or `None` once the server signalled the end of the search
    async fn next_entry(&mut self) -> Result<Option<DirectoryEntry>>;

    /// Check the final result of the search
    async fn finish(&mut self) -> Result<()>;
}

/// Map a non-zero bind result code to an error
pub fn bind_error(rc: u32, text: &str) -> Error {
    match rc {
        // Invalid credentials
        49 => Error::InvalidCredentials,
        // Unwilling to perform: disabled or locked account on AD
        53 => Error::AccountDisabled,
        _ => Error::BindRejected {
            code: rc,
            message: text.to_string(),
        },
    }
}
