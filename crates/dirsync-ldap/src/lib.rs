//! LDAP/Active Directory access for Dirsync
//!
//! Provides:
//! - Credential verification with account lookup
//! - Subtree user synchronization
//! - Entry to record mapping
//!
//! Supports plain LDAP, LDAPS and STARTTLS connections through `ldap3`.

pub mod authenticator;
pub mod client;
pub mod mapper;
pub mod sink;
pub mod sync;

#[cfg(test)]
mod mock;

pub use authenticator::{AuthOutcome, Authenticator};
pub use client::{DirectoryConnector, DirectorySession, EntryStream, Ldap3Connector};
pub use mapper::RecordMapper;
pub use sink::{CollectingSink, UserSink};
pub use sync::{DirectorySynchronizer, SyncReport};
