//! Destinations for synchronized users
//!
//! The synchronizer hands every mapped [`User`] to a [`UserSink`]. A store
//! backed implementation plugs in here; the CLI prints to the console.

use async_trait::async_trait;
use dirsync_core::types::User;
use dirsync_core::Result;

#[async_trait]
pub trait UserSink: Send {
    /// Receive one synchronized user
    async fn accept(&mut self, user: &User) -> Result<()>;

    /// Called once after the last user of a successful run
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keeps every accepted user in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub users: Vec<User>,
    pub flushed: bool,
}

#[async_trait]
impl UserSink for CollectingSink {
    async fn accept(&mut self, user: &User) -> Result<()> {
        self.users.push(user.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.flushed = true;
        Ok(())
    }
}
