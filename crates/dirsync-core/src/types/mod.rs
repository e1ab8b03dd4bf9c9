//! Core types for Dirsync

mod credential;
mod entry;
mod user;

pub use credential::*;
pub use entry::*;
pub use user::*;
