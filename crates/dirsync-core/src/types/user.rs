//! User types

use serde::{Deserialize, Serialize};

/// A directory user mapped for the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account name, unique within the directory
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    /// Organizational unit at the org position of the DN's OU list
    pub org: String,
    pub job_title: Option<String>,
    /// Organizational unit at the region position of the DN's OU list
    pub region: String,
}

/// Attributes returned by the single-account lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub distinguished_name: Option<String>,
    pub mail: Option<String>,
    pub display_name: Option<String>,
    pub title: Option<String>,
}
