//! Bind credentials

use serde::{Deserialize, Serialize};

/// How a bind name is derived from username and domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindFormat {
    /// `user@domain`
    #[default]
    UserPrincipal,
    /// `DOMAIN\user`
    DownLevel,
    /// Username used verbatim as the bind DN
    Dn,
}

/// Username, password and domain supplied for a bind
#[derive(Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub domain: String,
}

impl Credential {
    pub fn new(username: &str, password: &str, domain: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            domain: domain.to_string(),
        }
    }

    /// Build the name presented to the server in a simple bind
    pub fn bind_name(&self, format: BindFormat) -> String {
        // Already qualified names are passed through
        if self.domain.is_empty() || self.username.contains('@') || self.username.contains('\\') {
            return self.username.clone();
        }

        match format {
            BindFormat::UserPrincipal => format!("{}@{}", self.username, self.domain),
            BindFormat::DownLevel => format!("{}\\{}", self.domain, self.username),
            BindFormat::Dn => self.username.clone(),
        }
    }

    /// Account name without any domain qualification, for lookup filters
    pub fn account_name(&self) -> &str {
        if let Some((_, name)) = self.username.split_once('\\') {
            return name;
        }
        match self.username.split_once('@') {
            Some((name, _)) => name,
            None => &self.username,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("password", &"***")
            .finish()
    }
}
