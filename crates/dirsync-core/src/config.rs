//! Configuration for Dirsync
//!
//! Example config:
//! ```toml
//! [directory]
//! server = "dc01.corp.example.com"
//! port = 389
//! start_tls = true
//!
//! [credentials]
//! domain = "CORP"
//! username = "svc-sync"
//! password = "secret"
//!
//! [lookup]
//! base_dn = "DC=corp,DC=example,DC=com"
//!
//! [sync]
//! base_dn = "OU=Staff,OU=Users,DC=corp,DC=example,DC=com"
//! emit = "streaming"
//! ```

use crate::types::{BindFormat, Credential};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Standard LDAP port
pub const DEFAULT_LDAP_PORT: u16 = 389;

/// Standard LDAPS port
pub const DEFAULT_LDAPS_PORT: u16 = 636;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirsyncConfig {
    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DirsyncConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay `DIRSYNC_*` environment variables onto this configuration
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    /// Overlay variables resolved by `lookup` onto this configuration
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(server) = lookup("DIRSYNC_SERVER") {
            self.directory.server = server;
        }
        if let Some(port) = lookup("DIRSYNC_PORT") {
            if let Ok(p) = port.parse() {
                self.directory.port = Some(p);
            }
        }
        if let Some(start_tls) = lookup("DIRSYNC_START_TLS").as_deref().and_then(parse_flag) {
            self.directory.start_tls = start_tls;
        }
        if let Some(use_ldaps) = lookup("DIRSYNC_USE_LDAPS").as_deref().and_then(parse_flag) {
            self.directory.use_ldaps = use_ldaps;
        }
        if let Some(domain) = lookup("DIRSYNC_DOMAIN") {
            self.credentials.domain = domain;
        }
        if let Some(username) = lookup("DIRSYNC_USERNAME") {
            self.credentials.username = username;
        }
        if let Some(password) = lookup("DIRSYNC_PASSWORD") {
            self.credentials.password = password;
        }
        if let Some(base) = lookup("DIRSYNC_LOOKUP_BASE") {
            self.lookup.base_dn = base;
        }
        if let Some(base) = lookup("DIRSYNC_SYNC_BASE") {
            self.sync.base_dn = base;
        }
        if let Some(filter) = lookup("DIRSYNC_SYNC_FILTER") {
            self.sync.filter = filter;
        }
        if let Some(level) = lookup("DIRSYNC_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Credential triple used by both the authenticator and the synchronizer
    pub fn credential(&self) -> Credential {
        Credential::new(
            &self.credentials.username,
            &self.credentials.password,
            &self.credentials.domain,
        )
    }

    /// Validate the settings shared by every operation
    pub fn validate(&self) -> Result<()> {
        self.directory.validate()?;

        if self.credentials.username.is_empty() {
            return Err(Error::Config("Username is required".into()));
        }

        Ok(())
    }
}

/// Directory server connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Host name, or a full `ldap://` / `ldaps://` URL
    pub server: String,

    /// Port; defaults to 389, or 636 with `use_ldaps`
    pub port: Option<u16>,

    /// Connect with LDAPS instead of plain LDAP
    pub use_ldaps: bool,

    /// Upgrade a plain connection with STARTTLS
    pub start_tls: bool,

    /// Skip TLS certificate verification (not recommended for production)
    pub skip_tls_verify: bool,

    /// Connection timeout in seconds
    pub timeout_seconds: u64,

    /// How the bind name is built from username and domain
    pub bind_format: BindFormat,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: None,
            use_ldaps: false,
            start_tls: false,
            skip_tls_verify: false,
            timeout_seconds: 10,
            bind_format: BindFormat::default(),
        }
    }
}

impl DirectoryConfig {
    /// Resolve the server setting into a connection URL
    pub fn server_url(&self) -> Result<Url> {
        if self.server.is_empty() {
            return Err(Error::Config("Server address is required".into()));
        }

        if self.server.contains("://") {
            let url = Url::parse(&self.server)
                .map_err(|e| Error::Config(format!("Invalid server URL {}: {}", self.server, e)))?;

            return match url.scheme() {
                "ldap" | "ldaps" => Ok(url),
                other => Err(Error::Config(format!(
                    "Server URL must use ldap:// or ldaps://, got {}://",
                    other
                ))),
            };
        }

        let (scheme, default_port) = if self.use_ldaps {
            ("ldaps", DEFAULT_LDAPS_PORT)
        } else {
            ("ldap", DEFAULT_LDAP_PORT)
        };
        let port = self.port.unwrap_or(default_port);

        Url::parse(&format!("{}://{}:{}", scheme, self.server, port))
            .map_err(|e| Error::Config(format!("Invalid server address {}: {}", self.server, e)))
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.server_url()?;

        if self.start_tls && url.scheme() == "ldaps" {
            return Err(Error::Config(
                "STARTTLS cannot be combined with an ldaps:// connection".into(),
            ));
        }

        Ok(())
    }
}

/// Credential settings. Never hard-coded; sourced from file, env or CLI.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub domain: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Single-account lookup performed after a successful bind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Base DN for the account lookup, e.g. "DC=corp,DC=example,DC=com"
    pub base_dn: String,

    /// Lookup filter; `{username}` is replaced with the escaped account name
    pub filter: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_dn: String::new(),
            filter: "(sAMAccountName={username})".to_string(),
        }
    }
}

impl LookupConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_dn.is_empty() {
            return Err(Error::Config("Lookup base DN is required".into()));
        }
        validate_filter(&self.filter)?;
        if !self.filter.contains("{username}") {
            return Err(Error::Config(
                "Lookup filter must contain {username} placeholder".into(),
            ));
        }
        Ok(())
    }
}

/// Subtree synchronization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base DN of the synchronized subtree
    pub base_dn: String,

    /// Search filter
    pub filter: String,

    pub attributes: AttributeMappings,

    pub org_units: OrgUnitLayout,

    pub emit: EmitMode,

    pub on_unmappable: UnmappablePolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_dn: String::new(),
            filter: "(objectClass=user)".to_string(),
            attributes: AttributeMappings::default(),
            org_units: OrgUnitLayout::default(),
            emit: EmitMode::default(),
            on_unmappable: UnmappablePolicy::default(),
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_dn.is_empty() {
            return Err(Error::Config("Sync base DN is required".into()));
        }
        validate_filter(&self.filter)?;
        self.org_units.validate()
    }
}

/// Directory attribute names read during synchronization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeMappings {
    pub distinguished_name: String,
    pub account_name: String,
    pub display_name: String,
    pub email: String,
    pub title: String,
}

impl Default for AttributeMappings {
    fn default() -> Self {
        Self {
            distinguished_name: "distinguishedName".to_string(),
            account_name: "sAMAccountName".to_string(),
            display_name: "displayName".to_string(),
            email: "mail".to_string(),
            title: "title".to_string(),
        }
    }
}

impl AttributeMappings {
    /// Attribute list requested from the server
    pub fn requested(&self) -> Vec<String> {
        vec![
            self.distinguished_name.clone(),
            self.account_name.clone(),
            self.display_name.clone(),
            self.email.clone(),
            self.title.clone(),
        ]
    }
}

/// Positions in the DN's OU list that hold region and organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgUnitLayout {
    pub region_index: usize,
    pub org_index: usize,
}

impl Default for OrgUnitLayout {
    fn default() -> Self {
        Self {
            region_index: 0,
            org_index: 1,
        }
    }
}

impl OrgUnitLayout {
    /// Number of OU components an entry needs for both fields
    pub fn required(&self) -> usize {
        self.region_index.max(self.org_index) + 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.region_index == self.org_index {
            return Err(Error::Config(
                "Region and org must use different OU positions".into(),
            ));
        }
        Ok(())
    }
}

/// When synchronized records are handed to the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitMode {
    /// Emit after the whole search completed; nothing on failure
    #[default]
    Buffered,
    /// Emit each record as soon as it is mapped
    Streaming,
}

/// What to do with an entry that cannot be mapped into a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappablePolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Boolean environment value; unrecognized values are ignored
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn validate_filter(filter: &str) -> Result<()> {
    if filter.is_empty() {
        return Err(Error::Config("Search filter is required".into()));
    }
    if !filter.starts_with('(') || !filter.ends_with(')') {
        return Err(Error::Config(format!(
            "Search filter must be enclosed in parentheses: {}",
            filter
        )));
    }
    Ok(())
}
