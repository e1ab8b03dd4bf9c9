//! Credential verification against the directory
//!
//! Binds with the supplied credential and, on success, looks up the account
//! to return its profile attributes.

use crate::client::{DirectoryConnector, DirectorySession};
use crate::mapper::{map_profile, LOOKUP_ATTRIBUTES};
use dirsync_core::config::LookupConfig;
use dirsync_core::types::{AccountProfile, BindFormat, Credential, SearchRequest, SearchScope};
use dirsync_core::{Error, Result};
use tracing::{debug, error, info, warn};

/// Authentication outcome
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// Bind and lookup succeeded; zero or more matching profiles
    Success(Vec<AccountProfile>),
    /// Invalid credentials
    InvalidCredentials,
    /// Account disabled/locked
    AccountDisabled,
    /// Directory or protocol failure
    DirectoryError(String),
    /// Any other failure
    Failed(String),
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }

    pub fn profiles(&self) -> &[AccountProfile] {
        match self {
            AuthOutcome::Success(profiles) => profiles,
            _ => &[],
        }
    }
}

pub struct Authenticator<C> {
    connector: C,
    bind_format: BindFormat,
    lookup: LookupConfig,
}

impl<C: DirectoryConnector> Authenticator<C> {
    pub fn new(connector: C, bind_format: BindFormat, lookup: LookupConfig) -> Self {
        Self {
            connector,
            bind_format,
            lookup,
        }
    }

    /// Authenticate a credential and look up its account.
    ///
    /// Never fails: every error is logged and reported through the outcome.
    pub async fn authenticate(&self, credential: &Credential) -> AuthOutcome {
        // An empty password makes a simple bind unauthenticated, which servers accept
        if credential.password.is_empty() {
            warn!("Rejecting empty password for {}", credential.username);
            return AuthOutcome::InvalidCredentials;
        }

        match self.try_authenticate(credential).await {
            Ok(profiles) => {
                info!(
                    "Authenticated {} ({} matching entries)",
                    credential.username,
                    profiles.len()
                );
                AuthOutcome::Success(profiles)
            }
            Err(Error::InvalidCredentials) => {
                warn!("Authentication failed for {}: invalid credentials", credential.username);
                AuthOutcome::InvalidCredentials
            }
            Err(Error::AccountDisabled) => {
                warn!("Authentication failed for {}: account disabled", credential.username);
                AuthOutcome::AccountDisabled
            }
            Err(e) if e.is_directory() => {
                error!("Authentication failed for {}: {}", credential.username, e);
                AuthOutcome::DirectoryError(e.to_string())
            }
            Err(e) => {
                error!("Unexpected error authenticating {}: {}", credential.username, e);
                AuthOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_authenticate(&self, credential: &Credential) -> Result<Vec<AccountProfile>> {
        let mut session = self.connector.connect().await?;
        let result = self.bind_and_lookup(session.as_mut(), credential).await;
        session.unbind().await;
        result
    }

    async fn bind_and_lookup(
        &self,
        session: &mut dyn DirectorySession,
        credential: &Credential,
    ) -> Result<Vec<AccountProfile>> {
        let bind_name = credential.bind_name(self.bind_format);
        session.bind(&bind_name, &credential.password).await?;

        debug!("Credential verified for {}", bind_name);

        let request = self.lookup_request(credential);

        let mut stream = session.search(&request).await?;
        let mut profiles = Vec::new();
        while let Some(entry) = stream.next_entry().await? {
            debug!("Lookup matched {}", entry.dn);
            profiles.push(map_profile(&entry));
        }
        stream.finish().await?;

        Ok(profiles)
    }

    /// A DN bind already names the entry, so it is read directly with a
    /// base-scope search instead of matching the DN against an account filter.
    fn lookup_request(&self, credential: &Credential) -> SearchRequest {
        let attributes = LOOKUP_ATTRIBUTES.iter().map(|a| a.to_string()).collect();

        if self.bind_format == BindFormat::Dn && credential.username.contains('=') {
            return SearchRequest {
                base_dn: credential.username.clone(),
                scope: SearchScope::Base,
                filter: "(objectClass=*)".to_string(),
                attributes,
            };
        }

        SearchRequest::subtree(
            &self.lookup.base_dn,
            &self.build_filter(credential.account_name()),
            attributes,
        )
    }

    fn build_filter(&self, account: &str) -> String {
        self.lookup
            .filter
            .replace("{username}", &ldap3::ldap_escape(account))
    }
}
