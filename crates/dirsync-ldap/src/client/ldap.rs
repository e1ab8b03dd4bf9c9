//! ldap3-backed directory client
//!
//! Supports LDAP, LDAPS (SSL) and STARTTLS connections.

use super::{bind_error, DirectoryConnector, DirectorySession, EntryStream};
use async_trait::async_trait;
use dirsync_core::config::DirectoryConfig;
use dirsync_core::types::{DirectoryEntry, SearchRequest, SearchScope};
use dirsync_core::{Error, Result};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry, SearchStream};
use std::time::Duration;
use tracing::{debug, warn};

/// Connects to the server described by a [`DirectoryConfig`]
#[derive(Debug, Clone)]
pub struct Ldap3Connector {
    config: DirectoryConfig,
}

impl Ldap3Connector {
    pub fn new(config: DirectoryConfig) -> Self {
        Self { config }
    }

    fn settings(&self) -> LdapConnSettings {
        let mut settings = LdapConnSettings::new()
            .set_starttls(self.config.start_tls)
            .set_no_tls_verify(self.config.skip_tls_verify);

        // Zero disables the connect timeout
        if self.config.timeout_seconds > 0 {
            settings = settings.set_conn_timeout(Duration::from_secs(self.config.timeout_seconds));
        }

        settings
    }
}

#[async_trait]
impl DirectoryConnector for Ldap3Connector {
    async fn connect(&self) -> Result<Box<dyn DirectorySession>> {
        let url = self.config.server_url()?;

        debug!("Connecting to LDAP server: {}", url);

        let (conn, ldap) = LdapConnAsync::with_settings(self.settings(), url.as_str())
            .await
            .map_err(|e| Error::Connection(format!("{}: {}", url, e)))?;

        ldap3::drive!(conn);

        Ok(Box::new(Ldap3Session {
            ldap,
            server: url.to_string(),
        }))
    }
}

struct Ldap3Session {
    ldap: Ldap,
    server: String,
}

#[async_trait]
impl DirectorySession for Ldap3Session {
    async fn bind(&mut self, name: &str, password: &str) -> Result<()> {
        let result = self
            .ldap
            .simple_bind(name, password)
            .await
            .map_err(|e| Error::Connection(format!("Bind failed: {}", e)))?;

        if result.rc != 0 {
            debug!("Bind as {} failed with code {}: {}", name, result.rc, result.text);
            return Err(bind_error(result.rc, &result.text));
        }

        debug!("Bound to {} as {}", self.server, name);
        Ok(())
    }

    async fn search(&mut self, request: &SearchRequest) -> Result<Box<dyn EntryStream>> {
        let scope = match request.scope {
            SearchScope::Base => Scope::Base,
            SearchScope::OneLevel => Scope::OneLevel,
            SearchScope::Subtree => Scope::Subtree,
        };

        debug!(
            "Searching {} with filter {} ({} attributes)",
            request.base_dn,
            request.filter,
            request.attributes.len()
        );

        let stream = self
            .ldap
            .streaming_search(
                &request.base_dn,
                scope,
                &request.filter,
                request.attributes.clone(),
            )
            .await
            .map_err(|e| Error::Search(e.to_string()))?;

        Ok(Box::new(Ldap3EntryStream { stream }))
    }

    async fn unbind(&mut self) {
        if let Err(e) = self.ldap.unbind().await {
            warn!("Unbind from {} failed: {}", self.server, e);
        }
    }
}

struct Ldap3EntryStream {
    stream: SearchStream<'static, String, Vec<String>>,
}

#[async_trait]
impl EntryStream for Ldap3EntryStream {
    async fn next_entry(&mut self) -> Result<Option<DirectoryEntry>> {
        loop {
            let Some(result) = self
                .stream
                .next()
                .await
                .map_err(|e| Error::Search(e.to_string()))?
            else {
                return Ok(None);
            };

            // Referrals and intermediate messages carry no entry
            if result.is_ref() || result.is_intermediate() {
                debug!("Skipping non-entry search result");
                continue;
            }

            let entry = SearchEntry::construct(result);
            return Ok(Some(DirectoryEntry {
                dn: entry.dn,
                attrs: entry.attrs,
            }));
        }
    }

    async fn finish(&mut self) -> Result<()> {
        let result = self.stream.finish().await;

        if result.rc != 0 {
            return Err(Error::Search(format!(
                "Search ended with code {}: {}",
                result.rc, result.text
            )));
        }

        Ok(())
    }
}
