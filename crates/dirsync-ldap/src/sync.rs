//! Directory user synchronization
//!
//! Searches the configured subtree, maps each entry into a [`User`] and
//! hands the records to a [`UserSink`]. In buffered mode nothing reaches
//! the sink unless the whole search succeeded.

use crate::client::{DirectoryConnector, DirectorySession};
use crate::mapper::RecordMapper;
use crate::sink::UserSink;
use chrono::{DateTime, Utc};
use dirsync_core::config::{EmitMode, SyncConfig, UnmappablePolicy};
use dirsync_core::types::{BindFormat, Credential, SearchRequest, User};
use dirsync_core::{Error, Result};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Summary of a completed synchronization
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub users: Vec<User>,
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct DirectorySynchronizer<C> {
    connector: C,
    bind_format: BindFormat,
    config: SyncConfig,
    mapper: RecordMapper,
}

impl<C: DirectoryConnector> DirectorySynchronizer<C> {
    pub fn new(connector: C, bind_format: BindFormat, config: SyncConfig) -> Self {
        let mapper = RecordMapper::new(config.attributes.clone(), config.org_units);
        Self {
            connector,
            bind_format,
            config,
            mapper,
        }
    }

    /// Synchronize all users below the configured base.
    ///
    /// Any failure aborts the run; it is logged and returned.
    pub async fn sync_users(
        &self,
        credential: &Credential,
        sink: &mut dyn UserSink,
    ) -> Result<SyncReport> {
        let started_at = Utc::now();

        let result = self.try_sync(credential, sink).await;

        match result {
            Ok((users, skipped)) => {
                info!(
                    "Synchronized {} users from {} ({} skipped)",
                    users.len(),
                    self.config.base_dn,
                    skipped
                );
                Ok(SyncReport {
                    users,
                    skipped,
                    started_at,
                    finished_at: Utc::now(),
                })
            }
            Err(e) => {
                error!("User synchronization failed: {}", e);
                Err(e)
            }
        }
    }

    async fn try_sync(
        &self,
        credential: &Credential,
        sink: &mut dyn UserSink,
    ) -> Result<(Vec<User>, usize)> {
        // An empty password would turn the bind into an anonymous one
        if credential.password.is_empty() {
            warn!("Refusing to synchronize with an empty password for {}", credential.username);
            return Err(Error::InvalidCredentials);
        }

        let mut session = self.connector.connect().await?;
        let result = self.collect(session.as_mut(), credential, sink).await;
        session.unbind().await;
        let (users, skipped) = result?;

        if self.config.emit == EmitMode::Buffered {
            for user in &users {
                sink.accept(user).await?;
            }
        }
        sink.flush().await?;

        Ok((users, skipped))
    }

    async fn collect(
        &self,
        session: &mut dyn DirectorySession,
        credential: &Credential,
        sink: &mut dyn UserSink,
    ) -> Result<(Vec<User>, usize)> {
        session
            .bind(&credential.bind_name(self.bind_format), &credential.password)
            .await?;

        let request = SearchRequest::subtree(
            &self.config.base_dn,
            &self.config.filter,
            self.mapper.requested_attributes(),
        );

        let mut stream = session.search(&request).await?;
        let mut users = Vec::new();
        let mut skipped = 0;

        while let Some(entry) = stream.next_entry().await? {
            let user = match self.mapper.map_user(&entry) {
                Ok(user) => user,
                Err(e) if self.config.on_unmappable == UnmappablePolicy::Skip => {
                    warn!("Skipping {}: {}", entry.dn, e);
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            debug!("Mapped {} ({}/{})", user.id, user.region, user.org);

            if self.config.emit == EmitMode::Streaming {
                sink.accept(&user).await?;
            }
            users.push(user);
        }
        stream.finish().await?;

        Ok((users, skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{ad_user, MockDirectory};
    use crate::sink::CollectingSink;

    fn config() -> SyncConfig {
        SyncConfig {
            base_dn: "OU=Staff,DC=corp,DC=com".to_string(),
            ..Default::default()
        }
    }

    fn credential() -> Credential {
        Credential::new("svc-sync", "secret", "corp.com")
    }

    fn entries() -> Vec<dirsync_core::types::DirectoryEntry> {
        vec![
            ad_user("alice", "CN=x,OU=Taipei,OU=Sales,DC=corp,DC=com"),
            ad_user("bob", "CN=y,OU=Tainan,OU=Ops,DC=corp,DC=com"),
            ad_user("carol", "CN=z,OU=Hsinchu,OU=RD,DC=corp,DC=com"),
        ]
    }

    #[tokio::test]
    async fn test_sync_maps_region_and_org() {
        let mock = MockDirectory::with_entries(entries());
        let sync = DirectorySynchronizer::new(mock.clone(), BindFormat::UserPrincipal, config());
        let mut sink = CollectingSink::default();

        let report = sync.sync_users(&credential(), &mut sink).await.unwrap();

        assert_eq!(report.users.len(), 3);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.users[0].id, "alice");
        assert_eq!(report.users[0].region, "Taipei");
        assert_eq!(report.users[0].org, "Sales");
        assert_eq!(
            sink.users.iter().map(|u| u.id.as_str()).collect::<Vec<_>>(),
            vec!["alice", "bob", "carol"]
        );
        assert!(sink.flushed);

        let searches = mock.searches();
        assert_eq!(searches[0].base_dn, "OU=Staff,DC=corp,DC=com");
        assert_eq!(searches[0].filter, "(objectClass=user)");
        assert_eq!(
            searches[0].attributes,
            vec!["distinguishedName", "sAMAccountName", "displayName", "mail", "title"]
        );
        assert_eq!(mock.unbinds(), 1);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_emits_nothing() {
        let mock = MockDirectory::with_entries(entries()).fail_stream("connection lost");
        let sync = DirectorySynchronizer::new(mock.clone(), BindFormat::UserPrincipal, config());
        let mut sink = CollectingSink::default();

        let result = sync.sync_users(&credential(), &mut sink).await;

        assert!(matches!(result, Err(Error::Search(_))));
        assert!(sink.users.is_empty());
        assert!(!sink.flushed);
        assert_eq!(mock.unbinds(), 1);
    }

    #[tokio::test]
    async fn test_streaming_emits_before_failure() {
        let mock = MockDirectory::with_entries(entries()).fail_stream("connection lost");
        let sync = DirectorySynchronizer::new(
            mock,
            BindFormat::UserPrincipal,
            SyncConfig {
                emit: EmitMode::Streaming,
                ..config()
            },
        );
        let mut sink = CollectingSink::default();

        assert!(sync.sync_users(&credential(), &mut sink).await.is_err());
        assert_eq!(sink.users.len(), 3);
        assert!(!sink.flushed);
    }

    #[tokio::test]
    async fn test_unmappable_entry_aborts_by_default() {
        let mut list = entries();
        list.insert(1, ad_user("dave", "CN=d,OU=Only,DC=corp,DC=com"));
        let mock = MockDirectory::with_entries(list);
        let sync = DirectorySynchronizer::new(mock, BindFormat::UserPrincipal, config());
        let mut sink = CollectingSink::default();

        let result = sync.sync_users(&credential(), &mut sink).await;

        assert!(matches!(result, Err(Error::InsufficientOrgUnits { .. })));
        assert!(sink.users.is_empty());
    }

    #[tokio::test]
    async fn test_unmappable_entry_skipped() {
        let mut list = entries();
        list.insert(1, ad_user("dave", "CN=d,OU=Only,DC=corp,DC=com"));
        let mock = MockDirectory::with_entries(list);
        let sync = DirectorySynchronizer::new(
            mock,
            BindFormat::UserPrincipal,
            SyncConfig {
                on_unmappable: UnmappablePolicy::Skip,
                ..config()
            },
        );
        let mut sink = CollectingSink::default();

        let report = sync.sync_users(&credential(), &mut sink).await.unwrap();

        assert_eq!(report.users.len(), 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(sink.users.len(), 3);
    }

    #[tokio::test]
    async fn test_bind_failure_aborts() {
        let mock = MockDirectory::with_entries(entries()).reject_bind(49);
        let sync = DirectorySynchronizer::new(mock.clone(), BindFormat::UserPrincipal, config());
        let mut sink = CollectingSink::default();

        let result = sync.sync_users(&credential(), &mut sink).await;

        assert!(matches!(result, Err(Error::InvalidCredentials)));
        assert!(mock.searches().is_empty());
        assert!(sink.users.is_empty());
        assert_eq!(mock.unbinds(), 1);
    }

    #[tokio::test]
    async fn test_empty_password_rejected_before_connecting() {
        let mock = MockDirectory::with_entries(entries());
        let sync = DirectorySynchronizer::new(mock.clone(), BindFormat::UserPrincipal, config());
        let mut sink = CollectingSink::default();

        let result = sync
            .sync_users(&Credential::new("svc-sync", "", "corp.com"), &mut sink)
            .await;

        assert!(matches!(result, Err(Error::InvalidCredentials)));
        assert_eq!(mock.connects(), 0);
        assert!(mock.binds().is_empty());
        assert!(sink.users.is_empty());
        assert!(!sink.flushed);
    }

    #[tokio::test]
    async fn test_empty_subtree() {
        let mock = MockDirectory::default();
        let sync = DirectorySynchronizer::new(mock, BindFormat::UserPrincipal, config());
        let mut sink = CollectingSink::default();

        let report = sync.sync_users(&credential(), &mut sink).await.unwrap();

        assert!(report.users.is_empty());
        assert!(sink.flushed);
    }
}
