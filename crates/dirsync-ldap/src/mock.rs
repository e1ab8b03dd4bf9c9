//! Scripted in-memory directory for tests

use crate::client::{bind_error, DirectoryConnector, DirectorySession, EntryStream};
use async_trait::async_trait;
use dirsync_core::types::{DirectoryEntry, SearchRequest};
use dirsync_core::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockItem {
    Entry(DirectoryEntry),
    Fail(String),
}

#[derive(Debug, Default)]
pub struct MockState {
    pub refuse_connection: bool,
    pub bind_rc: Option<u32>,
    pub bind_transport_error: bool,
    pub items: Vec<MockItem>,
    pub connects: usize,
    pub binds: Vec<(String, String)>,
    pub searches: Vec<SearchRequest>,
    pub unbinds: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MockDirectory {
    pub state: Arc<Mutex<MockState>>,
}

impl MockDirectory {
    pub fn with_entries(entries: Vec<DirectoryEntry>) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().items = entries.into_iter().map(MockItem::Entry).collect();
        mock
    }

    /// Fail the stream after the entries already scripted
    pub fn fail_stream(self, message: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .items
            .push(MockItem::Fail(message.to_string()));
        self
    }

    pub fn reject_bind(self, rc: u32) -> Self {
        self.state.lock().unwrap().bind_rc = Some(rc);
        self
    }

    pub fn break_bind(self) -> Self {
        self.state.lock().unwrap().bind_transport_error = true;
        self
    }

    pub fn refuse_connection(self) -> Self {
        self.state.lock().unwrap().refuse_connection = true;
        self
    }

    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    pub fn unbinds(&self) -> usize {
        self.state.lock().unwrap().unbinds
    }

    pub fn binds(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().binds.clone()
    }

    pub fn searches(&self) -> Vec<SearchRequest> {
        self.state.lock().unwrap().searches.clone()
    }
}

#[async_trait]
impl DirectoryConnector for MockDirectory {
    async fn connect(&self) -> Result<Box<dyn DirectorySession>> {
        let mut state = self.state.lock().unwrap();
        state.connects += 1;
        if state.refuse_connection {
            return Err(Error::Connection("connection refused".into()));
        }

        Ok(Box::new(MockSession {
            state: self.state.clone(),
        }))
    }
}

struct MockSession {
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl DirectorySession for MockSession {
    async fn bind(&mut self, name: &str, password: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.binds.push((name.to_string(), password.to_string()));

        if state.bind_transport_error {
            return Err(Error::Connection("connection reset by peer".into()));
        }
        match state.bind_rc {
            Some(rc) => Err(bind_error(rc, "bind rejected")),
            None => Ok(()),
        }
    }

    async fn search(&mut self, request: &SearchRequest) -> Result<Box<dyn EntryStream>> {
        let mut state = self.state.lock().unwrap();
        state.searches.push(request.clone());

        Ok(Box::new(MockStream {
            items: state.items.iter().cloned().collect(),
        }))
    }

    async fn unbind(&mut self) {
        self.state.lock().unwrap().unbinds += 1;
    }
}

struct MockStream {
    items: VecDeque<MockItem>,
}

#[async_trait]
impl EntryStream for MockStream {
    async fn next_entry(&mut self) -> Result<Option<DirectoryEntry>> {
        match self.items.pop_front() {
            Some(MockItem::Entry(entry)) => Ok(Some(entry)),
            Some(MockItem::Fail(message)) => Err(Error::Search(message)),
            None => Ok(None),
        }
    }

    async fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A user entry shaped like an Active Directory search result
pub fn ad_user(account: &str, dn: &str) -> DirectoryEntry {
    DirectoryEntry::new(dn)
        .with_attr("distinguishedName", dn)
        .with_attr("sAMAccountName", account)
        .with_attr("displayName", &format!("{} display", account))
        .with_attr("mail", &format!("{}@corp.com", account))
        .with_attr("title", "Engineer")
}
