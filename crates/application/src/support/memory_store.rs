//! In-memory credential store with a separate durable snapshot.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use acctl_domain::CredentialContext;

use crate::ports::{CredentialStore, CredentialStoreError};

/// Credential store held entirely in memory.
///
/// `upsert` changes the working set; `persist` copies it into a snapshot that
/// stands in for durable storage. A persist failure can be injected to
/// exercise the fatal-after-rotation path.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    current: Option<String>,
    contexts: BTreeMap<String, CredentialContext>,
    durable: Mutex<BTreeMap<String, CredentialContext>>,
    persist_count: AtomicUsize,
    persist_failure: Option<String>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding a single context, marked current.
    #[must_use]
    pub fn single(context: CredentialContext) -> Self {
        Self::new().with_context(context)
    }

    /// Adds a context. The first context added becomes current.
    #[must_use]
    pub fn with_context(mut self, context: CredentialContext) -> Self {
        if self.current.is_none() {
            self.current = Some(context.context_name.clone());
        }
        if let Ok(durable) = self.durable.get_mut() {
            durable.insert(context.context_name.clone(), context.clone());
        }
        self.contexts.insert(context.context_name.clone(), context);
        self
    }

    /// Marks a context as current.
    #[must_use]
    pub fn with_current(mut self, name: impl Into<String>) -> Self {
        self.current = Some(name.into());
        self
    }

    /// Makes every `persist` call fail with the given reason.
    #[must_use]
    pub fn failing_persist(mut self, reason: impl Into<String>) -> Self {
        self.persist_failure = Some(reason.into());
        self
    }

    /// Returns the last persisted record for a context.
    #[must_use]
    pub fn persisted(&self, name: &str) -> Option<CredentialContext> {
        self.durable
            .lock()
            .ok()
            .and_then(|durable| durable.get(name).cloned())
    }

    /// Number of successful `persist` calls.
    #[must_use]
    pub fn persist_count(&self) -> usize {
        self.persist_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    fn current_context(&self) -> Option<String> {
        self.current.clone()
    }

    fn resolve(&self, name: Option<&str>) -> Result<CredentialContext, CredentialStoreError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self
                .current
                .clone()
                .ok_or(CredentialStoreError::NoCurrentContext)?,
        };
        self.contexts
            .get(&name)
            .cloned()
            .ok_or(CredentialStoreError::ContextNotFound(name))
    }

    fn upsert(&mut self, record: &CredentialContext) -> Result<(), CredentialStoreError> {
        self.contexts
            .insert(record.context_name.clone(), record.clone());
        Ok(())
    }

    async fn persist(&self) -> Result<(), CredentialStoreError> {
        if let Some(reason) = &self.persist_failure {
            return Err(CredentialStoreError::Io(std::io::Error::other(reason.clone())));
        }
        let mut durable = self
            .durable
            .lock()
            .map_err(|_| CredentialStoreError::Io(std::io::Error::other("store lock poisoned")))?;
        *durable = self.contexts.clone();
        drop(durable);
        self.persist_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
