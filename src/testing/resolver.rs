//! Scriptable URL signer

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::ResolveError;
use crate::resolver::{SignedUrl, SignedUrlResolver};

#[derive(Debug, Default)]
struct Inner {
    urls: HashMap<String, String>,
    failing: HashSet<String>,
    calls: Vec<String>,
    held: HashMap<String, Arc<Notify>>,
}

/// Resolver returning `https://signed/<id>` unless told otherwise
#[derive(Debug, Default)]
pub struct MockResolver {
    inner: Mutex<Inner>,
}

impl MockResolver {
    /// Create a resolver with default behavior
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return `url` for `brief_id`; an empty string simulates a missing URL
    pub fn set_url(&self, brief_id: impl Into<String>, url: impl Into<String>) {
        self.lock().urls.insert(brief_id.into(), url.into());
    }

    /// Make resolution of `brief_id` fail
    pub fn fail(&self, brief_id: impl Into<String>) {
        self.lock().failing.insert(brief_id.into());
    }

    /// Block resolution of `brief_id` until the gate is notified
    #[must_use]
    pub fn hold(&self, brief_id: impl Into<String>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().held.insert(brief_id.into(), Arc::clone(&gate));
        gate
    }

    /// Ids resolved so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }
}

#[async_trait]
impl SignedUrlResolver for MockResolver {
    async fn resolve(&self, master_brief_id: &str) -> Result<SignedUrl, ResolveError> {
        let gate = {
            let mut inner = self.lock();
            inner.calls.push(master_brief_id.to_string());
            inner.held.remove(master_brief_id)
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let inner = self.lock();
        if inner.failing.contains(master_brief_id) {
            return Err(ResolveError::NotFound(master_brief_id.to_string()));
        }
        Ok(SignedUrl::new(
            inner
                .urls
                .get(master_brief_id)
                .cloned()
                .unwrap_or_else(|| format!("https://signed/{master_brief_id}")),
        ))
    }
}
