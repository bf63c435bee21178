//! Run configuration.
//!
//! A [`RunConfig`] is created by the caller for one validation call and lent
//! to every step of the run.

use crate::{MessageCatalog, MessageSource, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Options for a single validation call.
#[derive(Debug, Default, Clone)]
pub struct RunConfig {
    /// Stop the whole run after the first issue
    pub abort_early: bool,

    /// Stop only the current pipe after its first issue
    pub abort_pipe_early: bool,

    /// Language tag used to pick catalog messages
    pub lang: Option<String>,

    /// Message used when a step carries none of its own
    pub message: Option<MessageSource>,

    /// Host-registered messages
    pub messages: Option<Arc<MessageCatalog>>,

    /// Host-supplied data shared between custom steps
    pub context: RunContext,
}

impl RunConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets abort-early mode.
    pub fn with_abort_early(mut self, abort_early: bool) -> Self {
        self.abort_early = abort_early;
        self
    }

    /// Sets abort-pipe-early mode.
    pub fn with_abort_pipe_early(mut self, abort_pipe_early: bool) -> Self {
        self.abort_pipe_early = abort_pipe_early;
        self
    }

    /// Sets the language tag.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Sets the config-level message.
    pub fn with_message(mut self, message: impl Into<MessageSource>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches a message catalog.
    pub fn with_messages(mut self, catalog: MessageCatalog) -> Self {
        self.messages = Some(Arc::new(catalog));
        self
    }

    /// Seeds a context entry.
    pub fn with_context(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key, value);
        self
    }
}

/// Mutable key/value store for custom steps.
///
/// Clones share the same underlying map, so a caller can keep a handle and
/// read what the steps of a run recorded.
#[derive(Debug, Default, Clone)]
pub struct RunContext {
    entries: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl RunContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, returning the previous one.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.lock().insert(key.into(), value.into())
    }

    /// Returns a copy of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    /// Returns a copy of every entry.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        // A panicking custom step must not make the context unreadable.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
