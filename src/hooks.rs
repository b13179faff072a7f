//! Post-save hooks.
//!
//! A [`HookRegistry`] holds named hooks that run after a record has been
//! inserted and its id is known. Hooks return [`AfterSaveAction`]s which the
//! connection then carries out; registration order decides both the order
//! hooks run in and the order their actions are applied.

use std::fmt;
use std::sync::Arc;

use crate::serialize::Record;
use crate::types::Value;

/// Name of the hook writing deferred LOB contents.
pub const WRITE_LOBS_HOOK: &str = "write_lobs";

/// Bytes to write into one LOB column of a saved row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobWrite {
    pub column: String,
    pub data: Vec<u8>,
}

impl LobWrite {
    pub fn new(column: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            column: column.into(),
            data: data.into(),
        }
    }
}

/// Work requested by a hook.
#[derive(Debug, Clone, PartialEq)]
pub enum AfterSaveAction {
    /// Write a LOB column of the saved row.
    WriteLob(LobWrite),
    /// Run a follow-up statement.
    Execute(String),
}

/// A post-save hook: the saved record and its id in, actions out.
pub type Hook = Arc<dyn Fn(&Record, &Value) -> Vec<AfterSaveAction> + Send + Sync>;

/// Named post-save hooks in registration order.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: Vec<(String, Hook)>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the LOB writing hook registered.
    pub fn with_lob_hook() -> Self {
        let mut registry = Self::new();
        register_lob_hook(&mut registry);
        registry
    }

    /// Register a hook. Registering a name again replaces the earlier hook
    /// in place.
    pub fn register<F>(&mut self, name: impl Into<String>, hook: F)
    where
        F: Fn(&Record, &Value) -> Vec<AfterSaveAction> + Send + Sync + 'static,
    {
        let name = name.into();
        let hook: Hook = Arc::new(hook);
        match self.hooks.iter_mut().find(|(n, _)| *n == name) {
            Some((_, h)) => *h = hook,
            None => self.hooks.push((name, hook)),
        }
    }

    /// Remove a hook. Returns whether it was registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(n, _)| n != name);
        self.hooks.len() != before
    }

    /// Registered hook names, in invocation order.
    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook and collect their actions.
    pub fn after_save(&self, record: &Record, id: &Value) -> Vec<AfterSaveAction> {
        self.hooks
            .iter()
            .flat_map(|(_, hook)| hook(record, id))
            .collect()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.names())
            .finish()
    }
}

/// LOB writes for the non-null LOB attributes of a record.
pub fn lob_writes(record: &Record) -> Vec<LobWrite> {
    record
        .attributes
        .iter()
        .filter(|(column, _)| record.column(column).is_some_and(|c| c.is_lob()))
        .filter_map(|(column, value)| {
            let data = match value {
                Value::Null => return None,
                Value::Binary(bytes) => bytes.clone(),
                Value::String(text) => text.clone().into_bytes(),
                Value::Lob(lob) => lob.as_bytes()?.to_vec(),
                other => other.to_string().into_bytes(),
            };
            Some(LobWrite::new(column.clone(), data))
        })
        .collect()
}

/// Register the [`WRITE_LOBS_HOOK`].
pub fn register_lob_hook(registry: &mut HookRegistry) {
    registry.register(WRITE_LOBS_HOOK, |record: &Record, _id: &Value| {
        lob_writes(record)
            .into_iter()
            .map(AfterSaveAction::WriteLob)
            .collect()
    });
}
