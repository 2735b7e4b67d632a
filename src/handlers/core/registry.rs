//! Command registry.
//!
//! The `Registry` owns the attached listeners in insertion order, keyed by
//! name with a hash fast-path, and provides command usage statistics.
//! Lookup is a linear scan; [`Registry::sort`] only changes enumeration order.

use std::cell::Cell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::listener::{ListenerHandle, validate_name};
use super::traits::{AuthorizerRef, ErrorSinkRef};
use crate::error::ListenerError;

/// Name hash function used for the fast-path comparison.
pub type NameHash = fn(&str) -> u64;

/// Default name hash.
pub fn default_name_hash(name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish()
}

struct Entry {
    hash: u64,
    name: String,
    listener: ListenerHandle,
    uses: Cell<u64>,
}

/// Registry of attached command listeners.
pub struct Registry {
    entries: Vec<Entry>,
    name_hash: NameHash,
    on_auth: Option<AuthorizerRef>,
    on_error: Option<ErrorSinkRef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_hasher(default_name_hash)
    }

    /// Create a registry with a custom name hash.
    pub fn with_hasher(name_hash: NameHash) -> Self {
        Self {
            entries: Vec::new(),
            name_hash,
            on_auth: None,
            on_error: None,
        }
    }

    /// Attach a listener under its current name.
    ///
    /// Two names collide only if both their hashes and the names themselves
    /// are equal; the hash is a fast-path.
    pub fn attach(&mut self, listener: &ListenerHandle) -> Result<(), ListenerError> {
        let name = listener.borrow().name().to_owned();
        validate_name(&name)?;

        if self.is_attached(listener) {
            return Err(ListenerError::AlreadyAttached(name));
        }

        let hash = (self.name_hash)(&name);
        if let Some(existing) = self
            .entries
            .iter()
            .find(|e| e.hash == hash && e.name == name)
        {
            return Err(ListenerError::Duplicate {
                name,
                existing: existing.name.clone(),
                hash,
            });
        }

        self.entries.push(Entry {
            hash,
            name,
            listener: Rc::clone(listener),
            uses: Cell::new(0),
        });
        Ok(())
    }

    /// Detach a listener by identity. Returns whether it was attached.
    pub fn detach(&mut self, listener: &ListenerHandle) -> bool {
        match self
            .entries
            .iter()
            .position(|e| Rc::ptr_eq(&e.listener, listener))
        {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Detach the listener attached as `name`. Returns it if found.
    pub fn detach_name(&mut self, name: &str) -> Option<ListenerHandle> {
        let idx = self.position(name)?;
        Some(self.entries.remove(idx).listener)
    }

    pub fn find_by_name(&self, name: &str) -> Option<ListenerHandle> {
        self.position(name)
            .map(|idx| Rc::clone(&self.entries[idx].listener))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn is_attached(&self, listener: &ListenerHandle) -> bool {
        self.entries
            .iter()
            .any(|e| Rc::ptr_eq(&e.listener, listener))
    }

    /// Rename a listener, re-attaching it if it was attached.
    ///
    /// If the new name is invalid or taken, nothing changes.
    pub fn rename(&mut self, listener: &ListenerHandle, name: &str) -> Result<(), ListenerError> {
        validate_name(name)?;
        let Some(idx) = self
            .entries
            .iter()
            .position(|e| Rc::ptr_eq(&e.listener, listener))
        else {
            listener.borrow_mut().set_name(name.to_owned());
            return Ok(());
        };

        let hash = (self.name_hash)(name);
        if let Some(existing) = self
            .entries
            .iter()
            .enumerate()
            .find(|(i, e)| *i != idx && e.hash == hash && e.name == name)
            .map(|(_, e)| e)
        {
            return Err(ListenerError::Duplicate {
                name: name.to_owned(),
                existing: existing.name.clone(),
                hash,
            });
        }

        let old = self.entries.remove(idx);
        listener.borrow_mut().set_name(name.to_owned());
        self.entries.push(Entry {
            hash,
            name: name.to_owned(),
            listener: old.listener,
            uses: old.uses,
        });
        Ok(())
    }

    /// Reorder by name, descending. Lookup is unaffected.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| b.name.cmp(&a.name));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attached names in enumeration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Attached listeners in enumeration order.
    pub fn listeners(&self) -> Vec<ListenerHandle> {
        self.entries
            .iter()
            .map(|e| Rc::clone(&e.listener))
            .collect()
    }

    /// Count one invocation of `name`.
    pub fn record_use(&self, name: &str) {
        if let Some(idx) = self.position(name) {
            let uses = &self.entries[idx].uses;
            uses.set(uses.get() + 1);
        }
    }

    /// Get command usage statistics.
    pub fn command_stats(&self) -> Vec<(String, u64)> {
        let mut stats: Vec<_> = self
            .entries
            .iter()
            .map(|e| (e.name.clone(), e.uses.get()))
            .filter(|(_, count)| *count > 0) // Only include used commands
            .collect();

        // Sort by usage count (descending)
        stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats
    }

    pub fn on_auth(&self) -> Option<AuthorizerRef> {
        self.on_auth.clone()
    }

    pub fn set_on_auth(&mut self, auth: Option<AuthorizerRef>) {
        self.on_auth = auth;
    }

    pub fn on_error(&self) -> Option<ErrorSinkRef> {
        self.on_error.clone()
    }

    pub fn set_on_error(&mut self, sink: Option<ErrorSinkRef>) {
        self.on_error = sink;
    }

    /// Detach everything and drop both global callbacks.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.on_auth = None;
        self.on_error = None;
    }

    fn position(&self, name: &str) -> Option<usize> {
        let hash = (self.name_hash)(name);
        self.entries
            .iter()
            .position(|e| e.hash == hash && e.name == name)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::core::listener::Listener;

    fn handle(name: &str) -> ListenerHandle {
        Listener::new(name).unwrap().into_handle()
    }

    #[test]
    fn test_attach_and_find() {
        let mut registry = Registry::new();
        let kick = handle("kick");
        registry.attach(&kick).unwrap();
        registry.attach(&handle("ban")).unwrap();
        assert_eq!(registry.len(), 2);
        let found = registry.find_by_name("kick").unwrap();
        assert!(Rc::ptr_eq(&found, &kick));
        assert!(registry.find_by_name("KICK").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = Registry::new();
        registry.attach(&handle("kick")).unwrap();
        let err = registry.attach(&handle("kick")).unwrap_err();
        assert!(matches!(err, ListenerError::Duplicate { ref existing, .. } if existing == "kick"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_attach_twice_rejected() {
        let mut registry = Registry::new();
        let kick = handle("kick");
        registry.attach(&kick).unwrap();
        assert_eq!(
            registry.attach(&kick),
            Err(ListenerError::AlreadyAttached("kick".into()))
        );
    }

    #[test]
    fn test_hash_collision_is_not_a_duplicate() {
        let mut registry = Registry::with_hasher(|_| 7);
        registry.attach(&handle("alpha")).unwrap();
        registry.attach(&handle("beta")).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("alpha"));
        assert!(registry.contains("beta"));
        assert!(registry.attach(&handle("beta")).is_err());
    }

    #[test]
    fn test_detach_is_noop_when_absent() {
        let mut registry = Registry::new();
        let kick = handle("kick");
        assert!(!registry.detach(&kick));
        assert!(registry.detach_name("kick").is_none());
        registry.attach(&kick).unwrap();
        assert!(registry.detach(&kick));
        assert!(registry.is_empty());
        assert!(!registry.is_attached(&kick));
    }

    #[test]
    fn test_sort_descending_keeps_lookup() {
        let mut registry = Registry::new();
        for name in ["bravo", "alpha", "charlie"] {
            registry.attach(&handle(name)).unwrap();
        }
        registry.sort();
        assert_eq!(registry.names(), vec!["charlie", "bravo", "alpha"]);
        assert!(registry.find_by_name("alpha").is_some());
    }

    #[test]
    fn test_rename_reattaches() {
        let mut registry = Registry::new();
        let a = handle("a");
        registry.attach(&a).unwrap();
        registry.attach(&handle("b")).unwrap();

        assert!(registry.rename(&a, "b").is_err());
        assert_eq!(a.borrow().name(), "a");
        assert!(registry.contains("a"));

        registry.rename(&a, "c").unwrap();
        assert_eq!(a.borrow().name(), "c");
        assert!(!registry.contains("a"));
        assert!(Rc::ptr_eq(&registry.find_by_name("c").unwrap(), &a));

        let loose = handle("loose");
        registry.rename(&loose, "tight").unwrap();
        assert_eq!(loose.borrow().name(), "tight");
        assert!(!registry.is_attached(&loose));
    }

    #[test]
    fn test_command_stats() {
        let mut registry = Registry::new();
        for name in ["a", "b", "c"] {
            registry.attach(&handle(name)).unwrap();
        }
        registry.record_use("b");
        registry.record_use("b");
        registry.record_use("a");
        registry.record_use("missing");
        assert_eq!(
            registry.command_stats(),
            vec![("b".to_string(), 2), ("a".to_string(), 1)]
        );
    }
}
