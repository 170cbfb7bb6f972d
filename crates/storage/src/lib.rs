//! Tab-scoped key/value storage carrying the pending registration between pages.

use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use shared::domain::{mask_sensitive, PendingRegistration};
use tracing::debug;

pub const ADMIN_EMAIL_KEY: &str = "adminEmail";
pub const ADMIN_NAME_KEY: &str = "adminName";
pub const ADMIN_PASSWORD_KEY: &str = "adminPassword";

/// String key/value store whose lifetime is one browsing session.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.write().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.write().remove(key);
    }

    fn clear(&self) {
        self.write().clear();
    }
}

/// Writes all three fields together.
pub fn save_pending(store: &dyn SessionStore, pending: &PendingRegistration) {
    store.set(ADMIN_EMAIL_KEY, &pending.email);
    store.set(ADMIN_NAME_KEY, &pending.name);
    store.set(ADMIN_PASSWORD_KEY, &pending.password);
    debug!(
        email = %mask_sensitive(&pending.email),
        "stored pending registration"
    );
}

/// Reads all three fields together. A missing or empty key means the session is gone.
pub fn load_pending(store: &dyn SessionStore) -> Option<PendingRegistration> {
    let pending = PendingRegistration::new(
        store.get(ADMIN_EMAIL_KEY)?,
        store.get(ADMIN_NAME_KEY)?,
        store.get(ADMIN_PASSWORD_KEY)?,
    );
    pending.is_complete().then_some(pending)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
