/// In-memory store collaborators
///
/// Local stand-ins for the managed document store, blob store, and auth
/// backend. The `serve` mode uses them so the functions can run without
/// cloud credentials, and the tests use them to observe mutation order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::account::{AuthStore, BlobStore, DocumentStore, StoreError};

#[derive(Default)]
pub struct MemoryDocumentStore {
    /// Subcollection documents keyed by "uid/collection"
    subcollections: Mutex<HashMap<String, Vec<String>>>,
    users: Mutex<HashSet<String>>,
    schedules: Mutex<HashMap<String, (DateTime<Utc>, String)>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_user(&self, uid: &str) {
        self.users.lock().unwrap().insert(uid.to_string());
    }

    pub fn seed_subcollection(&self, uid: &str, name: &str, count: usize) {
        let docs = (0..count).map(|i| format!("{}-{}", name, i)).collect();
        self.subcollections
            .lock()
            .unwrap()
            .insert(format!("{}/{}", uid, name), docs);
    }

    pub fn user_exists(&self, uid: &str) -> bool {
        self.users.lock().unwrap().contains(uid)
    }

    pub fn subcollection_len(&self, uid: &str, name: &str) -> usize {
        self.subcollections
            .lock()
            .unwrap()
            .get(&format!("{}/{}", uid, name))
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn deletion_schedule(&self, uid: &str) -> Option<(DateTime<Utc>, String)> {
        self.schedules.lock().unwrap().get(uid).cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn delete_subcollection(&self, uid: &str, name: &str) -> Result<usize, StoreError> {
        let removed = self
            .subcollections
            .lock()
            .unwrap()
            .remove(&format!("{}/{}", uid, name))
            .map(|docs| docs.len())
            .unwrap_or(0);
        Ok(removed)
    }

    async fn delete_user_document(&self, uid: &str) -> Result<(), StoreError> {
        if !self.users.lock().unwrap().remove(uid) {
            return Err(StoreError(format!("no user document for {}", uid)));
        }
        Ok(())
    }

    async fn set_deletion_schedule(
        &self,
        uid: &str,
        scheduled_for: DateTime<Utc>,
        status: &str,
    ) -> Result<(), StoreError> {
        if !self.users.lock().unwrap().contains(uid) {
            return Err(StoreError(format!("no user document for {}", uid)));
        }
        self.schedules
            .lock()
            .unwrap()
            .insert(uid.to_string(), (scheduled_for, status.to_string()));
        Ok(())
    }
}

pub struct MemoryBlobStore {
    objects: Mutex<HashSet<String>>,
    fail: bool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        MemoryBlobStore {
            objects: Mutex::new(HashSet::new()),
            fail: false,
        }
    }

    /// A store whose deletions always fail, for the partial-failure policy
    pub fn failing() -> Self {
        MemoryBlobStore {
            objects: Mutex::new(HashSet::new()),
            fail: true,
        }
    }

    pub fn seed_object(&self, path: &str) {
        self.objects.lock().unwrap().insert(path.to_string());
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        if self.fail {
            return Err(StoreError("simulated storage outage".to_string()));
        }
        let mut objects = self.objects.lock().unwrap();
        let matching: Vec<String> = objects
            .iter()
            .filter(|path| path.starts_with(prefix))
            .cloned()
            .collect();
        for path in &matching {
            objects.remove(path);
        }
        Ok(matching.len())
    }
}

#[derive(Default)]
pub struct MemoryAuthStore {
    identities: Mutex<HashSet<String>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_identity(&self, uid: &str) {
        self.identities.lock().unwrap().insert(uid.to_string());
    }

    pub fn identity_exists(&self, uid: &str) -> bool {
        self.identities.lock().unwrap().contains(uid)
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn delete_identity(&self, uid: &str) -> Result<(), StoreError> {
        if !self.identities.lock().unwrap().remove(uid) {
            return Err(StoreError(format!("no identity for {}", uid)));
        }
        Ok(())
    }
}
