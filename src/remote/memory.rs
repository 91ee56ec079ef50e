//! In-memory object and metadata stores
//!
//! Used by the test harness and by embedders that have not wired a real
//! backend yet. Listings are returned in lexicographic key order, matching
//! the behavior of common object stores.

use crate::error::SyncError;
use crate::remote::{ContainerId, MetadataStore, ObjectStore, RepoRecord};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read};

/// In-memory implementation of [`ObjectStore`].
#[derive(Default)]
pub struct MemoryObjectStore {
    containers: RwLock<HashMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty container, replacing any existing one.
    pub fn create_container(&self, container: &ContainerId) {
        self.containers
            .write()
            .insert(container.as_str().to_string(), BTreeMap::new());
    }

    /// Seed an object directly from a byte slice.
    pub fn put_bytes(&self, container: &ContainerId, key: &str, bytes: &[u8]) {
        self.containers
            .write()
            .entry(container.as_str().to_string())
            .or_default()
            .insert(key.to_string(), bytes.to_vec());
    }

    /// Remove an object, simulating a deletion racing a listing.
    pub fn delete_object(&self, container: &ContainerId, key: &str) {
        if let Some(objects) = self.containers.write().get_mut(container.as_str()) {
            objects.remove(key);
        }
    }
}

impl ObjectStore for MemoryObjectStore {
    fn list_objects(&self, container: &ContainerId) -> Result<Vec<String>, SyncError> {
        let containers = self.containers.read();
        let objects = containers
            .get(container.as_str())
            .ok_or_else(|| SyncError::NotFound(format!("container {container}")))?;
        Ok(objects.keys().cloned().collect())
    }

    fn get_object(
        &self,
        container: &ContainerId,
        key: &str,
    ) -> Result<Box<dyn Read + Send>, SyncError> {
        let containers = self.containers.read();
        let objects = containers
            .get(container.as_str())
            .ok_or_else(|| SyncError::remote_fetch(key, format!("no such container {container}")))?;
        let bytes = objects
            .get(key)
            .ok_or_else(|| SyncError::remote_fetch(key, "no such object"))?
            .clone();
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn put_object(
        &self,
        container: &ContainerId,
        key: &str,
        body: &mut dyn Read,
    ) -> Result<(), SyncError> {
        let mut bytes = Vec::new();
        body.read_to_end(&mut bytes)
            .map_err(|e| SyncError::remote_fetch(key, format!("failed to drain body: {e}")))?;
        let mut containers = self.containers.write();
        let objects = containers
            .get_mut(container.as_str())
            .ok_or_else(|| SyncError::remote_fetch(key, format!("no such container {container}")))?;
        objects.insert(key.to_string(), bytes);
        Ok(())
    }
}

/// In-memory implementation of [`MetadataStore`].
#[derive(Default)]
pub struct MemoryMetadataStore {
    records: RwLock<HashMap<String, RepoRecord>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: RepoRecord) {
        self.records.write().insert(record.id.clone(), record);
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn repository(&self, id: &str) -> Result<Option<RepoRecord>, SyncError> {
        Ok(self.records.read().get(id).cloned())
    }

    fn repositories(&self) -> Result<Vec<RepoRecord>, SyncError> {
        let mut records: Vec<_> = self.records.read().values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }
}
