use crate::error::Result;
use crate::node::NodeTree;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Lowered templates keyed by the hash of their name and IR source.
///
/// Readers share a lock; a miss lowers outside the lock and the first writer
/// wins, so every caller ends up with the same `Arc<NodeTree>`.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: RwLock<HashMap<String, Arc<NodeTree>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute_hash(name: &str, source: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn get(&self, name: &str, source: &str) -> Option<Arc<NodeTree>> {
        let hash = Self::compute_hash(name, source);
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&hash)
            .cloned()
    }

    pub fn get_or_load(&self, name: &str, source: &str) -> Result<Arc<NodeTree>> {
        let hash = Self::compute_hash(name, source);
        if let Some(tree) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&hash)
        {
            return Ok(tree.clone());
        }

        let tree = Arc::new(NodeTree::from_json(name, source)?);
        debug!(template = %name, nodes = tree.len(), "cached template");

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.entry(hash).or_insert(tree).clone())
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
