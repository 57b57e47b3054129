use crate::storage::{Store, Tree};
use anyhow::Result;
use docret_core::models::Document;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Document registry keyed by numeric id, with a secondary owner index.
///
/// Document ids are monotonic and never reused within one store, including
/// across reopen.
pub struct DocumentStore {
    documents_tree: Tree,
    owner_docs_tree: Tree,
    next_id: AtomicU64,
}

impl DocumentStore {
    pub fn new(store: &Store) -> Result<Self> {
        let documents_tree = store.open_tree("documents")?;
        let owner_docs_tree = store.open_tree("owner_documents")?;

        // Initialize next_id
        let last_id = documents_tree
            .last()?
            .map(|(k, _)| u64::from_be_bytes(k.as_slice().try_into().unwrap()))
            .unwrap_or(0);

        Ok(Self {
            documents_tree,
            owner_docs_tree,
            next_id: AtomicU64::new(last_id + 1),
        })
    }

    pub fn create(&self, owner_id: &str, title: &str) -> Result<Document> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let document = Document {
            id,
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            created_at,
            processed: false,
        };

        let bytes = bincode::serialize(&document)?;
        self.documents_tree.insert(id.to_be_bytes(), bytes)?;
        self.add_to_owner_index(owner_id, id)?;
        Ok(document)
    }

    pub fn get(&self, id: u64) -> Result<Option<Document>> {
        if let Some(bytes) = self.documents_tree.get(id.to_be_bytes())? {
            let document: Document = bincode::deserialize(&bytes)?;
            Ok(Some(document))
        } else {
            Ok(None)
        }
    }

    pub fn contains(&self, id: u64) -> Result<bool> {
        self.documents_tree.contains_key(id.to_be_bytes())
    }

    pub fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Document>> {
        let ids: Vec<u64> = if let Some(bytes) = self.owner_docs_tree.get(owner_id.as_bytes())? {
            bincode::deserialize(&bytes)?
        } else {
            Vec::new()
        };

        let mut documents = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(document) = self.get(id)? {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    /// Mark the outcome of the last ingestion pass. No-op for unknown ids.
    pub fn set_processed(&self, id: u64, processed: bool) -> Result<()> {
        if let Some(mut document) = self.get(id)? {
            document.processed = processed;
            let bytes = bincode::serialize(&document)?;
            self.documents_tree.insert(id.to_be_bytes(), bytes)?;
        }
        Ok(())
    }

    /// Remove a document and its owner index entry. Returns the removed
    /// document, `None` if the id was unknown.
    pub fn delete(&self, id: u64) -> Result<Option<Document>> {
        if let Some(bytes) = self.documents_tree.remove(id.to_be_bytes())? {
            let document: Document = bincode::deserialize(&bytes)?;
            self.remove_from_owner_index(&document.owner_id, id)?;
            Ok(Some(document))
        } else {
            Ok(None)
        }
    }

    pub fn count(&self) -> Result<usize> {
        let mut count = 0;
        for item in self.documents_tree.iter() {
            item?;
            count += 1;
        }
        Ok(count)
    }

    fn add_to_owner_index(&self, owner_id: &str, document_id: u64) -> Result<()> {
        let key = owner_id.as_bytes();
        let mut ids: Vec<u64> = if let Some(bytes) = self.owner_docs_tree.get(key)? {
            bincode::deserialize(&bytes)?
        } else {
            Vec::new()
        };

        if !ids.contains(&document_id) {
            ids.push(document_id);
            let bytes = bincode::serialize(&ids)?;
            self.owner_docs_tree.insert(key, bytes)?;
        }
        Ok(())
    }

    fn remove_from_owner_index(&self, owner_id: &str, document_id: u64) -> Result<()> {
        let key = owner_id.as_bytes();
        if let Some(bytes) = self.owner_docs_tree.get(key)? {
            let mut ids: Vec<u64> = bincode::deserialize(&bytes)?;
            ids.retain(|id| *id != document_id);
            if ids.is_empty() {
                let _ = self.owner_docs_tree.remove(key)?;
            } else {
                let bytes = bincode::serialize(&ids)?;
                self.owner_docs_tree.insert(key, bytes)?;
            }
        }
        Ok(())
    }
}
