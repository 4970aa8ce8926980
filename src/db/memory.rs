use std::{
  collections::{BTreeMap, HashMap},
  sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
  },
};

use super::{apply, seed, Document, DocumentStore, Filter, StoreError, Upsert, ID_FIELD};

type Collection = BTreeMap<String, Document>;

/// Process-local store. Progress kept here is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
  collections: Mutex<HashMap<String, Collection>>,
  writes: AtomicUsize,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of mutating calls served so far.
  pub fn writes(&self) -> usize {
    self.writes.load(Ordering::SeqCst)
  }

  pub fn len(&self, collection: &str) -> usize {
    self
      .collections
      .lock()
      .map(|c| c.get(collection).map_or(0, BTreeMap::len))
      .unwrap_or(0)
  }
}

impl DocumentStore for MemoryStore {
  fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError> {
    let collections = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
    let docs = match collections.get(collection) {
      Some(docs) => docs,
      None => return Ok(None),
    };
    Ok(match filter {
      Filter::All => docs.values().next().cloned(),
      Filter::Id(id) => docs.get(id).cloned(),
    })
  }

  fn upsert(&self, collection: &str, id: &str, update: Upsert) -> Result<(), StoreError> {
    let mut collections = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
    self.writes.fetch_add(1, Ordering::SeqCst);
    let docs = collections.entry(collection.to_string()).or_default();
    match update {
      Upsert::Replace(mut doc) => {
        doc.insert(ID_FIELD.to_string(), id.into());
        docs.insert(id.to_string(), doc);
      }
      Upsert::Merge(ops) => {
        // Work on a copy so a failing op leaves the stored document as it was.
        let mut doc = docs.get(id).cloned().unwrap_or_else(|| seed(id));
        for op in ops {
          apply(&mut doc, op)?;
        }
        docs.insert(id.to_string(), doc);
      }
    }
    Ok(())
  }

  fn delete_many(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError> {
    let mut collections = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
    self.writes.fetch_add(1, Ordering::SeqCst);
    let docs = match collections.get_mut(collection) {
      Some(docs) => docs,
      None => return Ok(0),
    };
    Ok(match filter {
      Filter::All => {
        let count = docs.len();
        docs.clear();
        count
      }
      Filter::Id(id) => docs.remove(id).map_or(0, |_| 1),
    })
  }
}
