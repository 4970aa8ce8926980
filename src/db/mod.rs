use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::{error, fmt};

pub mod memory;
pub mod pg;
pub mod schema;

pub use memory::MemoryStore;
pub use pg::PgStore;

pub type Document = Map<String, Value>;

/// Field holding the canonical key of every stored document.
pub const ID_FIELD: &str = "_id";

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
  All,
  Id(String),
}

impl Filter {
  pub fn id<S: Into<String>>(id: S) -> Self {
    Filter::Id(id.into())
  }
}

/// A single change applied at a nested path inside a document.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldOp {
  Set(Vec<String>, Value),
  Push(Vec<String>, Value),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Upsert {
  /// Overwrites the whole document.
  Replace(Document),
  /// Applies each op in order, leaving every other field untouched.
  Merge(Vec<FieldOp>),
}

/// Key/document storage split into named collections.
///
/// Implementations must apply an `Upsert` to a single document atomically, so that
/// concurrent merges on disjoint paths of the same document never lose each other's
/// fields.
pub trait DocumentStore: Send + Sync {
  fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError>;

  fn upsert(&self, collection: &str, id: &str, update: Upsert) -> Result<(), StoreError>;

  fn delete_many(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
  Database(diesel::result::Error),
  Pool(diesel::r2d2::PoolError),
  Migration(diesel_migrations::RunMigrationsError),
  Document(serde_json::Error),
  PathConflict(String),
  Malformed(String),
  Missing { collection: String, id: String },
  Poisoned,
}

impl fmt::Display for StoreError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      StoreError::Database(ref err) => write!(f, "Database error: {}", err),
      StoreError::Pool(ref err) => write!(f, "Connection pool error: {}", err),
      StoreError::Migration(ref err) => write!(f, "Migration error: {}", err),
      StoreError::Document(ref err) => write!(f, "Document error: {}", err),
      StoreError::PathConflict(ref path) => write!(f, "Cannot write through field {}", path),
      StoreError::Malformed(ref what) => write!(f, "Malformed document: {}", what),
      StoreError::Missing {
        ref collection,
        ref id,
      } => write!(f, "Document {} missing from {}", id, collection),
      StoreError::Poisoned => write!(f, "Store lock poisoned"),
    }
  }
}

impl error::Error for StoreError {
  fn cause(&self) -> Option<&(dyn error::Error)> {
    match *self {
      StoreError::Database(ref err) => Some(err),
      StoreError::Pool(ref err) => Some(err),
      StoreError::Migration(ref err) => Some(err),
      StoreError::Document(ref err) => Some(err),
      _ => None,
    }
  }
}

impl From<diesel::result::Error> for StoreError {
  fn from(err: diesel::result::Error) -> StoreError {
    StoreError::Database(err)
  }
}

impl From<diesel::r2d2::PoolError> for StoreError {
  fn from(err: diesel::r2d2::PoolError) -> StoreError {
    StoreError::Pool(err)
  }
}

impl From<diesel_migrations::RunMigrationsError> for StoreError {
  fn from(err: diesel_migrations::RunMigrationsError) -> StoreError {
    StoreError::Migration(err)
  }
}

impl From<serde_json::Error> for StoreError {
  fn from(err: serde_json::Error) -> StoreError {
    StoreError::Document(err)
  }
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
  match serde_json::to_value(value)? {
    Value::Object(doc) => Ok(doc),
    other => Err(StoreError::Malformed(format!("expected an object, got {}", other))),
  }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
  Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Starts an empty document carrying only its key.
pub fn seed(id: &str) -> Document {
  let mut doc = Document::new();
  doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
  doc
}

/// Applies a merge op to `doc`, creating intermediate objects along the path.
pub fn apply(doc: &mut Document, op: FieldOp) -> Result<(), StoreError> {
  let (path, value, push) = match op {
    FieldOp::Set(path, value) => (path, value, false),
    FieldOp::Push(path, value) => (path, value, true),
  };
  let (last, parents) = path
    .split_last()
    .ok_or_else(|| StoreError::PathConflict(String::new()))?;

  let mut target = doc;
  for (depth, segment) in parents.iter().enumerate() {
    let slot = target
      .entry(segment.clone())
      .or_insert_with(|| Value::Object(Document::new()));
    target = match slot {
      Value::Object(inner) => inner,
      _ => return Err(StoreError::PathConflict(path[..=depth].join("."))),
    };
  }

  if !push {
    target.insert(last.clone(), value);
    return Ok(());
  }
  match target
    .entry(last.clone())
    .or_insert_with(|| Value::Array(vec![]))
  {
    Value::Array(items) => {
      items.push(value);
      Ok(())
    }
    _ => Err(StoreError::PathConflict(path.join("."))),
  }
}
