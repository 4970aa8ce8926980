use diesel::{
  pg::upsert::excluded,
  prelude::*,
  r2d2::{ConnectionManager, Pool},
  PgConnection,
};
use serde_json::Value;

use super::{
  apply, schema::documents, seed, Document, DocumentStore, Filter, StoreError, Upsert, ID_FIELD,
};

pub type DBConnection = PgConnection;
pub type DBPool = Pool<ConnectionManager<DBConnection>>;

embed_migrations!("migrations");

/// Documents kept as `jsonb` rows of a single `documents` table.
pub struct PgStore {
  pool: DBPool,
}

impl PgStore {
  pub fn new(pool: DBPool) -> Self {
    Self { pool }
  }

  /// Builds a pool for `database_url` and brings the schema up to date.
  pub fn connect(database_url: &str) -> Result<Self, StoreError> {
    let manager = ConnectionManager::<DBConnection>::new(database_url);
    let pool = Pool::builder().build(manager)?;
    run_migrations(&*pool.get()?)?;
    Ok(Self::new(pool))
  }
}

pub fn run_migrations(conn: &DBConnection) -> Result<(), StoreError> {
  embedded_migrations::run(conn)?;
  info!("Document store migrations applied");
  Ok(())
}

fn into_document(body: Value) -> Result<Document, StoreError> {
  match body {
    Value::Object(doc) => Ok(doc),
    other => Err(StoreError::Malformed(format!("stored body is {}", other))),
  }
}

impl DocumentStore for PgStore {
  fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError> {
    let conn = self.pool.get()?;
    let mut query = documents::table
      .select(documents::body)
      .filter(documents::collection.eq(collection))
      .order(documents::id)
      .into_boxed();
    if let Filter::Id(id) = filter {
      query = query.filter(documents::id.eq(id.clone()));
    }
    let body = query.first::<Value>(&conn).optional()?;
    body.map(into_document).transpose()
  }

  fn upsert(&self, collection: &str, id: &str, update: Upsert) -> Result<(), StoreError> {
    let conn = self.pool.get()?;
    match update {
      Upsert::Replace(mut doc) => {
        doc.insert(ID_FIELD.to_string(), id.into());
        diesel::insert_into(documents::table)
          .values((
            documents::collection.eq(collection),
            documents::id.eq(id),
            documents::body.eq(Value::Object(doc)),
          ))
          .on_conflict((documents::collection, documents::id))
          .do_update()
          .set(documents::body.eq(excluded(documents::body)))
          .execute(&conn)?;
        Ok(())
      }
      Upsert::Merge(ops) => conn.transaction::<_, StoreError, _>(|| {
        diesel::insert_into(documents::table)
          .values((
            documents::collection.eq(collection),
            documents::id.eq(id),
            documents::body.eq(Value::Object(seed(id))),
          ))
          .on_conflict_do_nothing()
          .execute(&conn)?;

        let target = documents::table
          .filter(documents::collection.eq(collection))
          .filter(documents::id.eq(id));
        let current = target
          .clone()
          .select(documents::body)
          .for_update()
          .get_result::<Value>(&conn)?;

        let mut doc = into_document(current)?;
        for op in ops {
          apply(&mut doc, op)?;
        }
        diesel::update(target)
          .set(documents::body.eq(Value::Object(doc)))
          .execute(&conn)?;
        Ok(())
      }),
    }
  }

  fn delete_many(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError> {
    let conn = self.pool.get()?;
    let in_collection = documents::table.filter(documents::collection.eq(collection));
    let deleted = match filter {
      Filter::All => diesel::delete(in_collection).execute(&conn)?,
      Filter::Id(id) => {
        diesel::delete(in_collection.filter(documents::id.eq(id.clone()))).execute(&conn)?
      }
    };
    Ok(deleted)
  }
}
