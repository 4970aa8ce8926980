use crate::{
  db::{from_document, to_document, DocumentStore, Filter, StoreError, Upsert},
  graphql::{guard::Principal, mutations::lesson, query::Course},
  CWError,
};

use super::validate_id;

pub const COLLECTION: &str = "courses";

pub fn find_course(store: &dyn DocumentStore, id: &str) -> Result<Option<Course>, CWError> {
  match store.find_one(COLLECTION, &Filter::id(id))? {
    Some(doc) => Ok(Some(from_document(doc)?)),
    None => Ok(None),
  }
}

/// Creates the course, or replaces every field of an existing one with the same id.
pub fn create_course(
  store: &dyn DocumentStore,
  principal: &Principal,
  id: String,
  name: String,
  position: i32,
) -> Result<Course, CWError> {
  principal.require_admin()?;
  validate_id("id", &id)?;

  let course = Course { id, name, position };
  store.upsert(COLLECTION, &course.id, Upsert::Replace(to_document(&course)?))?;
  info!("Stored course {}", course.id);

  find_course(store, &course.id)?.ok_or_else(|| {
    CWError::Store(StoreError::Missing {
      collection: COLLECTION.to_string(),
      id: course.id.clone(),
    })
  })
}

pub fn remove_course(
  store: &dyn DocumentStore,
  principal: &Principal,
  id: &str,
) -> Result<bool, CWError> {
  principal.require_admin()?;
  let removed = store.delete_many(COLLECTION, &Filter::id(id))?;
  info!("Removed course {} ({} document(s))", id, removed);
  Ok(true)
}

/// Drops every course and lesson. Learner progress is left in place.
pub fn remove_all(store: &dyn DocumentStore, principal: &Principal) -> Result<bool, CWError> {
  principal.require_admin()?;
  let courses = store.delete_many(COLLECTION, &Filter::All)?;
  let lessons = store.delete_many(lesson::COLLECTION, &Filter::All)?;
  warn!("Removed all content: {} course(s), {} lesson(s)", courses, lessons);
  Ok(true)
}
