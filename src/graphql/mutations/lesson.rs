use std::collections::HashSet;

use crate::{
  db::{from_document, to_document, DocumentStore, Filter, StoreError, Upsert},
  graphql::{
    guard::Principal,
    query::{Lesson, Step, MCQ},
  },
  CWError,
};

use super::validate_id;

pub const COLLECTION: &str = "lessons";

#[derive(GraphQLInputObject, Clone, Debug)]
pub struct StepInput {
  id: String,
  #[graphql(name = "type")]
  kind: String,
  points: f64,
  text: Option<String>,
  options: Option<Vec<String>>,
  correct_answer: Option<String>,
}

impl StepInput {
  pub fn new<S: Into<String>>(id: S, kind: S, points: f64) -> Self {
    StepInput {
      id: id.into(),
      kind: kind.into(),
      points,
      text: None,
      options: None,
      correct_answer: None,
    }
  }

  pub fn mcq<S: Into<String>>(id: S, points: f64, options: Vec<String>, correct: S) -> Self {
    StepInput {
      options: Some(options),
      correct_answer: Some(correct.into()),
      ..StepInput::new(id.into(), MCQ.to_string(), points)
    }
  }
}

impl From<StepInput> for Step {
  fn from(input: StepInput) -> Step {
    Step {
      id: input.id,
      kind: input.kind,
      points: input.points,
      text: input.text,
      options: input.options,
      correct_answer: input.correct_answer,
      given_answer: None,
    }
  }
}

#[derive(Clone, Debug)]
pub struct NewLesson {
  pub course_id: String,
  pub id: String,
  pub name: String,
  pub intro: String,
  pub position: i32,
  pub steps: Vec<StepInput>,
}

pub const KEY_SEPARATOR: &str = "--";

/// Canonical key of a lesson document.
pub fn composite_id(course_id: &str, id: &str) -> String {
  format!("{}{}{}", course_id, KEY_SEPARATOR, id)
}

pub fn find_lesson(
  store: &dyn DocumentStore,
  course_id: &str,
  id: &str,
) -> Result<Option<Lesson>, CWError> {
  let doc = match store.find_one(COLLECTION, &Filter::Id(composite_id(course_id, id)))? {
    Some(doc) => doc,
    None => return Ok(None),
  };
  let lesson: Lesson = from_document(doc)?;
  // Keys written before separators were rejected can still collide.
  if lesson.course_id != course_id || lesson.id != id {
    warn!(
      "Lesson key {} belongs to {}/{}",
      lesson.composite_id, lesson.course_id, lesson.id
    );
    return Ok(None);
  }
  Ok(Some(lesson))
}

fn validate_steps(steps: &[StepInput]) -> Result<(), CWError> {
  let mut seen = HashSet::new();
  for step in steps {
    if !seen.insert(step.id.as_str()) {
      return Err(CWError::InvalidArgument(format!(
        "step id {} is used more than once",
        step.id
      )));
    }
    if step.kind == MCQ && step.correct_answer.is_none() {
      return Err(CWError::InvalidArgument(format!(
        "mcq step {} has no correctAnswer",
        step.id
      )));
    }
  }
  Ok(())
}

/// Creates the lesson, or replaces an existing one wholesale, steps included.
pub fn create_lesson(
  store: &dyn DocumentStore,
  principal: &Principal,
  new: NewLesson,
) -> Result<Lesson, CWError> {
  principal.require_admin()?;
  validate_id("courseId", &new.course_id)?;
  validate_id("id", &new.id)?;
  validate_steps(&new.steps)?;

  let lesson = Lesson {
    composite_id: composite_id(&new.course_id, &new.id),
    course_id: new.course_id,
    id: new.id,
    name: new.name,
    intro: new.intro,
    position: new.position,
    steps: new.steps.into_iter().map(Step::from).collect(),
  };
  store.upsert(
    COLLECTION,
    &lesson.composite_id,
    Upsert::Replace(to_document(&lesson)?),
  )?;
  info!(
    "Stored lesson {} with {} step(s)",
    lesson.composite_id,
    lesson.steps.len()
  );

  find_lesson(store, &lesson.course_id, &lesson.id)?.ok_or_else(|| {
    CWError::Store(StoreError::Missing {
      collection: COLLECTION.to_string(),
      id: lesson.composite_id.clone(),
    })
  })
}

pub fn remove_lesson(
  store: &dyn DocumentStore,
  principal: &Principal,
  course_id: &str,
  id: &str,
) -> Result<bool, CWError> {
  principal.require_admin()?;
  if find_lesson(store, course_id, id)?.is_none() {
    return Ok(true);
  }
  let key = composite_id(course_id, id);
  let removed = store.delete_many(COLLECTION, &Filter::Id(key.clone()))?;
  info!("Removed lesson {} ({} document(s))", key, removed);
  Ok(true)
}
