use juniper::FieldResult;

use super::{
  query::{Course, Lesson, Step},
  GQLContext,
};
use crate::{db::ID_FIELD, CWError};

pub mod course;
pub mod lesson;
pub mod progress;

use lesson::{NewLesson, StepInput};

/// Ids become document keys and progress path segments.
pub(crate) fn validate_id(name: &str, value: &str) -> Result<(), CWError> {
  if value.is_empty() {
    return Err(CWError::InvalidArgument(format!("{} must not be empty", name)));
  }
  if value == ID_FIELD {
    return Err(CWError::InvalidArgument(format!(
      "{} must not be the reserved {}",
      name, ID_FIELD
    )));
  }
  // Keeps `courseId--id` lesson keys unambiguous.
  if value.contains(lesson::KEY_SEPARATOR) || value.starts_with('-') || value.ends_with('-') {
    return Err(CWError::InvalidArgument(format!(
      "{} must not contain {} nor start or end with -",
      name,
      lesson::KEY_SEPARATOR
    )));
  }
  Ok(())
}

pub struct Mutation;

#[juniper::object(Context = GQLContext)]
impl Mutation {
  fn create_course(
    ctx: &GQLContext,
    id: String,
    name: String,
    position: i32,
  ) -> FieldResult<Course> {
    course::create_course(ctx.store(), &ctx.principal, id, name, position)
      .map_err(CWError::into_field_error)
  }

  fn remove_course(ctx: &GQLContext, id: String) -> FieldResult<bool> {
    course::remove_course(ctx.store(), &ctx.principal, &id).map_err(CWError::into_field_error)
  }

  fn create_lesson(
    ctx: &GQLContext,
    course_id: String,
    id: String,
    name: String,
    intro: String,
    position: i32,
    steps: Option<Vec<StepInput>>,
  ) -> FieldResult<Lesson> {
    let new = NewLesson {
      course_id,
      id,
      name,
      intro,
      position,
      steps: steps.unwrap_or_default(),
    };
    lesson::create_lesson(ctx.store(), &ctx.principal, new).map_err(CWError::into_field_error)
  }

  fn remove_lesson(ctx: &GQLContext, course_id: String, id: String) -> FieldResult<bool> {
    lesson::remove_lesson(ctx.store(), &ctx.principal, &course_id, &id)
      .map_err(CWError::into_field_error)
  }

  /// Removes every course and lesson
  fn remove_all(ctx: &GQLContext) -> FieldResult<bool> {
    course::remove_all(ctx.store(), &ctx.principal).map_err(CWError::into_field_error)
  }

  /// Mark a given step in a lesson as visited
  fn mark_visited(
    ctx: &GQLContext,
    course_id: String,
    lesson_id: String,
    step_id: String,
  ) -> FieldResult<bool> {
    progress::mark_visited(ctx.store(), &ctx.principal, &course_id, &lesson_id, &step_id)
      .map_err(CWError::into_field_error)
  }

  /// Submit an answer to a multiple choice step
  fn submit_answer(
    ctx: &GQLContext,
    course_id: String,
    lesson_id: String,
    step_id: String,
    answer: String,
  ) -> FieldResult<Step> {
    progress::submit_answer(
      ctx.store(),
      &ctx.principal,
      ctx.resubmission,
      &course_id,
      &lesson_id,
      &step_id,
      answer,
    )
    .map_err(CWError::into_field_error)
  }
}
