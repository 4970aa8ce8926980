use chrono::{DateTime, Utc};
use juniper::FieldResult;
use serde_json::Value;

use crate::{
  db::{Document, StoreError, ID_FIELD},
  graphql::{
    mutations::{course, lesson, progress},
    GQLContext,
  },
  CWError,
};

/// Step type graded automatically on submission.
pub const MCQ: &str = "mcq";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, GraphQLObject)]
pub struct Course {
  #[serde(rename = "_id")]
  pub id: String,
  pub name: String,
  pub position: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, GraphQLObject)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
  #[serde(rename = "_id")]
  pub composite_id: String,
  pub course_id: String,
  pub id: String,
  pub name: String,
  pub intro: String,
  pub position: i32,
  #[serde(default)]
  pub steps: Vec<Step>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, GraphQLObject)]
#[serde(rename_all = "camelCase")]
pub struct Step {
  pub id: String,
  #[serde(rename = "type")]
  #[graphql(name = "type")]
  pub kind: String,
  pub points: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub text: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub options: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub correct_answer: Option<String>,
  /// Only set on the value returned by `submitAnswer`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub given_answer: Option<String>,
}

impl Step {
  pub fn is_mcq(&self) -> bool {
    self.kind == MCQ
  }
}

impl Lesson {
  /// The lesson as learners may see it, with no mcq answers.
  pub fn without_answers(mut self) -> Lesson {
    for step in &mut self.steps {
      step.correct_answer = None;
    }
    self
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, GraphQLObject)]
#[serde(rename_all = "camelCase")]
pub struct AnswerAttempt {
  pub given_answer: String,
  pub is_correct_answer: bool,
  pub answered_at: DateTime<Utc>,
}

/// What a learner has done with one step. Fields accumulate across `markVisited`
/// and `submitAnswer`; the type and points are copied from the step at write time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, GraphQLObject)]
#[serde(rename_all = "camelCase")]
pub struct StepProgress {
  #[serde(skip)]
  pub course_id: String,
  #[serde(skip)]
  pub lesson_id: String,
  #[serde(skip)]
  pub step_id: String,
  #[serde(default)]
  pub visited: bool,
  pub visited_at: Option<DateTime<Utc>>,
  #[serde(rename = "type")]
  #[graphql(name = "type")]
  pub kind: Option<String>,
  pub points: Option<f64>,
  pub given_answer: Option<String>,
  pub is_correct_answer: Option<bool>,
  pub answered_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub history: Vec<AnswerAttempt>,
}

/// One learner's progress document, flattened out of its
/// `courseId -> lessonId -> stepId` nesting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProgressRecord {
  pub user_id: String,
  pub steps: Vec<StepProgress>,
}

fn nested(value: Value, what: &str) -> Result<Document, StoreError> {
  match value {
    Value::Object(map) => Ok(map),
    other => Err(StoreError::Malformed(format!("{} is {}", what, other))),
  }
}

impl ProgressRecord {
  pub fn from_document(user_id: &str, doc: Document) -> Result<Self, StoreError> {
    let mut steps = vec![];
    for (course_id, lessons) in doc {
      if course_id == ID_FIELD {
        continue;
      }
      for (lesson_id, entries) in nested(lessons, "course progress")? {
        for (step_id, entry) in nested(entries, "lesson progress")? {
          let mut step: StepProgress = serde_json::from_value(entry)?;
          step.course_id = course_id.clone();
          step.lesson_id = lesson_id.clone();
          step.step_id = step_id;
          steps.push(step);
        }
      }
    }
    Ok(ProgressRecord {
      user_id: user_id.to_string(),
      steps,
    })
  }

  pub fn step(&self, course_id: &str, lesson_id: &str, step_id: &str) -> Option<&StepProgress> {
    self
      .steps
      .iter()
      .find(|s| s.course_id == course_id && s.lesson_id == lesson_id && s.step_id == step_id)
  }
}

pub struct Query;

#[juniper::object(Context = GQLContext)]
impl Query {
  fn course(ctx: &GQLContext, id: String) -> FieldResult<Option<Course>> {
    course::find_course(ctx.store(), &id).map_err(CWError::into_field_error)
  }

  /// Steps carry `correctAnswer` for admins only
  fn lesson(ctx: &GQLContext, course_id: String, id: String) -> FieldResult<Option<Lesson>> {
    let found =
      lesson::find_lesson(ctx.store(), &course_id, &id).map_err(CWError::into_field_error)?;
    if ctx.principal.admin {
      return Ok(found);
    }
    Ok(found.map(Lesson::without_answers))
  }

  /// Progress of the logged in user, one entry per touched step
  fn progress(ctx: &GQLContext) -> FieldResult<Vec<StepProgress>> {
    let user = ctx
      .principal
      .require_user()
      .map_err(CWError::into_field_error)?;
    let record =
      progress::find_progress(ctx.store(), &user.id).map_err(CWError::into_field_error)?;
    Ok(record.steps)
  }
}
