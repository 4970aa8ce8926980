use chrono::Utc;
use serde_json::{json, Value};

use crate::{
  config::ResubmissionPolicy,
  db::{DocumentStore, FieldOp, Filter, Upsert},
  graphql::{
    guard::Principal,
    mutations::lesson,
    query::{ProgressRecord, Step},
  },
  CWError,
};

pub const COLLECTION: &str = "progress";

pub fn find_progress(store: &dyn DocumentStore, user_id: &str) -> Result<ProgressRecord, CWError> {
  match store.find_one(COLLECTION, &Filter::id(user_id))? {
    Some(doc) => Ok(ProgressRecord::from_document(user_id, doc)?),
    None => Ok(ProgressRecord {
      user_id: user_id.to_string(),
      steps: vec![],
    }),
  }
}

fn find_step(
  store: &dyn DocumentStore,
  course_id: &str,
  lesson_id: &str,
  step_id: &str,
) -> Result<Step, CWError> {
  let lesson =
    lesson::find_lesson(store, course_id, lesson_id)?.ok_or_else(|| CWError::LessonNotFound {
      course_id: course_id.to_string(),
      lesson_id: lesson_id.to_string(),
    })?;
  lesson
    .steps
    .into_iter()
    .find(|s| s.id == step_id)
    .ok_or_else(|| CWError::StepNotFound {
      lesson_id: lesson_id.to_string(),
      step_id: step_id.to_string(),
    })
}

/// Addresses `courseId -> lessonId -> stepId -> field` inside a progress document.
struct StepPath<'a> {
  course_id: &'a str,
  lesson_id: &'a str,
  step_id: &'a str,
}

impl<'a> StepPath<'a> {
  fn field(&self, name: &str) -> Vec<String> {
    vec![
      self.course_id.to_string(),
      self.lesson_id.to_string(),
      self.step_id.to_string(),
      name.to_string(),
    ]
  }

  fn set<V: Into<Value>>(&self, name: &str, value: V) -> FieldOp {
    FieldOp::Set(self.field(name), value.into())
  }
}

pub fn mark_visited(
  store: &dyn DocumentStore,
  principal: &Principal,
  course_id: &str,
  lesson_id: &str,
  step_id: &str,
) -> Result<bool, CWError> {
  let user = principal.require_user()?;
  let step = find_step(store, course_id, lesson_id, step_id)?;

  let path = StepPath {
    course_id,
    lesson_id,
    step_id,
  };
  let ops = vec![
    path.set("visited", true),
    path.set("visitedAt", Utc::now().to_rfc3339()),
    path.set("type", step.kind),
    path.set("points", step.points),
  ];
  store.upsert(COLLECTION, &user.id, Upsert::Merge(ops))?;
  debug!(
    "User {} visited {}/{}/{}",
    user.id, course_id, lesson_id, step_id
  );
  Ok(true)
}

/// Grades `answer` against an mcq step and records it in the caller's progress.
/// The returned step carries the submitted answer; the stored lesson is not touched.
pub fn submit_answer(
  store: &dyn DocumentStore,
  principal: &Principal,
  policy: ResubmissionPolicy,
  course_id: &str,
  lesson_id: &str,
  step_id: &str,
  answer: String,
) -> Result<Step, CWError> {
  let user = principal.require_user()?;
  let mut step = find_step(store, course_id, lesson_id, step_id)?;
  if !step.is_mcq() {
    return Err(CWError::NotMultipleChoice(step.kind));
  }

  if policy == ResubmissionPolicy::Reject {
    // Check and write are separate store calls; two racing first answers both pass.
    let answered = find_progress(store, &user.id)?
      .step(course_id, lesson_id, step_id)
      .map_or(false, |p| p.answered_at.is_some());
    if answered {
      return Err(CWError::AlreadyAnswered(step_id.to_string()));
    }
  }

  let is_correct = step.correct_answer.as_ref() == Some(&answer);
  let answered_at = Utc::now().to_rfc3339();
  let path = StepPath {
    course_id,
    lesson_id,
    step_id,
  };
  let mut ops = vec![
    path.set("givenAnswer", answer.as_str()),
    path.set("isCorrectAnswer", is_correct),
    path.set("answeredAt", answered_at.as_str()),
    path.set("type", step.kind.as_str()),
    path.set("points", step.points),
  ];
  if policy == ResubmissionPolicy::AppendHistory {
    ops.push(FieldOp::Push(
      path.field("history"),
      json!({
        "givenAnswer": answer,
        "isCorrectAnswer": is_correct,
        "answeredAt": answered_at,
      }),
    ));
  }
  store.upsert(COLLECTION, &user.id, Upsert::Merge(ops))?;
  info!(
    "User {} answered {}/{}/{} ({})",
    user.id,
    course_id,
    lesson_id,
    step_id,
    if is_correct { "correct" } else { "incorrect" }
  );

  step.given_answer = Some(answer);
  Ok(step)
}
