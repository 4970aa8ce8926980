#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;
#[macro_use]
extern crate juniper;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod config;
pub mod db;
pub mod graphql;
pub mod service;

#[cfg(test)]
mod test;

use juniper::FieldError;
use std::{error, fmt};

use db::StoreError;

#[derive(Debug)]
pub enum CWError {
  Unauthorized(&'static str),
  LessonNotFound { course_id: String, lesson_id: String },
  StepNotFound { lesson_id: String, step_id: String },
  NotMultipleChoice(String),
  AlreadyAnswered(String),
  InvalidArgument(String),
  Store(StoreError),
}

impl CWError {
  pub fn code(&self) -> &'static str {
    match *self {
      CWError::Unauthorized(_) => "UNAUTHORIZED",
      CWError::LessonNotFound { .. } | CWError::StepNotFound { .. } => "NOT_FOUND",
      CWError::NotMultipleChoice(_) | CWError::InvalidArgument(_) => "BAD_REQUEST",
      CWError::AlreadyAnswered(_) => "CONFLICT",
      CWError::Store(_) => "INTERNAL",
    }
  }

  pub fn into_field_error(self) -> FieldError {
    if let CWError::Store(ref err) = self {
      error!("Store failure: {}", err);
    }
    let code = self.code();
    FieldError::new(self.to_string(), graphql_value!({ "type": code }))
  }
}

impl fmt::Display for CWError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      CWError::Unauthorized(ref who) => write!(f, "Unauthorized Access! - Only for {}", who),
      CWError::LessonNotFound {
        ref course_id,
        ref lesson_id,
      } => write!(f, "Lesson {} not found in course {}", lesson_id, course_id),
      CWError::StepNotFound {
        ref lesson_id,
        ref step_id,
      } => write!(f, "Step {} not found in lesson {}", step_id, lesson_id),
      CWError::NotMultipleChoice(ref kind) => write!(f, "Step type is not MCQ but {}", kind),
      CWError::AlreadyAnswered(ref step_id) => {
        write!(f, "Step {} has already been answered", step_id)
      }
      CWError::InvalidArgument(ref reason) => write!(f, "Invalid argument: {}", reason),
      CWError::Store(ref err) => write!(f, "Store error: {}", err),
    }
  }
}

impl error::Error for CWError {
  fn cause(&self) -> Option<&(dyn error::Error)> {
    match *self {
      CWError::Store(ref err) => Some(err),
      _ => None,
    }
  }
}

impl From<StoreError> for CWError {
  fn from(err: StoreError) -> CWError {
    CWError::Store(err)
  }
}

impl From<serde_json::Error> for CWError {
  fn from(err: serde_json::Error) -> CWError {
    CWError::Store(StoreError::Document(err))
  }
}
