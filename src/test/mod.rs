use diesel::{
  prelude::*,
  r2d2::{ConnectionManager, Pool},
};
use dotenv::dotenv;
use serde_json::{json, Value};
use std::{env, sync::Arc};

use crate::{
  config::{ResubmissionPolicy, Settings},
  db::{
    pg::{run_migrations, DBConnection},
    MemoryStore, PgStore,
  },
  graphql::mutations::lesson::{NewLesson, StepInput},
  service::{jwt::encode_jwt, AppState},
};

/// Posts a GraphQL document to `/graphql` on an initialised test service and
/// yields the decoded JSON response.
macro_rules! gql {
  ($app:expr, $token:expr, $query:expr, $variables:expr) => {{
    let mut req = actix_web::test::TestRequest::post()
      .uri("/graphql")
      .set_json(&serde_json::json!({ "query": $query, "variables": $variables }));
    let token: Option<String> = $token;
    if let Some(token) = token {
      req = req.header("Authorization", token);
    }
    let resp = actix_web::test::call_service(&mut $app, req.to_request()).await;
    assert!(resp.status().is_success(), "GraphQL request failed");
    let body = actix_web::test::read_body(resp).await;
    serde_json::from_slice::<serde_json::Value>(&body).unwrap()
  }};
}

mod pg;
mod store;

pub const COURSE: &str = "rust";
pub const LESSON: &str = "ownership";

pub fn init(policy: ResubmissionPolicy) -> (AppState, Arc<MemoryStore>) {
  let store = Arc::new(MemoryStore::new());
  let settings = Settings {
    jwt_secret: String::from("test-secret"),
    resubmission: policy,
  };
  (AppState::new(store.clone(), settings), store)
}

/// A `PgStore` on a single connection whose work is rolled back at the end of the
/// test. `None` when `DATABASE_URL` is not set.
pub fn pg_store() -> Option<PgStore> {
  dotenv().ok();
  let db_url = env::var("DATABASE_URL").ok()?;
  let manager = ConnectionManager::<DBConnection>::new(db_url);
  let pool = Pool::builder()
    .max_size(1)
    .build(manager)
    .expect("Failed to initialize connection pool");
  let conn = pool.get().expect("Failed to get db connection");
  conn
    .begin_test_transaction()
    .expect("Failed to start transaction");
  run_migrations(&conn).expect("Failed to run migrations");
  drop(conn);
  Some(PgStore::new(pool))
}

pub fn admin_token(data: &AppState) -> Option<String> {
  Some(encode_jwt("admin", true, 1, &data.settings.jwt_secret).unwrap())
}

pub fn user_token(data: &AppState, user_id: &str) -> Option<String> {
  Some(encode_jwt(user_id, false, 1, &data.settings.jwt_secret).unwrap())
}

pub fn steps() -> Vec<StepInput> {
  vec![
    StepInput::new("intro", "text", 1.0),
    StepInput::mcq(
      "quiz",
      5.0,
      vec![String::from("moved"), String::from("copied")],
      "moved",
    ),
  ]
}

pub fn new_lesson(steps: Vec<StepInput>) -> NewLesson {
  NewLesson {
    course_id: COURSE.to_string(),
    id: LESSON.to_string(),
    name: String::from("Ownership"),
    intro: String::from("Who frees the memory?"),
    position: 1,
    steps,
  }
}

pub fn steps_json() -> Value {
  json!([
    { "id": "intro", "type": "text", "points": 1.0 },
    {
      "id": "quiz",
      "type": "mcq",
      "points": 5.0,
      "options": ["moved", "copied"],
      "correctAnswer": "moved",
    },
  ])
}

pub fn error_type(body: &Value) -> &str {
  body["errors"][0]["extensions"]["type"]
    .as_str()
    .unwrap_or("")
}
