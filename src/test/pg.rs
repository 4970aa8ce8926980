#[cfg(test)]
mod tests {
  use crate::{
    config::ResubmissionPolicy,
    db::{seed, DocumentStore, FieldOp, Filter, StoreError, Upsert},
    graphql::{
      guard::Principal,
      mutations::{
        lesson::create_lesson,
        progress::{find_progress, mark_visited, submit_answer},
      },
    },
    test::{new_lesson, pg_store, steps, COURSE, LESSON},
  };
  use serde_json::json;

  const COLLECTION: &str = "pg_store_test";

  #[test]
  fn test_pg_visit_then_answer_keeps_both() {
    let store = match pg_store() {
      Some(store) => store,
      None => return,
    };
    create_lesson(&store, &Principal::admin("admin"), new_lesson(steps())).unwrap();
    let ferris = Principal::learner("pg-test-ferris");

    mark_visited(&store, &ferris, COURSE, LESSON, "intro").unwrap();
    mark_visited(&store, &ferris, COURSE, LESSON, "quiz").unwrap();
    submit_answer(
      &store,
      &ferris,
      ResubmissionPolicy::AppendHistory,
      COURSE,
      LESSON,
      "quiz",
      String::from("moved"),
    )
    .unwrap();

    let record = find_progress(&store, "pg-test-ferris").unwrap();
    let intro = record.step(COURSE, LESSON, "intro").unwrap();
    assert!(intro.visited);
    assert_eq!(intro.given_answer, None);

    let quiz = record.step(COURSE, LESSON, "quiz").unwrap();
    assert!(quiz.visited);
    assert!(quiz.visited_at.is_some());
    assert_eq!(quiz.given_answer.as_deref(), Some("moved"));
    assert_eq!(quiz.is_correct_answer, Some(true));
    assert_eq!(quiz.history.len(), 1);
  }

  #[test]
  fn test_pg_replace_merge_and_delete() {
    let store = match pg_store() {
      Some(store) => store,
      None => return,
    };

    let mut doc = seed("ignored");
    doc.insert("name".to_string(), json!("Rust"));
    doc.insert("position".to_string(), json!(1));
    store.upsert(COLLECTION, "rust", Upsert::Replace(doc)).unwrap();

    let mut doc = seed("rust");
    doc.insert("name".to_string(), json!("Rust 2018"));
    store.upsert(COLLECTION, "rust", Upsert::Replace(doc)).unwrap();
    let stored = store.find_one(COLLECTION, &Filter::id("rust")).unwrap().unwrap();
    assert_eq!(
      serde_json::Value::Object(stored),
      json!({ "_id": "rust", "name": "Rust 2018" })
    );

    store
      .upsert(
        COLLECTION,
        "rust",
        Upsert::Merge(vec![FieldOp::Set(
          vec![String::from("meta"), String::from("draft")],
          json!(true),
        )]),
      )
      .unwrap();
    match store.upsert(
      COLLECTION,
      "rust",
      Upsert::Merge(vec![
        FieldOp::Set(vec![String::from("other")], json!(1)),
        FieldOp::Set(vec![String::from("name"), String::from("short")], json!("Rs")),
      ]),
    ) {
      Err(StoreError::PathConflict(at)) => assert_eq!(at, "name"),
      other => panic!("Expected PathConflict, got {:?}", other),
    }
    let stored = store.find_one(COLLECTION, &Filter::id("rust")).unwrap().unwrap();
    assert_eq!(
      serde_json::Value::Object(stored),
      json!({ "_id": "rust", "name": "Rust 2018", "meta": { "draft": true } })
    );

    store.upsert(COLLECTION, "go", Upsert::Replace(seed("go"))).unwrap();
    assert_eq!(store.delete_many(COLLECTION, &Filter::id("missing")).unwrap(), 0);
    assert_eq!(store.delete_many(COLLECTION, &Filter::id("go")).unwrap(), 1);
    assert_eq!(store.delete_many(COLLECTION, &Filter::All).unwrap(), 1);
    assert_eq!(store.find_one(COLLECTION, &Filter::All).unwrap(), None);
  }
}
