#[cfg(test)]
mod tests {
  use crate::{
    config::ResubmissionPolicy,
    db::{apply, seed, DocumentStore, FieldOp, Filter, MemoryStore, StoreError, Upsert},
    graphql::guard::Principal,
    service::jwt::{encode_jwt, verify_jwt},
  };
  use serde_json::json;

  fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn test_merge_leaves_siblings() {
    let store = MemoryStore::new();
    store
      .upsert(
        "progress",
        "ferris",
        Upsert::Merge(vec![
          FieldOp::Set(path(&["rust", "ownership", "quiz", "visited"]), json!(true)),
          FieldOp::Set(path(&["rust", "ownership", "intro", "visited"]), json!(true)),
        ]),
      )
      .unwrap();
    store
      .upsert(
        "progress",
        "ferris",
        Upsert::Merge(vec![FieldOp::Set(
          path(&["rust", "ownership", "quiz", "givenAnswer"]),
          json!("moved"),
        )]),
      )
      .unwrap();

    let doc = store
      .find_one("progress", &Filter::id("ferris"))
      .unwrap()
      .unwrap();
    assert_eq!(
      serde_json::Value::Object(doc),
      json!({
        "_id": "ferris",
        "rust": {
          "ownership": {
            "intro": { "visited": true },
            "quiz": { "visited": true, "givenAnswer": "moved" },
          },
        },
      })
    );
  }

  #[test]
  fn test_dotted_ids_stay_single_segments() {
    let mut doc = seed("ferris");
    apply(
      &mut doc,
      FieldOp::Set(path(&["rust.2018", "ownership", "quiz", "visited"]), json!(true)),
    )
    .unwrap();
    assert_eq!(doc["rust.2018"]["ownership"]["quiz"]["visited"], json!(true));
    assert!(doc.get("rust").is_none());
  }

  #[test]
  fn test_push_appends() {
    let mut doc = seed("ferris");
    for answer in &["copied", "moved"] {
      apply(&mut doc, FieldOp::Push(path(&["quiz", "history"]), json!(answer))).unwrap();
    }
    assert_eq!(doc["quiz"]["history"], json!(["copied", "moved"]));
  }

  #[test]
  fn test_path_conflicts() {
    let store = MemoryStore::new();
    store
      .upsert(
        "progress",
        "ferris",
        Upsert::Merge(vec![FieldOp::Set(path(&["rust"]), json!("flat"))]),
      )
      .unwrap();

    let conflict = store.upsert(
      "progress",
      "ferris",
      Upsert::Merge(vec![
        FieldOp::Set(path(&["other"]), json!(1)),
        FieldOp::Set(path(&["rust", "ownership"]), json!(true)),
      ]),
    );
    match conflict {
      Err(StoreError::PathConflict(at)) => assert_eq!(at, "rust"),
      other => panic!("Expected PathConflict, got {:?}", other),
    }
    let doc = store
      .find_one("progress", &Filter::id("ferris"))
      .unwrap()
      .unwrap();
    assert!(doc.get("other").is_none());

    let mut doc = seed("ferris");
    apply(&mut doc, FieldOp::Set(path(&["history"]), json!(3))).unwrap();
    match apply(&mut doc, FieldOp::Push(path(&["history"]), json!(4))) {
      Err(StoreError::PathConflict(_)) => {}
      other => panic!("Expected PathConflict, got {:?}", other),
    }
  }

  #[test]
  fn test_replace_and_delete() {
    let store = MemoryStore::new();
    let mut doc = seed("ignored");
    doc.insert("name".to_string(), json!("Rust"));
    doc.insert("position".to_string(), json!(1));
    store
      .upsert("courses", "rust", Upsert::Replace(doc))
      .unwrap();

    let mut doc = seed("rust");
    doc.insert("name".to_string(), json!("Rust 2018"));
    store
      .upsert("courses", "rust", Upsert::Replace(doc))
      .unwrap();
    store
      .upsert("courses", "go", Upsert::Replace(seed("go")))
      .unwrap();

    let stored = store
      .find_one("courses", &Filter::id("rust"))
      .unwrap()
      .unwrap();
    assert_eq!(
      serde_json::Value::Object(stored),
      json!({ "_id": "rust", "name": "Rust 2018" })
    );

    assert_eq!(store.delete_many("courses", &Filter::id("missing")).unwrap(), 0);
    assert_eq!(store.delete_many("lessons", &Filter::All).unwrap(), 0);
    assert_eq!(store.delete_many("courses", &Filter::All).unwrap(), 2);
    assert_eq!(store.find_one("courses", &Filter::All).unwrap(), None);
  }

  #[test]
  fn test_tokens() {
    let secret = "test-secret";
    let token = encode_jwt("ferris", true, 1, secret).unwrap();
    let principal = Principal::from(verify_jwt(&token, secret).unwrap().claims);
    assert_eq!(principal, Principal::admin("ferris"));

    assert!(verify_jwt(&token, "other-secret").is_err());

    let expired = encode_jwt("ferris", false, -2, secret).unwrap();
    assert!(verify_jwt(&expired, secret).is_err());
  }

  #[test]
  fn test_resubmission_policy_names() {
    for policy in vec![
      ResubmissionPolicy::Reject,
      ResubmissionPolicy::Overwrite,
      ResubmissionPolicy::AppendHistory,
    ] {
      assert_eq!(policy.to_string().parse::<ResubmissionPolicy>(), Ok(policy));
    }
    assert_eq!(ResubmissionPolicy::default(), ResubmissionPolicy::Overwrite);
    assert!("versioned".parse::<ResubmissionPolicy>().is_err());
  }
}
