use std::sync::Arc;

use super::{
  config::Settings,
  db::DocumentStore,
  graphql::{create_schema, Schema},
};

pub mod endpoints;
pub mod jwt;

#[derive(Clone)]
pub struct AppState {
  pub schema: Arc<Schema>,
  pub store: Arc<dyn DocumentStore>,
  pub settings: Arc<Settings>,
}

impl AppState {
  pub fn new(store: Arc<dyn DocumentStore>, settings: Settings) -> Self {
    AppState {
      schema: Arc::new(create_schema()),
      store,
      settings: Arc::new(settings),
    }
  }
}
