use std::sync::Arc;

use crate::{config::ResubmissionPolicy, db::DocumentStore};

pub mod guard;
pub mod mutations;
pub mod query;

use guard::Principal;

pub struct GQLContext {
  store: Arc<dyn DocumentStore>,
  pub principal: Principal,
  pub resubmission: ResubmissionPolicy,
}

impl GQLContext {
  pub fn new(
    store: Arc<dyn DocumentStore>,
    principal: Principal,
    resubmission: ResubmissionPolicy,
  ) -> Self {
    Self {
      store,
      principal,
      resubmission,
    }
  }

  pub fn store(&self) -> &dyn DocumentStore {
    self.store.as_ref()
  }
}

impl juniper::Context for GQLContext {}

pub type Schema = juniper::RootNode<'static, query::Query, mutations::Mutation>;

pub fn create_schema() -> Schema {
  Schema::new(query::Query, mutations::Mutation)
}
