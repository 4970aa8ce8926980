use actix_web::{
  web::{Data, Json},
  HttpRequest, HttpResponse,
};
use failure::Error;
use juniper::{graphiql::graphiql_source, http::GraphQLRequest};
use serde::{Deserialize, Serialize};

use crate::{
  graphql::{guard::Principal, GQLContext},
  service::{jwt::verify_jwt, AppState},
};

#[derive(Serialize, Deserialize, Debug)]
pub struct GraphQLData(GraphQLRequest);

pub async fn graphiql() -> HttpResponse {
  let html = graphiql_source("/graphql");
  HttpResponse::Ok()
    .content_type("text/html; charset=utf-8")
    .body(html)
}

/// Anonymous unless the request carries a valid token.
fn principal(req: &HttpRequest, secret: &str) -> Principal {
  req
    .headers()
    .get("Authorization")
    .and_then(|header| {
      let auth_string = header.to_str().ok()?;
      let token = auth_string.trim_start_matches("Bearer ").trim();
      match verify_jwt(token, secret) {
        Ok(t) => Some(Principal::from(t.claims)),
        Err(err) => {
          debug!("Ignoring invalid token: {}", err);
          None
        }
      }
    })
    .unwrap_or_default()
}

pub async fn graphql(
  req: HttpRequest,
  Json(GraphQLData(data)): Json<GraphQLData>,
  st: Data<AppState>,
) -> Result<HttpResponse, Error> {
  let state = st.get_ref();
  let principal = principal(&req, &state.settings.jwt_secret);

  let ctx = GQLContext::new(state.store.clone(), principal, state.settings.resubmission);
  let res = data.execute(&state.schema, &ctx);
  if !res.is_ok() {
    debug!("GraphQL request finished with errors");
  }
  Ok(
    HttpResponse::Ok()
      .content_type("application/json")
      .body(serde_json::to_string(&res)?),
  )
}
