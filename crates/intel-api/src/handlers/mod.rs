pub mod records;
pub mod selections;
pub mod snapshot;

use std::sync::Arc;

use axum::{
  Json,
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use intel_core::{DerivedSnapshot, Engine};
use serde::Serialize;

use crate::etag::{if_none_match, version_token};

/// A snapshot together with the entity tag of the state it came from.
pub struct View {
  pub token:    String,
  pub snapshot: Arc<DerivedSnapshot>,
}

impl View {
  pub fn of(engine: &Engine) -> Self {
    Self {
      token:    version_token(
        engine.records_digest(),
        engine.version(),
        &engine.state().selections,
      ),
      snapshot: engine.snapshot(),
    }
  }

  /// Serialise `body` under this view's tag, or answer `304` when the client
  /// already holds it.
  pub fn respond<T: Serialize>(&self, headers: &HeaderMap, body: &T) -> Response {
    if let Some(tags) = headers
      .get(header::IF_NONE_MATCH)
      .and_then(|v| v.to_str().ok())
      && if_none_match(tags, &self.token)
    {
      return (StatusCode::NOT_MODIFIED, [(header::ETAG, self.token.clone())])
        .into_response();
    }
    ([(header::ETAG, self.token.clone())], Json(body)).into_response()
  }
}

impl IntoResponse for View {
  fn into_response(self) -> Response {
    ([(header::ETAG, self.token)], Json(&*self.snapshot)).into_response()
  }
}
