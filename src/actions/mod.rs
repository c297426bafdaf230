use axum::{routing::post, Router};

use crate::state::AppState;

pub mod envelope;
pub mod error;
pub mod handlers;

pub use envelope::Envelope;
pub use error::{ActionError, ActionResult};

pub fn router() -> Router<AppState> {
    Router::new().route("/exec", post(handlers::exec))
}

/// A required text field: missing, `null` and `""` all count as absent.
pub(crate) fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
