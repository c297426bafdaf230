use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::{ActionError, ActionResult, Envelope};
use crate::{
    projects::services as projects,
    state::AppState,
    store::RecordStore,
    users::services as users,
};

/// POST endpoint for every action. Always answers 200 with an envelope, even when
/// the body could not be read (for example when it is over the size limit).
#[instrument(skip(state, body))]
pub async fn exec(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Json<Envelope> {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let err = ActionError::Unexpected(anyhow::anyhow!(rejection.body_text()));
            warn!(status = %rejection.status(), error = %err, "request body rejected");
            return Json(err.into());
        }
    };
    debug!(len = body.len(), "request body read");

    // one action at a time per process
    let _turn = state.gate.lock().await;
    Json(dispatch(state.store.as_ref(), &body).await)
}

/// Parse a raw request envelope, run the named action and fold any failure into a
/// failure envelope.
pub async fn dispatch(store: &dyn RecordStore, body: &[u8]) -> Envelope {
    let fields = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => {
            let err = ActionError::Unexpected(anyhow::anyhow!("request body must be a JSON object"));
            warn!(error = %err, "malformed request");
            return err.into();
        }
        Err(e) => {
            let err = ActionError::from(e);
            warn!(error = %err, "malformed request");
            return err.into();
        }
    };

    let action = fields
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();

    match route(store, &action, Value::Object(fields)).await {
        Ok(env) => {
            debug!(%action, "action completed");
            env
        }
        Err(err) => {
            match &err {
                ActionError::Unexpected(e) => error!(%action, error = ?e, "action failed"),
                other => warn!(%action, reason = %other, "action rejected"),
            }
            err.into()
        }
    }
}

async fn route(store: &dyn RecordStore, action: &str, payload: Value) -> ActionResult {
    match action {
        "register" => users::register(store, parse(payload)?).await,
        "login" => users::login(store, parse(payload)?).await,
        "resetPassword" => users::reset_password(store, parse(payload)?).await,
        "getUserProjects" => projects::get_user_projects(store, parse(payload)?).await,
        "getSharedProjects" => projects::get_shared_projects(store, parse(payload)?).await,
        "createProject" => projects::create_project(store, parse(payload)?).await,
        "updateProject" => projects::update_project(store, parse(payload)?).await,
        "deleteProject" => projects::delete_project(store, parse(payload)?).await,
        "getProject" => projects::get_project(store, parse(payload)?).await,
        _ => Err(ActionError::InvalidAction),
    }
}

fn parse<T: DeserializeOwned>(payload: Value) -> ActionResult<T> {
    Ok(serde_json::from_value(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Table};
    use serde_json::json;

    async fn call(store: &MemoryStore, body: Value) -> Envelope {
        dispatch(store, body.to_string().as_bytes()).await
    }

    #[tokio::test]
    async fn unknown_and_missing_actions_are_invalid() {
        let store = MemoryStore::new();
        for body in [json!({"action": "dropTables"}), json!({"userId": "u"}), json!({"action": 7})] {
            let env = call(&store, body).await;
            assert_eq!(env, Envelope::failure("Invalid action"));
        }
    }

    #[tokio::test]
    async fn action_names_match_exactly() {
        let store = MemoryStore::new();
        let env = call(&store, json!({"action": "Register", "name": "a", "email": "b", "password": "c"})).await;
        assert_eq!(env.message.as_deref(), Some("Invalid action"));
        assert!(store.scan_all(Table::Users).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn broken_json_becomes_error_envelope() {
        let store = MemoryStore::new();
        let env = dispatch(&store, b"{not json").await;
        assert!(!env.success);
        assert!(env.message.unwrap().starts_with("Error: "));

        let env = dispatch(&store, b"[1, 2]").await;
        assert_eq!(
            env.message.as_deref(),
            Some("Error: request body must be a JSON object")
        );
    }

    #[tokio::test]
    async fn wrongly_typed_payload_is_a_fault_not_a_panic() {
        let store = MemoryStore::new();
        let env = call(&store, json!({"action": "getUserProjects", "userId": 42})).await;
        assert!(!env.success);
        assert!(env.message.unwrap().starts_with("Error: invalid type"));
    }

    #[tokio::test]
    async fn dispatches_to_handlers() {
        let store = MemoryStore::new();
        let env = call(
            &store,
            json!({"action": "register", "name": "Ada", "email": "ada@example.com", "password": "pw"}),
        )
        .await;
        assert_eq!(env, Envelope::with_message("User registered successfully"));

        let env = call(&store, json!({"action": "resetPassword", "email": "ada@example.com"})).await;
        assert!(env.success);
    }
}
