//! Typed HTTP client for the action endpoint.
//!
//! Browsers used to reach the endpoint through a chain of fallbacks (cross-origin
//! fetch, a hidden form posted into a frame, then a script-tag callback). The server
//! now answers preflight requests itself, so one plain JSON POST is enough. The
//! script-tag path could only issue GETs and was never usable for writes.

use std::time::Duration;

use reqwest::Url;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::actions::Envelope;
use crate::projects::dto::ProjectInput;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid endpoint url: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payload must be a JSON object")]
    Payload,
}

/// Posts action envelopes to one endpoint and decodes the response envelope.
///
/// `success: false` answers are returned as `Ok`; only transport problems are
/// errors.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl ApiClient {
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: Url::parse(endpoint)?,
        })
    }

    /// Send `action` with the fields of `payload` merged into the envelope.
    pub async fn request(&self, action: &str, payload: Value) -> Result<Envelope, ClientError> {
        let mut body = match payload {
            Value::Object(fields) => fields,
            Value::Null => Map::new(),
            _ => return Err(ClientError::Payload),
        };
        body.insert("action".into(), Value::String(action.to_string()));

        let envelope = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<Envelope>()
            .await?;
        debug!(%action, success = envelope.success, "action answered");
        Ok(envelope)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Envelope, ClientError> {
        self.request(
            "register",
            json!({ "name": name, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Envelope, ClientError> {
        self.request("login", json!({ "email": email, "password": password }))
            .await
    }

    pub async fn reset_password(&self, email: &str) -> Result<Envelope, ClientError> {
        self.request("resetPassword", json!({ "email": email })).await
    }

    pub async fn user_projects(&self, user_id: &str) -> Result<Envelope, ClientError> {
        self.request("getUserProjects", json!({ "userId": user_id }))
            .await
    }

    pub async fn shared_projects(&self, user_id: &str) -> Result<Envelope, ClientError> {
        self.request("getSharedProjects", json!({ "userId": user_id }))
            .await
    }

    pub async fn create_project(&self, project: &ProjectInput) -> Result<Envelope, ClientError> {
        self.request("createProject", json!({ "project": project }))
            .await
    }

    pub async fn update_project(&self, project: &ProjectInput) -> Result<Envelope, ClientError> {
        self.request("updateProject", json!({ "project": project }))
            .await
    }

    pub async fn delete_project(&self, project_id: &str, user_id: &str) -> Result<Envelope, ClientError> {
        self.request(
            "deleteProject",
            json!({ "projectId": project_id, "userId": user_id }),
        )
        .await
    }

    pub async fn get_project(&self, project_id: &str, user_id: Option<&str>) -> Result<Envelope, ClientError> {
        self.request(
            "getProject",
            json!({ "projectId": project_id, "userId": user_id }),
        )
        .await
    }
}
