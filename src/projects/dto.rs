use serde::{Deserialize, Serialize};

/// Project fields as submitted by the client for create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}

/// `createProject` / `updateProject` payload.
#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub project: Option<ProjectInput>,
}

/// `getUserProjects` / `getSharedProjects` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProjectsRequest {
    pub user_id: Option<String>,
}

/// `deleteProject` / `getProject` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRefRequest {
    pub project_id: Option<String>,
    pub user_id: Option<String>,
}
