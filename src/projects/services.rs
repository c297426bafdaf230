use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    actions::{present, ActionError, ActionResult, Envelope},
    projects::{
        dto::{ProjectInput, ProjectRefRequest, ProjectRequest, UserProjectsRequest},
        repo_types::Project,
    },
    store::RecordStore,
    timestamp::now_iso,
    users::User,
};

fn text(field: &Option<String>) -> String {
    field.clone().unwrap_or_default()
}

/// Copy the editable fields of `input` onto `project`.
fn apply_input(project: &mut Project, input: &ProjectInput, name: &str, version: &str) {
    project.name = name.to_string();
    project.version = version.to_string();
    project.category = text(&input.category);
    project.thumbnail = text(&input.thumbnail);
    project.frontend_code = text(&input.frontend_code);
    project.backend_code = text(&input.backend_code);
    project.url = text(&input.url);
    project.remarks = text(&input.remarks);
    project.is_private = input.is_private.unwrap_or(false);
}

#[instrument(skip(store, req))]
pub async fn get_user_projects(store: &dyn RecordStore, req: UserProjectsRequest) -> ActionResult {
    let Some(user_id) = present(&req.user_id) else {
        return Err(ActionError::Validation("User ID is required"));
    };
    if User::find_by_id(store, user_id).await?.is_none() {
        return Err(ActionError::NotFound("User not found"));
    }

    let projects = Project::list_by_owner(store, user_id).await?;
    Ok(Envelope::ok().projects(projects))
}

#[instrument(skip(store, req))]
pub async fn get_shared_projects(store: &dyn RecordStore, req: UserProjectsRequest) -> ActionResult {
    let Some(user_id) = present(&req.user_id) else {
        return Err(ActionError::Validation("User ID is required"));
    };

    let projects = Project::list_shared(store, user_id).await?;
    Ok(Envelope::ok().projects(projects))
}

#[instrument(skip(store, req))]
pub async fn create_project(store: &dyn RecordStore, req: ProjectRequest) -> ActionResult {
    let input = req.project.unwrap_or_default();
    let (Some(user_id), Some(name), Some(version)) = (
        present(&input.user_id),
        present(&input.name),
        present(&input.version),
    ) else {
        return Err(ActionError::Validation(
            "Project data, user ID, name, and version are required",
        ));
    };

    if User::find_by_id(store, user_id).await?.is_none() {
        return Err(ActionError::NotFound("User not found"));
    }

    let now = now_iso()?;
    let mut project = Project {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: String::new(),
        category: String::new(),
        version: String::new(),
        thumbnail: String::new(),
        frontend_code: String::new(),
        backend_code: String::new(),
        url: String::new(),
        remarks: String::new(),
        is_private: false,
        created_at: now.clone(),
        updated_at: now,
    };
    apply_input(&mut project, &input, name, version);
    Project::insert(store, &project).await?;

    info!(project_id = %project.id, %user_id, private = project.is_private, "project created");
    Ok(Envelope::with_message("Project created successfully").project_id(project.id))
}

#[instrument(skip(store, req))]
pub async fn update_project(store: &dyn RecordStore, req: ProjectRequest) -> ActionResult {
    let input = req.project.unwrap_or_default();
    let (Some(id), Some(user_id), Some(name), Some(version)) = (
        present(&input.id),
        present(&input.user_id),
        present(&input.name),
        present(&input.version),
    ) else {
        return Err(ActionError::Validation(
            "Project data, ID, user ID, name, and version are required",
        ));
    };

    let Some(mut project) = Project::find_by_id(store, id).await? else {
        return Err(ActionError::NotFound("Project not found"));
    };
    if project.user_id != user_id {
        warn!(project_id = %id, %user_id, owner = %project.user_id, "update by non-owner");
        return Err(ActionError::Forbidden(
            "You do not have permission to update this project",
        ));
    }

    apply_input(&mut project, &input, name, version);
    // never let the clock put updatedAt before createdAt
    project.updated_at = now_iso()?.max(project.created_at.clone());

    if !Project::save(store, &project).await? {
        return Err(ActionError::NotFound("Project not found"));
    }

    info!(project_id = %id, %user_id, "project updated");
    Ok(Envelope::with_message("Project updated successfully"))
}

#[instrument(skip(store, req))]
pub async fn delete_project(store: &dyn RecordStore, req: ProjectRefRequest) -> ActionResult {
    let (Some(project_id), Some(user_id)) = (present(&req.project_id), present(&req.user_id)) else {
        return Err(ActionError::Validation("Project ID and user ID are required"));
    };

    let Some(project) = Project::find_by_id(store, project_id).await? else {
        return Err(ActionError::NotFound("Project not found"));
    };
    if project.user_id != user_id {
        warn!(%project_id, %user_id, owner = %project.user_id, "delete by non-owner");
        return Err(ActionError::Forbidden(
            "You do not have permission to delete this project",
        ));
    }

    if !Project::delete(store, project_id).await? {
        return Err(ActionError::NotFound("Project not found"));
    }

    info!(%project_id, %user_id, "project deleted");
    Ok(Envelope::with_message("Project deleted successfully"))
}

/// Public projects are readable by anyone; private ones only by their owner.
#[instrument(skip(store, req))]
pub async fn get_project(store: &dyn RecordStore, req: ProjectRefRequest) -> ActionResult {
    let Some(project_id) = present(&req.project_id) else {
        return Err(ActionError::Validation("Project ID is required"));
    };

    let Some(project) = Project::find_by_id(store, project_id).await? else {
        return Err(ActionError::NotFound("Project not found"));
    };
    if project.is_private && present(&req.user_id) != Some(project.user_id.as_str()) {
        return Err(ActionError::Forbidden(
            "You do not have permission to view this project",
        ));
    }

    Ok(Envelope::ok().project(project))
}
