use crate::projects::repo_types::{col, Project};
use crate::store::{RecordStore, Table};

impl Project {
    pub async fn find_by_id(store: &dyn RecordStore, id: &str) -> anyhow::Result<Option<Project>> {
        let rows = store.scan_all(Table::Projects).await?;
        Ok(rows
            .iter()
            .find(|row| row.get(col::ID).map(String::as_str) == Some(id))
            .map(|row| Project::from_row(row)))
    }

    /// Projects owned by `user_id`, in insertion order.
    pub async fn list_by_owner(store: &dyn RecordStore, user_id: &str) -> anyhow::Result<Vec<Project>> {
        let rows = store.scan_all(Table::Projects).await?;
        Ok(rows
            .iter()
            .map(|row| Project::from_row(row))
            .filter(|p| p.user_id == user_id)
            .collect())
    }

    /// Public projects of everyone except `viewer`, in insertion order.
    pub async fn list_shared(store: &dyn RecordStore, viewer: &str) -> anyhow::Result<Vec<Project>> {
        let rows = store.scan_all(Table::Projects).await?;
        Ok(rows
            .iter()
            .map(|row| Project::from_row(row))
            .filter(|p| p.user_id != viewer && !p.is_private)
            .collect())
    }

    pub async fn insert(store: &dyn RecordStore, project: &Project) -> anyhow::Result<()> {
        store
            .append(Table::Projects, project.clone().into_row())
            .await
    }

    /// Rewrite the mutable cells of the stored row with the same id.
    /// Returns `false` if the row has disappeared.
    pub async fn save(store: &dyn RecordStore, project: &Project) -> anyhow::Result<bool> {
        store
            .update_fields(Table::Projects, &project.id, &project.mutable_cells())
            .await
    }

    pub async fn delete(store: &dyn RecordStore, id: &str) -> anyhow::Result<bool> {
        store.delete_row(Table::Projects, id).await
    }
}
