use uuid::Uuid;

use crate::store::{RecordStore, Table};
use crate::timestamp::now_iso;
use crate::users::repo_types::User;

impl User {
    /// Find a user by exact email.
    pub async fn find_by_email(store: &dyn RecordStore, email: &str) -> anyhow::Result<Option<User>> {
        let rows = store.scan_all(Table::Users).await?;
        Ok(rows
            .iter()
            .find(|row| row.get(2).map(String::as_str) == Some(email))
            .map(|row| User::from_row(row)))
    }

    pub async fn find_by_id(store: &dyn RecordStore, id: &str) -> anyhow::Result<Option<User>> {
        let rows = store.scan_all(Table::Users).await?;
        Ok(rows
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(id))
            .map(|row| User::from_row(row)))
    }

    /// Append a new user with a fresh id and creation time.
    pub async fn create(
        store: &dyn RecordStore,
        name: &str,
        email: &str,
        password_digest: &str,
    ) -> anyhow::Result<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_digest: password_digest.to_string(),
            created_at: now_iso()?,
        };
        store.append(Table::Users, user.clone().into_row()).await?;
        Ok(user)
    }
}
