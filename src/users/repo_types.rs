use serde::Serialize;

use crate::store::{cell, Row};

/// User record as stored in the `Users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String, // unique, compared exactly as stored
    #[serde(skip_serializing)]
    pub password_digest: String,
    pub created_at: String,
}

impl User {
    pub fn into_row(self) -> Row {
        vec![
            self.id,
            self.name,
            self.email,
            self.password_digest,
            self.created_at,
        ]
    }

    pub fn from_row(row: &[String]) -> Self {
        Self {
            id: cell(row, 0),
            name: cell(row, 1),
            email: cell(row, 2),
            password_digest: cell(row, 3),
            created_at: cell(row, 4),
        }
    }
}
