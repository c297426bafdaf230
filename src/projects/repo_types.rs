use serde::{Deserialize, Serialize};

use crate::store::{cell, Row};

/// Column positions in the `Projects` table.
pub(crate) mod col {
    pub const ID: usize = 0;
    pub const USER_ID: usize = 1;
    pub const NAME: usize = 2;
    pub const CATEGORY: usize = 3;
    pub const VERSION: usize = 4;
    pub const THUMBNAIL: usize = 5;
    pub const FRONTEND_CODE: usize = 6;
    pub const BACKEND_CODE: usize = 7;
    pub const URL: usize = 8;
    pub const REMARKS: usize = 9;
    pub const IS_PRIVATE: usize = 10;
    pub const CREATED_AT: usize = 11;
    pub const UPDATED_AT: usize = 12;
}

/// Project record. Serialized with the camelCase keys the front end reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub user_id: String, // owner
    pub name: String,
    pub category: String,
    pub version: String,
    pub thumbnail: String,
    pub frontend_code: String,
    pub backend_code: String,
    pub url: String,
    pub remarks: String,
    pub is_private: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Project {
    pub fn into_row(self) -> Row {
        vec![
            self.id,
            self.user_id,
            self.name,
            self.category,
            self.version,
            self.thumbnail,
            self.frontend_code,
            self.backend_code,
            self.url,
            self.remarks,
            privacy_cell(self.is_private),
            self.created_at,
            self.updated_at,
        ]
    }

    pub fn from_row(row: &[String]) -> Self {
        Self {
            id: cell(row, col::ID),
            user_id: cell(row, col::USER_ID),
            name: cell(row, col::NAME),
            category: cell(row, col::CATEGORY),
            version: cell(row, col::VERSION),
            thumbnail: cell(row, col::THUMBNAIL),
            frontend_code: cell(row, col::FRONTEND_CODE),
            backend_code: cell(row, col::BACKEND_CODE),
            url: cell(row, col::URL),
            remarks: cell(row, col::REMARKS),
            is_private: parse_privacy(row.get(col::IS_PRIVATE).map(String::as_str)),
            created_at: cell(row, col::CREATED_AT),
            updated_at: cell(row, col::UPDATED_AT),
        }
    }

    /// Cells rewritten by an update: everything except id, owner and creation time.
    pub(crate) fn mutable_cells(&self) -> Vec<(usize, String)> {
        vec![
            (col::NAME, self.name.clone()),
            (col::CATEGORY, self.category.clone()),
            (col::VERSION, self.version.clone()),
            (col::THUMBNAIL, self.thumbnail.clone()),
            (col::FRONTEND_CODE, self.frontend_code.clone()),
            (col::BACKEND_CODE, self.backend_code.clone()),
            (col::URL, self.url.clone()),
            (col::REMARKS, self.remarks.clone()),
            (col::IS_PRIVATE, privacy_cell(self.is_private)),
            (col::UPDATED_AT, self.updated_at.clone()),
        ]
    }
}

pub(crate) fn privacy_cell(is_private: bool) -> String {
    if is_private { "true" } else { "false" }.to_string()
}

/// Only the exact text `true` marks a row private.
pub(crate) fn parse_privacy(cell: Option<&str>) -> bool {
    cell == Some("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Project {
        Project {
            id: "p1".into(),
            user_id: "u1".into(),
            name: "Snippet".into(),
            category: "web".into(),
            version: "1.0".into(),
            thumbnail: "".into(),
            frontend_code: "<div/>".into(),
            backend_code: "fn main() {}".into(),
            url: "https://example.com".into(),
            remarks: "".into(),
            is_private: true,
            created_at: "2024-01-01T00:00:00.000Z".into(),
            updated_at: "2024-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn row_layout_matches_header() {
        let row = sample().into_row();
        assert_eq!(row.len(), crate::store::Table::Projects.width());
        assert_eq!(row[col::IS_PRIVATE], "true");
        assert_eq!(row[col::BACKEND_CODE], "fn main() {}");
        assert_eq!(Project::from_row(&row), sample());
    }

    #[test]
    fn privacy_text_other_than_true_is_public() {
        assert!(parse_privacy(Some("true")));
        for text in ["false", "TRUE", "True", "", "1"] {
            assert!(!parse_privacy(Some(text)), "{text:?} must read as public");
        }
        assert!(!parse_privacy(None));
    }

    #[test]
    fn serializes_camel_case_with_native_bool() {
        let v = serde_json::to_value(sample()).unwrap();
        assert_eq!(v["isPrivate"], true);
        assert_eq!(v["frontendCode"], "<div/>");
        assert_eq!(v["userId"], "u1");
    }

    #[test]
    fn mutable_cells_leave_identity_columns_alone() {
        let cols: Vec<_> = sample().mutable_cells().into_iter().map(|(c, _)| c).collect();
        assert!(!cols.contains(&col::ID));
        assert!(!cols.contains(&col::USER_ID));
        assert!(!cols.contains(&col::CREATED_AT));
        assert!(cols.contains(&col::UPDATED_AT));
    }
}
