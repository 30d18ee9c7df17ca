//! Board domain types

use serde::{Deserialize, Serialize};

use crate::domain::column::Column;

/// A kanban board with its columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

/// Lightweight board entry as listed under a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSummary {
    pub id: String,
    pub name: String,
}

impl From<Board> for BoardSummary {
    fn from(board: Board) -> Self {
        Self {
            id: board.id,
            name: board.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_board_decodes_api_shape() {
        let board: Board = serde_json::from_value(json!({
            "id": "b1",
            "name": "Sprint",
            "createdAt": "2018-01-02T10:00:00Z",
            "updatedAt": "2018-01-03T10:00:00Z",
            "columns": [{ "id": "c1", "name": "Todo" }]
        }))
        .unwrap();

        assert_eq!(board.name, "Sprint");
        assert_eq!(board.repository, None);
        assert_eq!(board.columns.len(), 1);
        assert_eq!(
            board.created_at.unwrap().to_rfc3339(),
            "2018-01-02T10:00:00+00:00"
        );
    }

    #[test]
    fn test_board_summary_conversion() {
        let board = Board {
            id: "b1".to_string(),
            name: "Sprint".to_string(),
            repository: Some("acme/app".to_string()),
            created_at: None,
            updated_at: None,
            columns: Vec::new(),
        };

        let summary: BoardSummary = board.into();
        assert_eq!(summary.id, "b1");
        assert_eq!(summary.name, "Sprint");
    }
}
