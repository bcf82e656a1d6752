//! Category payloads

use serde::{Deserialize, Serialize};

use super::identifiers::CategoryId;

/// A spending or income category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Identifier
    pub id: CategoryId,
    /// Display name
    pub name: String,
}

/// New category
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    /// Display name
    pub name: String,
}
