//! MIS staff model

use serde::{Deserialize, Serialize};

/// Staff member available for ticket assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRef {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl StaffRef {
    /// Display name used by search, staff filtering, and assignment dropdowns
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
