//! Lead records and the task assignments derived from them.

use serde::{Deserialize, Serialize};

/// One validated row of an uploaded lead spreadsheet.
///
/// Field names on the wire follow the spreadsheet headers (`FirstName`,
/// `Phone`, `Notes`). All three are non-empty once a record leaves the
/// ingestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    #[serde(rename = "FirstName")]
    pub first_name: String,

    #[serde(rename = "Phone")]
    pub phone: String,

    #[serde(rename = "Notes")]
    pub notes: String,
}

impl LeadRecord {
    /// Create a new LeadRecord.
    pub fn new(
        first_name: impl Into<String>,
        phone: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            phone: phone.into(),
            notes: notes.into(),
        }
    }
}

/// A lead as it is stored in an agent's task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    pub first_name: String,
    pub mob_number: String,
    pub notes: String,
}

impl TaskAssignment {
    /// Create a new TaskAssignment.
    pub fn new(
        first_name: impl Into<String>,
        mob_number: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            mob_number: mob_number.into(),
            notes: notes.into(),
        }
    }
}
