//! Agent types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AgentId, CoreError, TaskAssignment};

/// A non-administrative user that receives distributed tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Unique agent identifier.
    pub id: AgentId,

    /// Display name.
    pub name: String,

    /// Login email, stored lowercased.
    pub email: String,

    /// Mobile number without country code.
    pub mob_number: String,

    /// Dialling prefix, e.g. `+44`.
    pub country_code: String,

    /// Assigned tasks, oldest first. Only ever appended to.
    #[serde(default)]
    pub tasks: Vec<TaskAssignment>,

    /// When the agent was registered.
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// Create an agent from a validated registration.
    pub fn register(registration: AgentRegistration) -> Self {
        Self {
            id: AgentId::generate(),
            name: registration.name,
            email: registration.email,
            mob_number: registration.mob_number,
            country_code: registration.country_code,
            tasks: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Builder method to set a specific ID (useful for testing).
    pub fn with_id(mut self, id: AgentId) -> Self {
        self.id = id;
        self
    }

    /// Append tasks after the existing ones.
    pub fn append_tasks(&mut self, tasks: impl IntoIterator<Item = TaskAssignment>) {
        self.tasks.extend(tasks);
    }

    /// Public view of the agent returned by single-agent lookups.
    pub fn profile(&self) -> AgentProfile {
        AgentProfile {
            name: self.name.clone(),
            email: self.email.clone(),
            mob_number: self.mob_number.clone(),
            country_code: self.country_code.clone(),
            tasks: self.tasks.clone(),
        }
    }
}

/// Fields returned when fetching one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    pub name: String,
    pub email: String,
    pub mob_number: String,
    pub country_code: String,
    pub tasks: Vec<TaskAssignment>,
}

/// Registration request for a new agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRegistration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mob_number: String,
    #[serde(default = "default_country_code")]
    pub country_code: String,
}

fn default_country_code() -> String {
    "+1".to_string()
}

impl AgentRegistration {
    /// Create a new registration with the default country code.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        mob_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            mob_number: mob_number.into(),
            country_code: default_country_code(),
        }
    }

    /// Builder method to set the country code.
    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = country_code.into();
        self
    }

    /// Trim and normalize the fields, rejecting blanks.
    ///
    /// Names are trimmed and emails lowercased before uniqueness checks.
    pub fn normalize(self) -> Result<Self, CoreError> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_lowercase();
        let mob_number = self.mob_number.trim().to_string();
        let country_code = self.country_code.trim().to_string();

        let missing: Vec<&str> = [
            ("name", &name),
            ("email", &email),
            ("mobNumber", &mob_number),
            ("countryCode", &country_code),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "Please fill in all fields: missing {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            name,
            email,
            mob_number,
            country_code,
        })
    }
}
