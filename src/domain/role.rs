use serde::{Deserialize, Serialize};

use super::normalize_key;

/// Represents a role that users can be granted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: Option<String>,
    pub normalized_name: Option<String>,
    pub external_id: Option<String>,
    pub external_data: Option<String>,
}

impl Role {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            normalized_name: Some(normalize_key(&name)),
            name: Some(name),
            ..Self::default()
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.normalized_name = Some(normalize_key(&name));
        self.name = Some(name);
    }
}
