use std::fmt;

use serde::{Deserialize, Serialize};

/// Authentication token stored for a user, unique by provider and name.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserToken {
    pub user_id: String,
    pub login_provider: String,
    pub name: String,
    pub value: Option<String>,
}

impl UserToken {
    pub fn new(
        user_id: impl Into<String>,
        login_provider: impl Into<String>,
        name: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            login_provider: login_provider.into(),
            name: name.into(),
            value,
        }
    }

    pub fn matches(&self, login_provider: &str, name: &str) -> bool {
        self.login_provider == login_provider && self.name == name
    }
}

// Token values are secrets and stay out of logs.
impl fmt::Debug for UserToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserToken")
            .field("user_id", &self.user_id)
            .field("login_provider", &self.login_provider)
            .field("name", &self.name)
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
