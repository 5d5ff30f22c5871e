use serde::{Deserialize, Serialize};

/// External login attached to a user, unique by provider and provider key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLoginInfo {
    pub login_provider: String,
    pub provider_key: String,
    pub display_name: Option<String>,
}

impl UserLoginInfo {
    pub fn new(
        login_provider: impl Into<String>,
        provider_key: impl Into<String>,
        display_name: Option<String>,
    ) -> Self {
        Self {
            login_provider: login_provider.into(),
            provider_key: provider_key.into(),
            display_name,
        }
    }

    pub fn matches(&self, login_provider: &str, provider_key: &str) -> bool {
        self.login_provider == login_provider && self.provider_key == provider_key
    }
}

/// A login resolved together with the user that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLogin {
    pub login_provider: String,
    pub provider_key: String,
    pub display_name: Option<String>,
    pub user_id: String,
}

impl UserLogin {
    pub fn from_info(info: &UserLoginInfo, user_id: impl Into<String>) -> Self {
        Self {
            login_provider: info.login_provider.clone(),
            provider_key: info.provider_key.clone(),
            display_name: info.display_name.clone(),
            user_id: user_id.into(),
        }
    }
}
