use serde::{Deserialize, Serialize};

use super::normalize_key;

/// Represents a registered user.
///
/// The id is immutable once the user actor has been created with it. The
/// normalized name and email are the keys of the name and email indexes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub user_name: Option<String>,
    pub normalized_user_name: Option<String>,
    pub email: Option<String>,
    pub normalized_email: Option<String>,
    pub email_confirmed: bool,
    pub password_hash: Option<String>,
    pub security_stamp: Option<String>,
    pub disabled: bool,
    pub default_partition: Option<String>,
    pub partitions: Vec<String>,
    pub external_id: Option<String>,
    pub external_data: Option<String>,
}

impl User {
    /// Creates a new User with its normalized name and email filled in.
    ///
    /// # Arguments
    /// * `id` - Identity of the user actor that will own this user
    /// * `user_name` - Login name
    /// * `email` - Email address
    pub fn new(id: impl Into<String>, user_name: impl Into<String>, email: impl Into<String>) -> Self {
        let user_name = user_name.into();
        let email = email.into();
        Self {
            id: id.into(),
            normalized_user_name: Some(normalize_key(&user_name)),
            user_name: Some(user_name),
            normalized_email: Some(normalize_key(&email)),
            email: Some(email),
            ..Self::default()
        }
    }

    /// Changes the email and its normalized form together.
    pub fn set_email(&mut self, email: impl Into<String>) {
        let email = email.into();
        self.normalized_email = Some(normalize_key(&email));
        self.email = Some(email);
    }

    /// Changes the user name and its normalized form together.
    pub fn set_user_name(&mut self, user_name: impl Into<String>) {
        let user_name = user_name.into();
        self.normalized_user_name = Some(normalize_key(&user_name));
        self.user_name = Some(user_name);
    }
}
