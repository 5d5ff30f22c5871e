/// A coded failure reported by the stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFailure {
    pub code: &'static str,
    pub description: String,
}

impl IdentityFailure {
    pub fn duplicate_user_id(user_id: &str) -> Self {
        Self {
            code: "DuplicateUserId",
            description: format!("User id '{user_id}' is already taken."),
        }
    }

    pub fn duplicate_user_name(user_name: &str) -> Self {
        Self {
            code: "DuplicateUserName",
            description: format!("Username '{user_name}' is already taken."),
        }
    }

    pub fn duplicate_email(email: &str) -> Self {
        Self {
            code: "DuplicateEmail",
            description: format!("Email '{email}' is already taken."),
        }
    }

    pub fn duplicate_role_name(role_name: &str) -> Self {
        Self {
            code: "DuplicateRoleName",
            description: format!("Role name '{role_name}' is already taken."),
        }
    }

    pub fn login_already_associated(login_provider: &str) -> Self {
        Self {
            code: "LoginAlreadyAssociated",
            description: format!("A user with this {login_provider} login already exists."),
        }
    }

    pub fn user_not_found(user_id: &str) -> Self {
        Self {
            code: "UserNotFound",
            description: format!("A user with the Id '{user_id}' could not be found."),
        }
    }

    pub fn role_not_found(role_id: &str) -> Self {
        Self {
            code: "RoleNotFound",
            description: format!("Role '{role_id}' not found."),
        }
    }
}

/// Outcome of a store operation that can fail for domain reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityResult {
    Success,
    Failed(Vec<IdentityFailure>),
}

impl IdentityResult {
    pub fn failed(failure: IdentityFailure) -> Self {
        IdentityResult::Failed(vec![failure])
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, IdentityResult::Success)
    }

    /// Codes of the failures, empty on success.
    pub fn codes(&self) -> Vec<&'static str> {
        match self {
            IdentityResult::Success => Vec::new(),
            IdentityResult::Failed(failures) => failures.iter().map(|f| f.code).collect(),
        }
    }
}
