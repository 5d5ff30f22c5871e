//! Actor type names and the identities of index actors.
//!
//! Composite index keys are encoded as a JSON array of their parts, so a `-`
//! (or any other character) inside a claim type or provider name can never
//! make two different keys collide.

use crate::error::{require_non_blank, Result};

pub const USER_ACTOR_TYPE: &str = "User";
pub const ROLE_ACTOR_TYPE: &str = "Role";

pub const USER_COLLECTION_ACTOR_TYPE: &str = "Users";
pub const ROLE_COLLECTION_ACTOR_TYPE: &str = "Roles";
pub const ALL_USERS_COLLECTION_ID: &str = "AllUsers";
pub const ALL_ROLES_COLLECTION_ID: &str = "AllRoles";

pub const USER_NAME_INDEX_ACTOR_TYPE: &str = "UserNameIndex";
pub const USER_EMAIL_INDEX_ACTOR_TYPE: &str = "UserEmailIndex";
pub const USER_LOGIN_INDEX_ACTOR_TYPE: &str = "UserLoginIndex";
pub const USER_TOKEN_INDEX_ACTOR_TYPE: &str = "UserTokenIndex";
pub const USER_CLAIM_INDEX_ACTOR_TYPE: &str = "UserClaimIndex";
pub const ROLE_NAME_INDEX_ACTOR_TYPE: &str = "RoleNameIndex";
pub const ROLE_CLAIM_INDEX_ACTOR_TYPE: &str = "RoleClaimIndex";

/// State slot holding an entity actor's snapshot.
pub const ENTITY_STATE_NAME: &str = "State";

/// Address of one actor instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorAddress {
    pub actor_type: &'static str,
    pub actor_id: String,
}

impl ActorAddress {
    pub fn new(actor_type: &'static str, actor_id: impl Into<String>) -> Self {
        Self {
            actor_type,
            actor_id: actor_id.into(),
        }
    }
}

impl std::fmt::Display for ActorAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.actor_type, self.actor_id)
    }
}

fn composite(parts: &[&str]) -> String {
    // Serializing a slice of strings cannot fail.
    serde_json::to_string(parts).unwrap_or_default()
}

/// Key of the claim index: claim type plus claim value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClaimKey<'a> {
    pub claim_type: &'a str,
    pub value: &'a str,
}

impl<'a> ClaimKey<'a> {
    /// The claim type is required, the value may be empty.
    pub fn new(claim_type: &'a str, value: &'a str) -> Result<Self> {
        require_non_blank(claim_type, "claim type")?;
        Ok(Self { claim_type, value })
    }

    pub fn actor_id(&self) -> String {
        composite(&[self.claim_type, self.value])
    }
}

/// Key of the login index: provider plus provider key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoginKey<'a> {
    pub login_provider: &'a str,
    pub provider_key: &'a str,
}

impl<'a> LoginKey<'a> {
    pub fn new(login_provider: &'a str, provider_key: &'a str) -> Result<Self> {
        require_non_blank(login_provider, "login provider")?;
        require_non_blank(provider_key, "provider key")?;
        Ok(Self {
            login_provider,
            provider_key,
        })
    }

    pub fn actor_id(&self) -> String {
        composite(&[self.login_provider, self.provider_key])
    }
}

/// Key of the token index: provider plus token name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenKey<'a> {
    pub login_provider: &'a str,
    pub name: &'a str,
}

impl<'a> TokenKey<'a> {
    pub fn new(login_provider: &'a str, name: &'a str) -> Result<Self> {
        require_non_blank(login_provider, "login provider")?;
        require_non_blank(name, "token name")?;
        Ok(Self {
            login_provider,
            name,
        })
    }

    pub fn actor_id(&self) -> String {
        composite(&[self.login_provider, self.name])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IdentityError;

    #[test]
    fn test_claim_keys_do_not_collide_on_separator() {
        let a = ClaimKey::new("a-b", "c").unwrap();
        let b = ClaimKey::new("a", "b-c").unwrap();
        assert_ne!(a.actor_id(), b.actor_id());
        assert_eq!(a.actor_id(), r#"["a-b","c"]"#);
    }

    #[test]
    fn test_claim_value_may_be_empty() {
        let key = ClaimKey::new("department", "").unwrap();
        assert_eq!(key.actor_id(), r#"["department",""]"#);
        assert!(matches!(ClaimKey::new(" ", "x"), Err(IdentityError::InvalidArgument(_))));
    }

    #[test]
    fn test_login_key_requires_both_parts() {
        assert!(LoginKey::new("Google", "").is_err());
        assert!(LoginKey::new("", "k1").is_err());
        let key = LoginKey::new("Google", "k1").unwrap();
        assert_eq!(key.actor_id(), r#"["Google","k1"]"#);
    }

    #[test]
    fn test_token_key_differs_from_login_key_type() {
        let token = TokenKey::new("Google", "access_token").unwrap();
        assert_eq!(token.actor_id(), r#"["Google","access_token"]"#);
        assert!(TokenKey::new("Google", " ").is_err());
    }
}
