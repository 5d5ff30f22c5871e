//! Identity entities and the value types they own.

pub mod claim;
pub mod login;
pub mod result;
pub mod role;
pub mod token;
pub mod user;

pub use claim::*;
pub use login::*;
pub use result::*;
pub use role::*;
pub use token::*;
pub use user::*;

/// Normalizes a user name, email or role name into its lookup key.
pub fn normalize_key(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Returns the value when it is present and not blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
