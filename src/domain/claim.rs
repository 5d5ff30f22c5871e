use serde::{Deserialize, Serialize};

/// Claim type used for role membership claims.
pub const ROLE_CLAIM_TYPE: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";

/// Role granted to every user at creation unless configured otherwise.
pub const GLOBAL_ADMINISTRATOR_ROLE: &str = "GlobalAdministrator";

/// A type/value pair owned by a user or a role.
///
/// Two claims are the same claim when both type and value match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self::new(ROLE_CLAIM_TYPE, role)
    }

    pub fn matches(&self, claim_type: &str, value: &str) -> bool {
        self.claim_type == claim_type && self.value == value
    }
}

/// Merges `additions` into `claims`, skipping claims already present.
///
/// Returns the claims that were actually added, in input order.
pub fn union_claims(claims: &mut Vec<Claim>, additions: impl IntoIterator<Item = Claim>) -> Vec<Claim> {
    let mut added = Vec::new();
    for claim in additions {
        if !claims.contains(&claim) {
            claims.push(claim.clone());
            added.push(claim);
        }
    }
    added
}
