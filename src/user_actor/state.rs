use serde::{Deserialize, Serialize};

use crate::domain::{Claim, User, UserLoginInfo, UserToken};

/// Persisted snapshot of one user actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActorState {
    pub user: User,
    pub claims: Vec<Claim>,
    pub logins: Vec<UserLoginInfo>,
    pub tokens: Vec<UserToken>,
}

impl UserActorState {
    pub fn new(user: User) -> Self {
        Self {
            user,
            ..Self::default()
        }
    }
}
