use std::env;

use tracing::warn;

use crate::domain::{Claim, GLOBAL_ADMINISTRATOR_ROLE};

pub const MAILBOX_CAPACITY_VAR: &str = "IDENTITY_STORE_MAILBOX_CAPACITY";
pub const DEFAULT_PARTITION_VAR: &str = "IDENTITY_STORE_DEFAULT_PARTITION";
pub const DEFAULT_ROLE_VAR: &str = "IDENTITY_STORE_DEFAULT_ROLE";

/// Settings of the identity actor system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityStoreConfig {
    /// Buffer size of every actor mailbox.
    pub mailbox_capacity: usize,
    /// Partition assigned to users that have none.
    pub default_partition: String,
    /// Claims every user is seeded with at creation.
    pub default_user_claims: Vec<Claim>,
}

impl Default for IdentityStoreConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 32,
            default_partition: "default".to_string(),
            default_user_claims: vec![Claim::role(GLOBAL_ADMINISTRATOR_ROLE)],
        }
    }
}

impl IdentityStoreConfig {
    /// Reads overrides from the environment, keeping defaults for unset or
    /// invalid values.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAILBOX_CAPACITY_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => config.mailbox_capacity = capacity,
                _ => warn!(var = MAILBOX_CAPACITY_VAR, value = %raw, "Invalid mailbox capacity, using default"),
            }
        }

        if let Some(partition) = lookup(DEFAULT_PARTITION_VAR) {
            if partition.trim().is_empty() {
                warn!(var = DEFAULT_PARTITION_VAR, "Empty default partition, using default");
            } else {
                config.default_partition = partition.trim().to_string();
            }
        }

        if let Some(role) = lookup(DEFAULT_ROLE_VAR) {
            config.default_user_claims = match role.trim() {
                "" => Vec::new(),
                role => vec![Claim::role(role)],
            };
        }

        config
    }
}
