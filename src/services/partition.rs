use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::domain::{non_blank, normalize_key, IdentityResult, User};
use crate::error::{require_non_blank, IdentityError, Result};
use crate::stores::UserStore;

/// Resolves the partitions a user may work in.
///
/// Users without any partition are assigned the default partition on first
/// lookup and the assignment is saved.
#[derive(Clone)]
pub struct UserPartitionService {
    users: UserStore,
    default_partition: String,
}

impl UserPartitionService {
    pub fn new(users: UserStore, default_partition: impl Into<String>) -> Self {
        Self {
            users,
            default_partition: default_partition.into(),
        }
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_default_partition(&self, user_name: &str, cancel: &CancellationToken) -> Result<String> {
        let user = self.find_user(user_name).await?;
        let current = non_blank(user.default_partition.as_deref())
            .or_else(|| user.partitions.first().map(String::as_str).filter(|p| !p.trim().is_empty()))
            .map(str::to_string);
        match current {
            Some(partition) => Ok(partition),
            None => Ok(self.assign_default(user, cancel).await?.0),
        }
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_partitions(&self, user_name: &str, cancel: &CancellationToken) -> Result<Vec<String>> {
        let user = self.find_user(user_name).await?;
        if !user.partitions.is_empty() {
            return Ok(user.partitions);
        }
        Ok(self.assign_default(user, cancel).await?.1)
    }

    pub async fn in_partition(&self, user_name: &str, partition: &str, cancel: &CancellationToken) -> Result<bool> {
        let partitions = self.get_partitions(user_name, cancel).await?;
        Ok(partitions.iter().any(|p| p == partition))
    }

    async fn find_user(&self, user_name: &str) -> Result<User> {
        require_non_blank(user_name, "user name")?;
        let normalized = normalize_key(user_name);
        self.users
            .find_by_name(&normalized)
            .await?
            .ok_or_else(|| IdentityError::NotFound {
                operation: "Get partitions",
                entity: "User name",
                id: normalized,
            })
    }

    /// Saves the default partition as the user's only partition.
    async fn assign_default(&self, mut user: User, cancel: &CancellationToken) -> Result<(String, Vec<String>)> {
        let partition = self.default_partition.clone();
        user.default_partition = Some(partition.clone());
        user.partitions = vec![partition.clone()];
        let partitions = user.partitions.clone();

        if let IdentityResult::Failed(failures) = self.users.update(user, cancel).await? {
            warn!(partition = %partition, "Default partition not saved");
            return Err(IdentityError::Rejected(failures));
        }
        info!(partition = %partition, "Default partition assigned");
        Ok((partition, partitions))
    }
}
