use std::sync::Arc;

use tracing::info;

use crate::actors::ActorSystem;
use crate::config::IdentityStoreConfig;
use crate::services::UserPartitionService;
use crate::state::{InMemoryStateStore, StateStore};
use crate::stores::{RoleStore, UserStore};

/// The identity store with everything wired together.
///
/// Responsible for starting the actor runtime, building the stores on top of
/// it, and shutting it down.
pub struct IdentitySystem {
    pub users: UserStore,
    pub roles: RoleStore,
    pub partitions: UserPartitionService,
    runtime: ActorSystem,
}

impl IdentitySystem {
    pub fn new(config: IdentityStoreConfig, state_store: Arc<dyn StateStore>) -> Self {
        info!(
            mailbox_capacity = config.mailbox_capacity,
            default_partition = %config.default_partition,
            "Starting identity system"
        );
        let default_partition = config.default_partition.clone();
        let runtime = ActorSystem::new(config, state_store);
        let users = UserStore::new(runtime.proxy_factory());
        let roles = RoleStore::new(runtime.proxy_factory());
        let partitions = UserPartitionService::new(users.clone(), default_partition);

        Self {
            users,
            roles,
            partitions,
            runtime,
        }
    }

    /// A system over a fresh in-memory state store.
    pub fn in_memory(config: IdentityStoreConfig) -> Self {
        Self::new(config, Arc::new(InMemoryStateStore::new()))
    }

    pub fn runtime(&self) -> &ActorSystem {
        &self.runtime
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        // Stores hold the runtime too; drop them so nothing can reach it.
        drop(self.users);
        drop(self.roles);
        drop(self.partitions);
        self.runtime.shutdown().await?;
        info!("System shutdown complete.");
        Ok(())
    }
}
