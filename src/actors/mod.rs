//! The actor runtime: one directory of activations per actor implementation.

use std::sync::{Arc, Weak};

use tracing::{info, instrument};

use crate::actor_framework::{closed_mailbox, ActorDirectory, ActorProxyFactory};
use crate::clients::{KeyHashClient, KeyValueClient, RoleActorClient, UserActorClient};
use crate::config::IdentityStoreConfig;
use crate::index_actor::{KeyHashActor, KeyValueActor};
use crate::keys::{ActorAddress, ROLE_ACTOR_TYPE, USER_ACTOR_TYPE};
use crate::role_actor::RoleActor;
use crate::services::{RoleIndexServices, UserIndexServices};
use crate::state::{ActorStateManager, StateStore};
use crate::user_actor::UserActor;

struct Inner {
    config: IdentityStoreConfig,
    state_store: Arc<dyn StateStore>,
    users: ActorDirectory<UserActor>,
    roles: ActorDirectory<RoleActor>,
    key_values: ActorDirectory<KeyValueActor>,
    key_hashes: ActorDirectory<KeyHashActor>,
}

/// Hosts every actor of the identity store on top of one state store.
///
/// Cloning is cheap; all clones share the same activations.
#[derive(Clone)]
pub struct ActorSystem {
    inner: Arc<Inner>,
}

impl ActorSystem {
    pub fn new(config: IdentityStoreConfig, state_store: Arc<dyn StateStore>) -> Self {
        let capacity = config.mailbox_capacity;
        Self {
            inner: Arc::new(Inner {
                config,
                state_store,
                users: ActorDirectory::new(capacity),
                roles: ActorDirectory::new(capacity),
                key_values: ActorDirectory::new(capacity),
                key_hashes: ActorDirectory::new(capacity),
            }),
        }
    }

    pub fn config(&self) -> &IdentityStoreConfig {
        &self.inner.config
    }

    /// Factory handed to stores and services.
    pub fn proxy_factory(&self) -> Arc<dyn ActorProxyFactory> {
        Arc::new(self.clone())
    }

    // Actors only hold a weak handle, so a dropped system is not kept alive
    // by its own activations.
    fn actor_factory(&self) -> Arc<dyn ActorProxyFactory> {
        Arc::new(WeakActorSystem(Arc::downgrade(&self.inner)))
    }

    fn state_manager(&self, address: &ActorAddress) -> ActorStateManager {
        ActorStateManager::new(self.inner.state_store.clone(), address.clone())
    }

    /// Drops the activation at `address`; the next call reloads its state.
    #[instrument(skip(self))]
    pub fn deactivate(&self, address: &ActorAddress) -> bool {
        match address.actor_type {
            USER_ACTOR_TYPE => self.inner.users.deactivate(address),
            ROLE_ACTOR_TYPE => self.inner.roles.deactivate(address),
            _ => self.inner.key_values.deactivate(address) || self.inner.key_hashes.deactivate(address),
        }
    }

    pub fn active_count(&self) -> usize {
        self.inner.users.active_count()
            + self.inner.roles.active_count()
            + self.inner.key_values.active_count()
            + self.inner.key_hashes.active_count()
    }

    /// Stops every actor.
    ///
    /// Entity actors go first since their in-flight requests may still call
    /// index actors.
    pub async fn shutdown(&self) -> Result<(), String> {
        info!("Shutting down actor system");
        self.inner.users.shutdown().await?;
        self.inner.roles.shutdown().await?;
        self.inner.key_values.shutdown().await?;
        self.inner.key_hashes.shutdown().await?;
        info!("Actor system stopped");
        Ok(())
    }
}

impl ActorProxyFactory for ActorSystem {
    fn user_actor(&self, user_id: &str) -> UserActorClient {
        let address = ActorAddress::new(USER_ACTOR_TYPE, user_id);
        let sender = self.inner.users.mailbox(&address, || {
            UserActor::new(
                user_id,
                self.state_manager(&address),
                UserIndexServices::new(self.actor_factory()),
                self.inner.config.default_user_claims.clone(),
            )
        });
        UserActorClient::new(address, sender)
    }

    fn role_actor(&self, role_id: &str) -> RoleActorClient {
        let address = ActorAddress::new(ROLE_ACTOR_TYPE, role_id);
        let sender = self.inner.roles.mailbox(&address, || {
            RoleActor::new(
                role_id,
                self.state_manager(&address),
                RoleIndexServices::new(self.actor_factory()),
            )
        });
        RoleActorClient::new(address, sender)
    }

    fn key_value_actor(&self, address: ActorAddress) -> KeyValueClient {
        let sender = self
            .inner
            .key_values
            .mailbox(&address, || KeyValueActor::new(self.state_manager(&address)));
        KeyValueClient::new(address, sender)
    }

    fn key_hash_actor(&self, address: ActorAddress) -> KeyHashClient {
        let sender = self
            .inner
            .key_hashes
            .mailbox(&address, || KeyHashActor::new(self.state_manager(&address)));
        KeyHashClient::new(address, sender)
    }
}

struct WeakActorSystem(Weak<Inner>);

impl WeakActorSystem {
    fn upgrade(&self) -> Option<ActorSystem> {
        self.0.upgrade().map(|inner| ActorSystem { inner })
    }
}

impl ActorProxyFactory for WeakActorSystem {
    fn user_actor(&self, user_id: &str) -> UserActorClient {
        match self.upgrade() {
            Some(system) => system.user_actor(user_id),
            None => UserActorClient::new(ActorAddress::new(USER_ACTOR_TYPE, user_id), closed_mailbox()),
        }
    }

    fn role_actor(&self, role_id: &str) -> RoleActorClient {
        match self.upgrade() {
            Some(system) => system.role_actor(role_id),
            None => RoleActorClient::new(ActorAddress::new(ROLE_ACTOR_TYPE, role_id), closed_mailbox()),
        }
    }

    fn key_value_actor(&self, address: ActorAddress) -> KeyValueClient {
        match self.upgrade() {
            Some(system) => system.key_value_actor(address),
            None => KeyValueClient::new(address, closed_mailbox()),
        }
    }

    fn key_hash_actor(&self, address: ActorAddress) -> KeyHashClient {
        match self.upgrade() {
            Some(system) => system.key_hash_actor(address),
            None => KeyHashClient::new(address, closed_mailbox()),
        }
    }
}
