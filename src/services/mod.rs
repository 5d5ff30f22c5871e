//! Index service facades.
//!
//! Each service turns structured input into the identity of an index actor
//! and forwards the call. Required strings are validated and the caller's
//! cancellation token is checked before any mutating call is issued. Every
//! operation is idempotent, so callers may retry freely.

mod partition;
mod role_index;
mod user_index;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::actor_framework::ActorProxyFactory;
use crate::error::{ensure_not_cancelled, Result};
use crate::keys::ActorAddress;

pub use partition::UserPartitionService;
pub use role_index::{RoleClaimsIndexService, RoleCollectionService, RoleIndexServices, RoleNameIndexService};
pub use user_index::{
    UserClaimsIndexService, UserCollectionService, UserEmailIndexService, UserIndexServices, UserLoginIndexService,
    UserNameIndexService, UserTokenIndexService,
};

/// Key → single id mapping backed by key-value actors of one type.
#[derive(Clone)]
pub(crate) struct KeyValueIndex {
    factory: Arc<dyn ActorProxyFactory>,
    actor_type: &'static str,
}

impl KeyValueIndex {
    pub(crate) fn new(factory: Arc<dyn ActorProxyFactory>, actor_type: &'static str) -> Self {
        Self { factory, actor_type }
    }

    fn address(&self, key: String) -> ActorAddress {
        ActorAddress::new(self.actor_type, key)
    }

    pub(crate) async fn set(&self, key: String, id: &str, cancel: &CancellationToken) -> Result<()> {
        ensure_not_cancelled(cancel)?;
        self.factory.key_value_actor(self.address(key)).set(id.to_string()).await
    }

    pub(crate) async fn get(&self, key: String) -> Result<Option<String>> {
        let value = self.factory.key_value_actor(self.address(key)).get().await?;
        Ok(value.filter(|id| !id.trim().is_empty()))
    }

    pub(crate) async fn remove(&self, key: String, cancel: &CancellationToken) -> Result<()> {
        ensure_not_cancelled(cancel)?;
        self.factory.key_value_actor(self.address(key)).remove().await
    }

    /// Points `key` at `id` unless another id holds it.
    pub(crate) async fn set_if_vacant(&self, key: String, id: &str, cancel: &CancellationToken) -> Result<bool> {
        ensure_not_cancelled(cancel)?;
        self.factory.key_value_actor(self.address(key)).set_if_vacant(id.to_string()).await
    }

    /// Removes `key` only while it still points at `id`.
    pub(crate) async fn remove_if(&self, key: String, id: &str, cancel: &CancellationToken) -> Result<bool> {
        ensure_not_cancelled(cancel)?;
        self.factory.key_value_actor(self.address(key)).remove_if(id.to_string()).await
    }
}

/// Key → set of ids backed by key-hash actors of one type.
#[derive(Clone)]
pub(crate) struct KeyHashIndex {
    factory: Arc<dyn ActorProxyFactory>,
    actor_type: &'static str,
}

impl KeyHashIndex {
    pub(crate) fn new(factory: Arc<dyn ActorProxyFactory>, actor_type: &'static str) -> Self {
        Self { factory, actor_type }
    }

    fn address(&self, key: String) -> ActorAddress {
        ActorAddress::new(self.actor_type, key)
    }

    pub(crate) async fn add(&self, key: String, id: &str, cancel: &CancellationToken) -> Result<usize> {
        ensure_not_cancelled(cancel)?;
        self.factory.key_hash_actor(self.address(key)).add(id.to_string()).await
    }

    pub(crate) async fn all(&self, key: String, skip: usize, take: usize) -> Result<Vec<String>> {
        self.factory.key_hash_actor(self.address(key)).all(skip, take).await
    }

    pub(crate) async fn remove(&self, key: String, id: &str, cancel: &CancellationToken) -> Result<()> {
        ensure_not_cancelled(cancel)?;
        self.factory.key_hash_actor(self.address(key)).remove(id.to_string()).await
    }
}
