use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{KeyHashIndex, KeyValueIndex};
use crate::actor_framework::ActorProxyFactory;
use crate::error::{require_non_blank, Result};
use crate::keys::{
    ClaimKey, ALL_ROLES_COLLECTION_ID, ROLE_CLAIM_INDEX_ACTOR_TYPE, ROLE_COLLECTION_ACTOR_TYPE,
    ROLE_NAME_INDEX_ACTOR_TYPE,
};

/// The set of every role id.
#[derive(Clone)]
pub struct RoleCollectionService {
    index: KeyHashIndex,
}

impl RoleCollectionService {
    pub fn new(factory: Arc<dyn ActorProxyFactory>) -> Self {
        Self {
            index: KeyHashIndex::new(factory, ROLE_COLLECTION_ACTOR_TYPE),
        }
    }

    pub async fn add(&self, role_id: &str, cancel: &CancellationToken) -> Result<usize> {
        require_non_blank(role_id, "role id")?;
        self.index.add(ALL_ROLES_COLLECTION_ID.to_string(), role_id, cancel).await
    }

    pub async fn all(&self, skip: usize, take: usize) -> Result<Vec<String>> {
        self.index.all(ALL_ROLES_COLLECTION_ID.to_string(), skip, take).await
    }

    pub async fn remove(&self, role_id: &str, cancel: &CancellationToken) -> Result<()> {
        require_non_blank(role_id, "role id")?;
        self.index.remove(ALL_ROLES_COLLECTION_ID.to_string(), role_id, cancel).await
    }
}

/// Normalized role name → role id.
#[derive(Clone)]
pub struct RoleNameIndexService {
    index: KeyValueIndex,
}

impl RoleNameIndexService {
    pub fn new(factory: Arc<dyn ActorProxyFactory>) -> Self {
        Self {
            index: KeyValueIndex::new(factory, ROLE_NAME_INDEX_ACTOR_TYPE),
        }
    }

    pub async fn add(&self, normalized_name: &str, role_id: &str, cancel: &CancellationToken) -> Result<()> {
        require_non_blank(normalized_name, "role name")?;
        require_non_blank(role_id, "role id")?;
        self.index.set(normalized_name.to_string(), role_id, cancel).await
    }

    pub async fn find_role_id(&self, normalized_name: &str) -> Result<Option<String>> {
        require_non_blank(normalized_name, "role name")?;
        self.index.get(normalized_name.to_string()).await
    }

    pub async fn remove(&self, normalized_name: &str, cancel: &CancellationToken) -> Result<()> {
        require_non_blank(normalized_name, "role name")?;
        self.index.remove(normalized_name.to_string(), cancel).await
    }
}

/// Claim (type, value) → ids of the roles holding it.
#[derive(Clone)]
pub struct RoleClaimsIndexService {
    index: KeyHashIndex,
}

impl RoleClaimsIndexService {
    pub fn new(factory: Arc<dyn ActorProxyFactory>) -> Self {
        Self {
            index: KeyHashIndex::new(factory, ROLE_CLAIM_INDEX_ACTOR_TYPE),
        }
    }

    pub async fn add(&self, claim_type: &str, value: &str, role_id: &str, cancel: &CancellationToken) -> Result<()> {
        let key = ClaimKey::new(claim_type, value)?;
        require_non_blank(role_id, "role id")?;
        self.index.add(key.actor_id(), role_id, cancel).await.map(|_| ())
    }

    pub async fn find_role_ids(&self, claim_type: &str, value: &str) -> Result<Vec<String>> {
        let key = ClaimKey::new(claim_type, value)?;
        self.index.all(key.actor_id(), 0, 0).await
    }

    pub async fn remove(&self, claim_type: &str, value: &str, role_id: &str, cancel: &CancellationToken) -> Result<()> {
        let key = ClaimKey::new(claim_type, value)?;
        require_non_blank(role_id, "role id")?;
        self.index.remove(key.actor_id(), role_id, cancel).await
    }
}

/// Every index a role actor maintains.
#[derive(Clone)]
pub struct RoleIndexServices {
    pub collection: RoleCollectionService,
    pub names: RoleNameIndexService,
    pub claims: RoleClaimsIndexService,
}

impl RoleIndexServices {
    pub fn new(factory: Arc<dyn ActorProxyFactory>) -> Self {
        Self {
            collection: RoleCollectionService::new(factory.clone()),
            names: RoleNameIndexService::new(factory.clone()),
            claims: RoleClaimsIndexService::new(factory),
        }
    }
}
