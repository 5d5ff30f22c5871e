use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::collect_found;
use crate::actor_framework::ActorProxyFactory;
use crate::domain::{non_blank, Claim, IdentityFailure, IdentityResult, Role};
use crate::error::{ensure_not_cancelled, require_non_blank, Result};
use crate::services::RoleIndexServices;

/// Role store backed by role actors and their indexes.
#[derive(Clone)]
pub struct RoleStore {
    factory: Arc<dyn ActorProxyFactory>,
    indexes: RoleIndexServices,
}

impl RoleStore {
    pub fn new(factory: Arc<dyn ActorProxyFactory>) -> Self {
        Self {
            indexes: RoleIndexServices::new(factory.clone()),
            factory,
        }
    }

    #[instrument(skip_all, fields(role_id = %role.id))]
    pub async fn create(&self, role: Role, cancel: &CancellationToken) -> Result<IdentityResult> {
        ensure_not_cancelled(cancel)?;
        require_non_blank(&role.id, "role id")?;
        if let Some(failure) = self.find_conflict(&role).await? {
            return Ok(IdentityResult::failed(failure));
        }

        let failure = IdentityFailure::duplicate_role_name(role.name.as_deref().unwrap_or(&role.id));
        let role_id = role.id.clone();
        if !self.factory.role_actor(&role_id).create(role, cancel.clone()).await? {
            return Ok(IdentityResult::failed(failure));
        }
        info!("Role stored");
        Ok(IdentityResult::Success)
    }

    #[instrument(skip(self, cancel))]
    pub async fn delete(&self, role_id: &str, cancel: &CancellationToken) -> Result<IdentityResult> {
        ensure_not_cancelled(cancel)?;
        require_non_blank(role_id, "role id")?;
        self.factory.role_actor(role_id).delete(cancel.clone()).await?;
        Ok(IdentityResult::Success)
    }

    pub async fn find_by_id(&self, role_id: &str) -> Result<Option<Role>> {
        require_non_blank(role_id, "role id")?;
        self.factory.role_actor(role_id).find().await
    }

    pub async fn find_by_name(&self, normalized_name: &str) -> Result<Option<Role>> {
        match self.indexes.names.find_role_id(normalized_name).await? {
            Some(role_id) => self.find_by_id(&role_id).await,
            None => Ok(None),
        }
    }

    #[instrument(skip_all, fields(role_id = %role.id))]
    pub async fn update(&self, role: Role, cancel: &CancellationToken) -> Result<IdentityResult> {
        ensure_not_cancelled(cancel)?;
        if self.find_by_id(&role.id).await?.is_none() {
            return Ok(IdentityResult::failed(IdentityFailure::role_not_found(&role.id)));
        }
        if let Some(failure) = self.find_conflict(&role).await? {
            return Ok(IdentityResult::failed(failure));
        }
        let role_id = role.id.clone();
        self.factory.role_actor(&role_id).update(role, cancel.clone()).await?;
        Ok(IdentityResult::Success)
    }

    pub async fn roles(&self) -> Result<Vec<Role>> {
        let role_ids = self.indexes.collection.all(0, 0).await?;
        let finds = role_ids.iter().map(|role_id| self.find_by_id(role_id));
        collect_found(join_all(finds).await)
    }

    async fn find_conflict(&self, role: &Role) -> Result<Option<IdentityFailure>> {
        let Some(name) = non_blank(role.normalized_name.as_deref()) else {
            return Ok(None);
        };
        match self.indexes.names.find_role_id(name).await? {
            Some(owner) if owner != role.id => Ok(Some(IdentityFailure::duplicate_role_name(
                role.name.as_deref().unwrap_or(name),
            ))),
            _ => Ok(None),
        }
    }

    pub async fn add_claim(&self, role_id: &str, claim: Claim, cancel: &CancellationToken) -> Result<()> {
        ensure_not_cancelled(cancel)?;
        require_non_blank(role_id, "role id")?;
        self.factory.role_actor(role_id).add_claims(vec![claim], cancel.clone()).await
    }

    pub async fn get_claims(&self, role_id: &str) -> Result<Vec<Claim>> {
        require_non_blank(role_id, "role id")?;
        self.factory.role_actor(role_id).get_claims().await
    }

    pub async fn remove_claim(&self, role_id: &str, claim: Claim, cancel: &CancellationToken) -> Result<()> {
        ensure_not_cancelled(cancel)?;
        require_non_blank(role_id, "role id")?;
        self.factory
            .role_actor(role_id)
            .remove_claims(vec![claim], cancel.clone())
            .await
    }

    /// Roles holding `claim`, confirmed against each role's claims.
    #[instrument(skip(self))]
    pub async fn get_roles_for_claim(&self, claim: &Claim) -> Result<Vec<Role>> {
        let candidates = self.indexes.claims.find_role_ids(&claim.claim_type, &claim.value).await?;
        let checks = candidates
            .iter()
            .map(|role_id| self.role_if_has_claim(role_id, claim));
        collect_found(join_all(checks).await)
    }

    async fn role_if_has_claim(&self, role_id: &str, claim: &Claim) -> Result<Option<Role>> {
        let actor = self.factory.role_actor(role_id);
        if !actor.get_claims().await?.contains(claim) {
            warn!(role_id = %role_id, "Stale claim index entry");
            return Ok(None);
        }
        actor.find().await
    }

    #[instrument(skip_all)]
    pub async fn rebuild_indexes(&self, cancel: &CancellationToken) -> Result<usize> {
        let mut reindexed = 0;
        for role_id in self.indexes.collection.all(0, 0).await? {
            ensure_not_cancelled(cancel)?;
            if self.factory.role_actor(&role_id).reindex(cancel.clone()).await? {
                reindexed += 1;
            }
        }
        info!(reindexed, "Role indexes rebuilt");
        Ok(reindexed)
    }
}
