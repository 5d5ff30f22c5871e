use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::RoleActor;
use crate::domain::{union_claims, Claim};
use crate::error::{require_non_blank, Result};

impl RoleActor {
    #[instrument(skip_all, fields(role_id = %self.id, count = claims.len()))]
    pub(super) async fn handle_add_claims(&mut self, claims: Vec<Claim>, cancel: &CancellationToken) -> Result<()> {
        for claim in &claims {
            require_non_blank(&claim.claim_type, "claim type")?;
        }
        let mut state = self.require_state("Add claims").await?;

        let added = union_claims(&mut state.claims, claims);
        if added.is_empty() {
            return Ok(());
        }
        for claim in &added {
            self.indexes
                .claims
                .add(&claim.claim_type, &claim.value, &self.id, cancel)
                .await?;
        }
        self.persist(state, cancel).await
    }

    pub(super) async fn handle_get_claims(&mut self) -> Result<Vec<Claim>> {
        Ok(self.require_state("Get claims").await?.claims)
    }

    #[instrument(skip_all, fields(role_id = %self.id, count = claims.len()))]
    pub(super) async fn handle_remove_claims(&mut self, claims: Vec<Claim>, cancel: &CancellationToken) -> Result<()> {
        for claim in &claims {
            require_non_blank(&claim.claim_type, "claim type")?;
        }
        let mut state = self.require_state("Remove claims").await?;

        let mut removed = Vec::new();
        union_claims(&mut removed, claims);
        state.claims.retain(|claim| !removed.contains(claim));
        for claim in &removed {
            self.indexes
                .claims
                .remove(&claim.claim_type, &claim.value, &self.id, cancel)
                .await?;
        }
        self.persist(state, cancel).await
    }

    #[instrument(skip_all, fields(role_id = %self.id))]
    pub(super) async fn handle_replace_claim(
        &mut self,
        claim: Claim,
        new_claim: Claim,
        cancel: &CancellationToken,
    ) -> Result<()> {
        require_non_blank(&claim.claim_type, "claim type")?;
        require_non_blank(&new_claim.claim_type, "new claim type")?;
        let mut state = self.require_state("Replace claim").await?;

        state.claims.retain(|c| c != &claim);
        union_claims(&mut state.claims, [new_claim.clone()]);
        self.indexes
            .claims
            .remove(&claim.claim_type, &claim.value, &self.id, cancel)
            .await?;
        self.indexes
            .claims
            .add(&new_claim.claim_type, &new_claim.value, &self.id, cancel)
            .await?;
        self.persist(state, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio_util::sync::CancellationToken;

    use crate::actor_framework::ActorProxyFactory;
    use crate::actors::ActorSystem;
    use crate::config::IdentityStoreConfig;
    use crate::domain::{Claim, Role};
    use crate::services::RoleIndexServices;
    use crate::state::InMemoryStateStore;

    #[tokio::test]
    async fn test_claim_lifecycle() {
        let system = ActorSystem::new(IdentityStoreConfig::default(), Arc::new(InMemoryStateStore::new()));
        let indexes = RoleIndexServices::new(system.proxy_factory());
        let cancel = CancellationToken::new();
        let actor = system.role_actor("R1");
        actor.create(Role::new("R1", "Admin"), cancel.clone()).await.unwrap();

        actor
            .add_claims(
                vec![Claim::new("permission", "read"), Claim::new("permission", "read")],
                cancel.clone(),
            )
            .await
            .unwrap();
        assert_eq!(actor.get_claims().await.unwrap(), vec![Claim::new("permission", "read")]);

        actor
            .replace_claim(Claim::new("permission", "read"), Claim::new("permission", "write"), cancel.clone())
            .await
            .unwrap();
        assert!(indexes.claims.find_role_ids("permission", "read").await.unwrap().is_empty());
        assert_eq!(indexes.claims.find_role_ids("permission", "write").await.unwrap(), vec!["R1"]);

        actor
            .remove_claims(vec![Claim::new("permission", "write")], cancel)
            .await
            .unwrap();
        assert!(actor.get_claims().await.unwrap().is_empty());
        assert!(indexes.claims.find_role_ids("permission", "write").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_claims_on_absent_role_fail() {
        let system = ActorSystem::new(IdentityStoreConfig::default(), Arc::new(InMemoryStateStore::new()));
        let err = system.role_actor("missing").get_claims().await.unwrap_err();
        assert!(err.is_not_found());
    }
}
