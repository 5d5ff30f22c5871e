use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::{validate_claims, UserActor};
use crate::domain::{union_claims, Claim};
use crate::error::{require_non_blank, Result};

impl UserActor {
    /// Adds the claims the user does not hold yet and indexes each of them.
    #[instrument(skip_all, fields(user_id = %self.id, count = claims.len()))]
    pub(super) async fn handle_add_claims(&mut self, claims: Vec<Claim>, cancel: &CancellationToken) -> Result<()> {
        validate_claims(&claims)?;
        let mut state = self.require_state("Add claims").await?;

        let added = union_claims(&mut state.claims, claims);
        if added.is_empty() {
            debug!("No new claims");
            return Ok(());
        }
        for claim in &added {
            self.indexes
                .claims
                .add(&claim.claim_type, &claim.value, &self.id, cancel)
                .await?;
        }
        self.persist(state, cancel).await?;
        debug!(added = added.len(), "Claims added");
        Ok(())
    }

    pub(super) async fn handle_get_claims(&mut self) -> Result<Vec<Claim>> {
        Ok(self.require_state("Get claims").await?.claims)
    }

    #[instrument(skip_all, fields(user_id = %self.id, count = claims.len()))]
    pub(super) async fn handle_remove_claims(&mut self, claims: Vec<Claim>, cancel: &CancellationToken) -> Result<()> {
        validate_claims(&claims)?;
        let mut state = self.require_state("Remove claims").await?;

        let mut removed: Vec<Claim> = Vec::new();
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

    #[instrument(skip_all, fields(user_id = %self.id))]
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
