use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::{RoleActor, RoleActorState};
use crate::domain::{non_blank, Role};
use crate::error::{ensure_not_cancelled, Result};
use crate::keys::ENTITY_STATE_NAME;
use crate::saga::IndexTransition;

impl RoleActor {
    #[instrument(skip_all, fields(role_id = %self.id))]
    pub(super) async fn handle_create(&mut self, role: Role, cancel: &CancellationToken) -> Result<bool> {
        self.check_id(&role.id)?;
        self.ensure_loaded().await?;
        if self.state.is_some() {
            debug!("Role already exists");
            return Ok(false);
        }
        ensure_not_cancelled(cancel)?;

        self.indexes.collection.add(&self.id, cancel).await?;
        if let Some(name) = non_blank(role.normalized_name.as_deref()) {
            self.indexes.names.add(name, &self.id, cancel).await?;
        }
        self.persist(
            RoleActorState {
                role,
                claims: Vec::new(),
            },
            cancel,
        )
        .await?;
        info!("Role created");
        Ok(true)
    }

    pub(super) async fn handle_find(&mut self) -> Result<Option<Role>> {
        self.ensure_loaded().await?;
        Ok(self.state.as_ref().map(|state| state.role.clone()))
    }

    pub(super) async fn handle_exists(&mut self) -> Result<bool> {
        self.ensure_loaded().await?;
        Ok(self.state.is_some())
    }

    #[instrument(skip_all, fields(role_id = %self.id))]
    pub(super) async fn handle_update(&mut self, role: Role, cancel: &CancellationToken) -> Result<()> {
        let mut state = self.require_state("Update").await?;
        self.check_id(&role.id)?;

        let name = IndexTransition::between(state.role.normalized_name.as_deref(), role.normalized_name.as_deref());
        state.role = role;
        self.persist(state, cancel).await?;

        if let Some(transition) = name {
            if let Some(old) = &transition.remove {
                self.indexes.names.remove(old, cancel).await?;
            }
            if let Some(new) = &transition.add {
                self.indexes.names.add(new, &self.id, cancel).await?;
            }
            info!(old = ?transition.remove, new = ?transition.add, "Role renamed");
        }
        Ok(())
    }

    #[instrument(skip_all, fields(role_id = %self.id))]
    pub(super) async fn handle_delete(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.ensure_loaded().await?;
        ensure_not_cancelled(cancel)?;

        if let Some(state) = self.state.clone() {
            if let Some(name) = non_blank(state.role.normalized_name.as_deref()) {
                self.indexes.names.remove(name, cancel).await?;
            }
            for claim in &state.claims {
                self.indexes
                    .claims
                    .remove(&claim.claim_type, &claim.value, &self.id, cancel)
                    .await?;
            }

            ensure_not_cancelled(cancel)?;
            self.state_manager.remove(ENTITY_STATE_NAME);
            self.state = None;
            if let Err(e) = self.state_manager.save().await {
                self.state_manager.discard();
                return Err(e.into());
            }
            info!("Role deleted");
        }

        self.indexes.collection.remove(&self.id, cancel).await
    }

    #[instrument(skip_all, fields(role_id = %self.id))]
    pub(super) async fn handle_reindex(&mut self, cancel: &CancellationToken) -> Result<bool> {
        self.ensure_loaded().await?;
        ensure_not_cancelled(cancel)?;

        let Some(state) = self.state.clone() else {
            self.indexes.collection.remove(&self.id, cancel).await?;
            return Ok(false);
        };

        self.indexes.collection.add(&self.id, cancel).await?;
        if let Some(name) = non_blank(state.role.normalized_name.as_deref()) {
            self.indexes.names.add(name, &self.id, cancel).await?;
        }
        for claim in &state.claims {
            self.indexes
                .claims
                .add(&claim.claim_type, &claim.value, &self.id, cancel)
                .await?;
        }
        debug!("Role re-indexed");
        Ok(true)
    }
}
