//! The role actor: one instance per role id.

mod claims;
mod roles;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::actor_framework::VirtualActor;
use crate::domain::{Claim, Role};
use crate::error::{ensure_not_cancelled, IdentityError, Result};
use crate::keys::{ENTITY_STATE_NAME, ROLE_ACTOR_TYPE};
use crate::messages::RoleRequest;
use crate::services::RoleIndexServices;
use crate::state::ActorStateManager;

/// Persisted snapshot of one role actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleActorState {
    pub role: Role,
    pub claims: Vec<Claim>,
}

pub struct RoleActor {
    id: String,
    state_manager: ActorStateManager,
    state: Option<RoleActorState>,
    indexes: RoleIndexServices,
}

impl RoleActor {
    pub fn new(id: impl Into<String>, state_manager: ActorStateManager, indexes: RoleIndexServices) -> Self {
        Self {
            id: id.into(),
            state_manager,
            state: None,
            indexes,
        }
    }

    async fn ensure_loaded(&mut self) -> Result<()> {
        if self.state.is_none() {
            self.state = self.state_manager.try_get::<RoleActorState>(ENTITY_STATE_NAME).await?;
        }
        Ok(())
    }

    async fn require_state(&mut self, operation: &'static str) -> Result<RoleActorState> {
        self.ensure_loaded().await?;
        self.state
            .clone()
            .ok_or_else(|| IdentityError::role_not_found(operation, &self.id))
    }

    fn check_id(&self, payload_id: &str) -> Result<()> {
        if payload_id != self.id {
            return Err(IdentityError::IdMismatch {
                actor_type: ROLE_ACTOR_TYPE,
                actor_id: self.id.clone(),
                entity: "role",
                payload_id: payload_id.to_string(),
            });
        }
        Ok(())
    }

    async fn persist(&mut self, state: RoleActorState, cancel: &CancellationToken) -> Result<()> {
        ensure_not_cancelled(cancel)?;
        self.state_manager.set(ENTITY_STATE_NAME, &state)?;
        if let Err(e) = self.state_manager.save().await {
            error!(role_id = %self.id, error = %e, "Failed to save role state");
            self.state_manager.discard();
            self.state = None;
            return Err(e.into());
        }
        self.state = Some(state);
        Ok(())
    }
}

#[async_trait]
impl VirtualActor for RoleActor {
    type Request = RoleRequest;

    async fn handle(&mut self, request: RoleRequest) {
        match request {
            RoleRequest::Create { role, cancel, respond_to } => {
                let _ = respond_to.send(self.handle_create(role, &cancel).await);
            }
            RoleRequest::Find { respond_to } => {
                let _ = respond_to.send(self.handle_find().await);
            }
            RoleRequest::Exists { respond_to } => {
                let _ = respond_to.send(self.handle_exists().await);
            }
            RoleRequest::Update { role, cancel, respond_to } => {
                let _ = respond_to.send(self.handle_update(role, &cancel).await);
            }
            RoleRequest::Delete { cancel, respond_to } => {
                let _ = respond_to.send(self.handle_delete(&cancel).await);
            }
            RoleRequest::AddClaims { claims, cancel, respond_to } => {
                let _ = respond_to.send(self.handle_add_claims(claims, &cancel).await);
            }
            RoleRequest::GetClaims { respond_to } => {
                let _ = respond_to.send(self.handle_get_claims().await);
            }
            RoleRequest::RemoveClaims { claims, cancel, respond_to } => {
                let _ = respond_to.send(self.handle_remove_claims(claims, &cancel).await);
            }
            RoleRequest::ReplaceClaim {
                claim,
                new_claim,
                cancel,
                respond_to,
            } => {
                let _ = respond_to.send(self.handle_replace_claim(claim, new_claim, &cancel).await);
            }
            RoleRequest::Reindex { cancel, respond_to } => {
                let _ = respond_to.send(self.handle_reindex(&cancel).await);
            }
        }
    }
}
