//! The user actor: one instance per user id.
//!
//! It owns the user record together with the user's claims, external logins
//! and tokens, and keeps every index that points back at it in step.

mod claims;
mod logins;
mod state;
mod tokens;
mod users;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::actor_framework::VirtualActor;
use crate::domain::Claim;
use crate::error::{ensure_not_cancelled, require_non_blank, IdentityError, Result};
use crate::keys::{ENTITY_STATE_NAME, USER_ACTOR_TYPE};
use crate::messages::UserRequest;
use crate::services::UserIndexServices;
use crate::state::ActorStateManager;

pub use state::UserActorState;

pub struct UserActor {
    id: String,
    state_manager: ActorStateManager,
    // None until loaded in this activation, and while the user is absent.
    state: Option<UserActorState>,
    indexes: UserIndexServices,
    default_claims: Vec<Claim>,
}

impl UserActor {
    pub fn new(
        id: impl Into<String>,
        state_manager: ActorStateManager,
        indexes: UserIndexServices,
        default_claims: Vec<Claim>,
    ) -> Self {
        Self {
            id: id.into(),
            state_manager,
            state: None,
            indexes,
            default_claims,
        }
    }

    async fn ensure_loaded(&mut self) -> Result<()> {
        if self.state.is_none() {
            self.state = self.state_manager.try_get::<UserActorState>(ENTITY_STATE_NAME).await?;
        }
        Ok(())
    }

    /// Returns a working copy of the state, or `NotFound` naming `operation`.
    async fn require_state(&mut self, operation: &'static str) -> Result<UserActorState> {
        self.ensure_loaded().await?;
        self.state
            .clone()
            .ok_or_else(|| IdentityError::user_not_found(operation, &self.id))
    }

    fn check_id(&self, payload_id: &str, entity: &'static str) -> Result<()> {
        if payload_id != self.id {
            return Err(IdentityError::IdMismatch {
                actor_type: USER_ACTOR_TYPE,
                actor_id: self.id.clone(),
                entity,
                payload_id: payload_id.to_string(),
            });
        }
        Ok(())
    }

    /// Saves `state` as the new snapshot.
    ///
    /// The cache only takes the new value once the commit succeeded; after a
    /// failed commit it is dropped and reloaded on next use.
    async fn persist(&mut self, state: UserActorState, cancel: &CancellationToken) -> Result<()> {
        ensure_not_cancelled(cancel)?;
        self.state_manager.set(ENTITY_STATE_NAME, &state)?;
        match self.state_manager.save().await {
            Ok(()) => {
                self.state = Some(state);
                Ok(())
            }
            Err(e) => {
                error!(user_id = %self.id, error = %e, "Failed to save user state");
                self.state_manager.discard();
                self.state = None;
                Err(e.into())
            }
        }
    }
}

fn validate_claims(claims: &[Claim]) -> Result<()> {
    claims
        .iter()
        .try_for_each(|claim| require_non_blank(&claim.claim_type, "claim type"))
}

#[async_trait]
impl VirtualActor for UserActor {
    type Request = UserRequest;

    async fn handle(&mut self, request: UserRequest) {
        match request {
            UserRequest::Create { user, cancel, respond_to } => {
                let _ = respond_to.send(self.handle_create(user, &cancel).await);
            }
            UserRequest::Find { respond_to } => {
                let _ = respond_to.send(self.handle_find().await);
            }
            UserRequest::Exists { respond_to } => {
                let _ = respond_to.send(self.handle_exists().await);
            }
            UserRequest::Update { user, cancel, respond_to } => {
                let _ = respond_to.send(self.handle_update(user, &cancel).await);
            }
            UserRequest::Delete { cancel, respond_to } => {
                let _ = respond_to.send(self.handle_delete(&cancel).await);
            }
            UserRequest::AddClaims { claims, cancel, respond_to } => {
                let _ = respond_to.send(self.handle_add_claims(claims, &cancel).await);
            }
            UserRequest::GetClaims { respond_to } => {
                let _ = respond_to.send(self.handle_get_claims().await);
            }
            UserRequest::RemoveClaims { claims, cancel, respond_to } => {
                let _ = respond_to.send(self.handle_remove_claims(claims, &cancel).await);
            }
            UserRequest::ReplaceClaim {
                claim,
                new_claim,
                cancel,
                respond_to,
            } => {
                let _ = respond_to.send(self.handle_replace_claim(claim, new_claim, &cancel).await);
            }
            UserRequest::AddLogin { login, cancel, respond_to } => {
                let _ = respond_to.send(self.handle_add_login(login, &cancel).await);
            }
            UserRequest::FindLogin {
                login_provider,
                provider_key,
                respond_to,
            } => {
                let _ = respond_to.send(self.handle_find_login(&login_provider, &provider_key).await);
            }
            UserRequest::GetLogins { respond_to } => {
                let _ = respond_to.send(self.handle_get_logins().await);
            }
            UserRequest::RemoveLogin {
                login_provider,
                provider_key,
                cancel,
                respond_to,
            } => {
                let _ = respond_to.send(self.handle_remove_login(&login_provider, &provider_key, &cancel).await);
            }
            UserRequest::AddToken { token, cancel, respond_to } => {
                let _ = respond_to.send(self.handle_add_token(token, &cancel).await);
            }
            UserRequest::GetToken {
                login_provider,
                name,
                respond_to,
            } => {
                let _ = respond_to.send(self.handle_get_token(&login_provider, &name).await);
            }
            UserRequest::RemoveToken {
                login_provider,
                name,
                cancel,
                respond_to,
            } => {
                let _ = respond_to.send(self.handle_remove_token(&login_provider, &name, &cancel).await);
            }
            UserRequest::Reindex { cancel, respond_to } => {
                let _ = respond_to.send(self.handle_reindex(&cancel).await);
            }
        }
    }
}
