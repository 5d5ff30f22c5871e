use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::{UserActor, UserActorState};
use crate::domain::{non_blank, union_claims, User};
use crate::error::{ensure_not_cancelled, Result};
use crate::keys::ENTITY_STATE_NAME;
use crate::saga::IndexTransition;

impl UserActor {
    #[instrument(skip_all, fields(user_id = %self.id))]
    pub(super) async fn handle_create(&mut self, user: User, cancel: &CancellationToken) -> Result<bool> {
        self.check_id(&user.id, "user")?;
        self.ensure_loaded().await?;
        if self.state.is_some() {
            debug!("User already exists");
            return Ok(false);
        }
        ensure_not_cancelled(cancel)?;

        self.indexes.collection.add(&self.id, cancel).await?;

        let mut state = UserActorState::new(user);
        let seeded = union_claims(&mut state.claims, self.default_claims.clone());
        for claim in &seeded {
            self.indexes
                .claims
                .add(&claim.claim_type, &claim.value, &self.id, cancel)
                .await?;
        }
        if let Some(email) = non_blank(state.user.normalized_email.as_deref()) {
            self.indexes.emails.add(email, &self.id, cancel).await?;
        }
        if let Some(name) = non_blank(state.user.normalized_user_name.as_deref()) {
            self.indexes.names.add(name, &self.id, cancel).await?;
        }

        self.persist(state, cancel).await?;
        info!("User created");
        Ok(true)
    }

    pub(super) async fn handle_find(&mut self) -> Result<Option<User>> {
        self.ensure_loaded().await?;
        Ok(self.state.as_ref().map(|state| state.user.clone()))
    }

    pub(super) async fn handle_exists(&mut self) -> Result<bool> {
        self.ensure_loaded().await?;
        Ok(self.state.is_some())
    }

    /// Saves the new record, then moves the email and name index entries.
    #[instrument(skip_all, fields(user_id = %self.id))]
    pub(super) async fn handle_update(&mut self, user: User, cancel: &CancellationToken) -> Result<()> {
        let mut state = self.require_state("Update").await?;
        self.check_id(&user.id, "user")?;

        let email = IndexTransition::between(
            state.user.normalized_email.as_deref(),
            user.normalized_email.as_deref(),
        );
        let name = IndexTransition::between(
            state.user.normalized_user_name.as_deref(),
            user.normalized_user_name.as_deref(),
        );
        state.user = user;
        self.persist(state, cancel).await?;

        if let Some(transition) = email {
            if let Some(old) = &transition.remove {
                self.indexes.emails.release(old, &self.id, cancel).await?;
            }
            if let Some(new) = &transition.add {
                self.indexes.emails.add(new, &self.id, cancel).await?;
            }
            info!(old = ?transition.remove, new = ?transition.add, "User email re-indexed");
        }
        if let Some(transition) = name {
            if let Some(old) = &transition.remove {
                self.indexes.names.release(old, &self.id, cancel).await?;
            }
            if let Some(new) = &transition.add {
                self.indexes.names.add(new, &self.id, cancel).await?;
            }
            info!(old = ?transition.remove, new = ?transition.add, "User name re-indexed");
        }
        Ok(())
    }

    /// Removes the user and every index entry derived from it.
    ///
    /// Single-owner entries are only removed while they still point at this
    /// user. The collection entry is removed even when the user is already
    /// absent.
    #[instrument(skip_all, fields(user_id = %self.id))]
    pub(super) async fn handle_delete(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.ensure_loaded().await?;
        ensure_not_cancelled(cancel)?;

        if let Some(state) = self.state.clone() {
            if let Some(email) = non_blank(state.user.normalized_email.as_deref()) {
                self.indexes.emails.release(email, &self.id, cancel).await?;
            }
            if let Some(name) = non_blank(state.user.normalized_user_name.as_deref()) {
                self.indexes.names.release(name, &self.id, cancel).await?;
            }
            for claim in &state.claims {
                self.indexes
                    .claims
                    .remove(&claim.claim_type, &claim.value, &self.id, cancel)
                    .await?;
            }
            for login in &state.logins {
                self.indexes
                    .logins
                    .release(&login.login_provider, &login.provider_key, &self.id, cancel)
                    .await?;
            }
            for token in &state.tokens {
                self.indexes
                    .tokens
                    .release(&token.login_provider, &token.name, &self.id, cancel)
                    .await?;
            }

            ensure_not_cancelled(cancel)?;
            self.state_manager.remove(ENTITY_STATE_NAME);
            self.state = None;
            if let Err(e) = self.state_manager.save().await {
                self.state_manager.discard();
                return Err(e.into());
            }
            info!("User deleted");
        } else {
            debug!("Delete on absent user");
        }

        self.indexes.collection.remove(&self.id, cancel).await
    }

    /// Re-adds every index entry derived from the current state.
    ///
    /// Single-owner entries held by another user are left alone. Returns
    /// `false` when the user is absent, after dropping it from the collection.
    #[instrument(skip_all, fields(user_id = %self.id))]
    pub(super) async fn handle_reindex(&mut self, cancel: &CancellationToken) -> Result<bool> {
        self.ensure_loaded().await?;
        ensure_not_cancelled(cancel)?;

        let Some(state) = self.state.clone() else {
            self.indexes.collection.remove(&self.id, cancel).await?;
            return Ok(false);
        };

        self.indexes.collection.add(&self.id, cancel).await?;
        if let Some(email) = non_blank(state.user.normalized_email.as_deref()) {
            if !self.indexes.emails.claim(email, &self.id, cancel).await? {
                warn!(email, "Email index held by another user");
            }
        }
        if let Some(name) = non_blank(state.user.normalized_user_name.as_deref()) {
            if !self.indexes.names.claim(name, &self.id, cancel).await? {
                warn!(name, "Name index held by another user");
            }
        }
        for claim in &state.claims {
            self.indexes
                .claims
                .add(&claim.claim_type, &claim.value, &self.id, cancel)
                .await?;
        }
        for login in &state.logins {
            let claimed = self
                .indexes
                .logins
                .claim(&login.login_provider, &login.provider_key, &self.id, cancel)
                .await?;
            if !claimed {
                warn!(provider = %login.login_provider, "Login index held by another user");
            }
        }
        for token in &state.tokens {
            let claimed = self
                .indexes
                .tokens
                .claim(&token.login_provider, &token.name, &self.id, cancel)
                .await?;
            if !claimed {
                debug!(provider = %token.login_provider, name = %token.name, "Token index held by another user");
            }
        }
        debug!("User re-indexed");
        Ok(true)
    }
}
