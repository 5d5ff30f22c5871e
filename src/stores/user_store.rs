use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::collect_found;
use crate::actor_framework::ActorProxyFactory;
use crate::domain::{non_blank, Claim, IdentityFailure, IdentityResult, User, UserLogin, UserLoginInfo, UserToken};
use crate::error::{ensure_not_cancelled, require_non_blank, Result};
use crate::services::UserIndexServices;

/// User store backed by user actors and their indexes.
#[derive(Clone)]
pub struct UserStore {
    factory: Arc<dyn ActorProxyFactory>,
    indexes: UserIndexServices,
}

impl UserStore {
    pub fn new(factory: Arc<dyn ActorProxyFactory>) -> Self {
        Self {
            indexes: UserIndexServices::new(factory.clone()),
            factory,
        }
    }

    pub fn indexes(&self) -> &UserIndexServices {
        &self.indexes
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn create(&self, user: User, cancel: &CancellationToken) -> Result<IdentityResult> {
        ensure_not_cancelled(cancel)?;
        require_non_blank(&user.id, "user id")?;
        if let Some(failure) = self.find_conflict(&user).await? {
            return Ok(IdentityResult::failed(failure));
        }

        let user_id = user.id.clone();
        if !self.factory.user_actor(&user_id).create(user, cancel.clone()).await? {
            return Ok(IdentityResult::failed(IdentityFailure::duplicate_user_id(&user_id)));
        }
        info!("User stored");
        Ok(IdentityResult::Success)
    }

    #[instrument(skip(self, cancel))]
    pub async fn delete(&self, user_id: &str, cancel: &CancellationToken) -> Result<IdentityResult> {
        ensure_not_cancelled(cancel)?;
        require_non_blank(user_id, "user id")?;
        self.factory.user_actor(user_id).delete(cancel.clone()).await?;
        Ok(IdentityResult::Success)
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        require_non_blank(user_id, "user id")?;
        self.factory.user_actor(user_id).find().await
    }

    pub async fn find_by_name(&self, normalized_user_name: &str) -> Result<Option<User>> {
        match self.indexes.names.find_user_id(normalized_user_name).await? {
            Some(user_id) => self.find_by_id(&user_id).await,
            None => Ok(None),
        }
    }

    pub async fn find_by_email(&self, normalized_email: &str) -> Result<Option<User>> {
        match self.indexes.emails.find_user_id(normalized_email).await? {
            Some(user_id) => self.find_by_id(&user_id).await,
            None => Ok(None),
        }
    }

    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn update(&self, user: User, cancel: &CancellationToken) -> Result<IdentityResult> {
        ensure_not_cancelled(cancel)?;
        if self.find_by_id(&user.id).await?.is_none() {
            return Ok(IdentityResult::failed(IdentityFailure::user_not_found(&user.id)));
        }
        if let Some(failure) = self.find_conflict(&user).await? {
            return Ok(IdentityResult::failed(failure));
        }
        let user_id = user.id.clone();
        self.factory.user_actor(&user_id).update(user, cancel.clone()).await?;
        Ok(IdentityResult::Success)
    }

    /// Every user in the collection.
    ///
    /// Ids whose user is gone by the time it is asked are skipped.
    pub async fn users(&self) -> Result<Vec<User>> {
        let user_ids = self.indexes.collection.all(0, 0).await?;
        let finds = user_ids.iter().map(|user_id| async move {
            let user = self.factory.user_actor(user_id).find().await;
            if matches!(user, Ok(None)) {
                debug!(user_id = %user_id, "Collection lists a missing user");
            }
            user
        });
        collect_found(join_all(finds).await)
    }

    /// A name or email owned by another user.
    async fn find_conflict(&self, user: &User) -> Result<Option<IdentityFailure>> {
        if let Some(name) = non_blank(user.normalized_user_name.as_deref()) {
            if let Some(owner) = self.indexes.names.find_user_id(name).await? {
                if owner != user.id {
                    let user_name = user.user_name.as_deref().unwrap_or(name);
                    return Ok(Some(IdentityFailure::duplicate_user_name(user_name)));
                }
            }
        }
        if let Some(email) = non_blank(user.normalized_email.as_deref()) {
            if let Some(owner) = self.indexes.emails.find_user_id(email).await? {
                if owner != user.id {
                    let address = user.email.as_deref().unwrap_or(email);
                    return Ok(Some(IdentityFailure::duplicate_email(address)));
                }
            }
        }
        Ok(None)
    }

    // -------------------------------------------------------------------------
    // Claims
    // -------------------------------------------------------------------------

    pub async fn add_claims(&self, user_id: &str, claims: Vec<Claim>, cancel: &CancellationToken) -> Result<()> {
        ensure_not_cancelled(cancel)?;
        require_non_blank(user_id, "user id")?;
        self.factory.user_actor(user_id).add_claims(claims, cancel.clone()).await
    }

    pub async fn get_claims(&self, user_id: &str) -> Result<Vec<Claim>> {
        require_non_blank(user_id, "user id")?;
        self.factory.user_actor(user_id).get_claims().await
    }

    pub async fn remove_claims(&self, user_id: &str, claims: Vec<Claim>, cancel: &CancellationToken) -> Result<()> {
        ensure_not_cancelled(cancel)?;
        require_non_blank(user_id, "user id")?;
        self.factory.user_actor(user_id).remove_claims(claims, cancel.clone()).await
    }

    pub async fn replace_claim(
        &self,
        user_id: &str,
        claim: Claim,
        new_claim: Claim,
        cancel: &CancellationToken,
    ) -> Result<()> {
        ensure_not_cancelled(cancel)?;
        require_non_blank(user_id, "user id")?;
        self.factory
            .user_actor(user_id)
            .replace_claim(claim, new_claim, cancel.clone())
            .await
    }

    /// Users holding `claim`.
    ///
    /// Candidates come from the claims index and are confirmed against the
    /// user's own claims, so stale index entries are ignored.
    #[instrument(skip(self))]
    pub async fn get_users_for_claim(&self, claim: &Claim) -> Result<Vec<User>> {
        let candidates = self.indexes.claims.find_user_ids(&claim.claim_type, &claim.value).await?;
        let checks = candidates
            .iter()
            .map(|user_id| self.user_if_has_claim(user_id, claim));
        collect_found(join_all(checks).await)
    }

    async fn user_if_has_claim(&self, user_id: &str, claim: &Claim) -> Result<Option<User>> {
        let actor = self.factory.user_actor(user_id);
        if !actor.get_claims().await?.contains(claim) {
            warn!(user_id = %user_id, "Stale claim index entry");
            return Ok(None);
        }
        actor.find().await
    }

    // -------------------------------------------------------------------------
    // Logins
    // -------------------------------------------------------------------------

    /// Attaches an external login, refused when another user already holds it.
    #[instrument(skip(self, login, cancel), fields(provider = %login.login_provider))]
    pub async fn add_login(
        &self,
        user_id: &str,
        login: UserLoginInfo,
        cancel: &CancellationToken,
    ) -> Result<IdentityResult> {
        ensure_not_cancelled(cancel)?;
        require_non_blank(user_id, "user id")?;
        let owner = self
            .indexes
            .logins
            .find_user_id(&login.login_provider, &login.provider_key)
            .await?;
        if let Some(owner) = owner.filter(|owner| owner != user_id) {
            debug!(owner = %owner, "Login already associated");
            return Ok(IdentityResult::failed(IdentityFailure::login_already_associated(
                &login.login_provider,
            )));
        }
        self.factory.user_actor(user_id).add_login(login, cancel.clone()).await?;
        Ok(IdentityResult::Success)
    }

    pub async fn get_logins(&self, user_id: &str) -> Result<Vec<UserLoginInfo>> {
        require_non_blank(user_id, "user id")?;
        self.factory.user_actor(user_id).get_logins().await
    }

    pub async fn remove_login(
        &self,
        user_id: &str,
        login_provider: &str,
        provider_key: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        ensure_not_cancelled(cancel)?;
        require_non_blank(user_id, "user id")?;
        self.factory
            .user_actor(user_id)
            .remove_login(login_provider.to_string(), provider_key.to_string(), cancel.clone())
            .await
    }

    /// Resolves a login through the login index.
    pub async fn find_login(&self, login_provider: &str, provider_key: &str) -> Result<Option<UserLogin>> {
        let Some(user_id) = self.indexes.logins.find_user_id(login_provider, provider_key).await? else {
            return Ok(None);
        };
        match self.find_user_login(&user_id, login_provider, provider_key).await {
            Err(e) if e.is_not_found() => {
                warn!(user_id = %user_id, "Login index points at a missing user");
                Ok(None)
            }
            result => result,
        }
    }

    pub async fn find_user_login(
        &self,
        user_id: &str,
        login_provider: &str,
        provider_key: &str,
    ) -> Result<Option<UserLogin>> {
        require_non_blank(user_id, "user id")?;
        self.factory
            .user_actor(user_id)
            .find_login(login_provider.to_string(), provider_key.to_string())
            .await
    }

    pub async fn find_by_login(&self, login_provider: &str, provider_key: &str) -> Result<Option<User>> {
        match self.find_login(login_provider, provider_key).await? {
            Some(login) => self.find_by_id(&login.user_id).await,
            None => Ok(None),
        }
    }

    // -------------------------------------------------------------------------
    // Tokens
    // -------------------------------------------------------------------------

    pub async fn add_token(&self, token: UserToken, cancel: &CancellationToken) -> Result<()> {
        ensure_not_cancelled(cancel)?;
        require_non_blank(&token.user_id, "user id")?;
        let user_id = token.user_id.clone();
        self.factory.user_actor(&user_id).add_token(token, cancel.clone()).await
    }

    pub async fn find_token(&self, user_id: &str, login_provider: &str, name: &str) -> Result<Option<UserToken>> {
        require_non_blank(user_id, "user id")?;
        self.factory
            .user_actor(user_id)
            .get_token(login_provider.to_string(), name.to_string())
            .await
    }

    pub async fn remove_token(
        &self,
        user_id: &str,
        login_provider: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        ensure_not_cancelled(cancel)?;
        require_non_blank(user_id, "user id")?;
        self.factory
            .user_actor(user_id)
            .remove_token(login_provider.to_string(), name.to_string(), cancel.clone())
            .await
    }

    /// Stores `value` under the token, creating the token when needed.
    #[instrument(skip(self, value, cancel))]
    pub async fn set_token_value(
        &self,
        user_id: &str,
        login_provider: &str,
        name: &str,
        value: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.add_token(UserToken::new(user_id, login_provider, name, value), cancel)
            .await
    }

    pub async fn get_token_value(&self, user_id: &str, login_provider: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .find_token(user_id, login_provider, name)
            .await?
            .and_then(|token| token.value))
    }

    // -------------------------------------------------------------------------
    // Repair
    // -------------------------------------------------------------------------

    /// Re-adds the index entries of every user in the collection.
    ///
    /// Returns how many users were re-indexed; ids of missing users are
    /// dropped from the collection.
    #[instrument(skip_all)]
    pub async fn rebuild_indexes(&self, cancel: &CancellationToken) -> Result<usize> {
        let mut reindexed = 0;
        for user_id in self.indexes.collection.all(0, 0).await? {
            ensure_not_cancelled(cancel)?;
            if self.factory.user_actor(&user_id).reindex(cancel.clone()).await? {
                reindexed += 1;
            }
        }
        info!(reindexed, "User indexes rebuilt");
        Ok(reindexed)
    }
}
