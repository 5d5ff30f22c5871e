use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{KeyHashIndex, KeyValueIndex};
use crate::actor_framework::ActorProxyFactory;
use crate::error::{require_non_blank, Result};
use crate::keys::{
    ClaimKey, LoginKey, TokenKey, ALL_USERS_COLLECTION_ID, USER_CLAIM_INDEX_ACTOR_TYPE, USER_COLLECTION_ACTOR_TYPE,
    USER_EMAIL_INDEX_ACTOR_TYPE, USER_LOGIN_INDEX_ACTOR_TYPE, USER_NAME_INDEX_ACTOR_TYPE, USER_TOKEN_INDEX_ACTOR_TYPE,
};

/// The set of every user id.
#[derive(Clone)]
pub struct UserCollectionService {
    index: KeyHashIndex,
}

impl UserCollectionService {
    pub fn new(factory: Arc<dyn ActorProxyFactory>) -> Self {
        Self {
            index: KeyHashIndex::new(factory, USER_COLLECTION_ACTOR_TYPE),
        }
    }

    /// Adds the id and returns the collection size.
    pub async fn add(&self, user_id: &str, cancel: &CancellationToken) -> Result<usize> {
        require_non_blank(user_id, "user id")?;
        self.index.add(ALL_USERS_COLLECTION_ID.to_string(), user_id, cancel).await
    }

    /// Lists user ids; `take == 0` lists everything after `skip`.
    pub async fn all(&self, skip: usize, take: usize) -> Result<Vec<String>> {
        self.index.all(ALL_USERS_COLLECTION_ID.to_string(), skip, take).await
    }

    pub async fn remove(&self, user_id: &str, cancel: &CancellationToken) -> Result<()> {
        require_non_blank(user_id, "user id")?;
        self.index.remove(ALL_USERS_COLLECTION_ID.to_string(), user_id, cancel).await
    }
}

/// Normalized user name → user id.
#[derive(Clone)]
pub struct UserNameIndexService {
    index: KeyValueIndex,
}

impl UserNameIndexService {
    pub fn new(factory: Arc<dyn ActorProxyFactory>) -> Self {
        Self {
            index: KeyValueIndex::new(factory, USER_NAME_INDEX_ACTOR_TYPE),
        }
    }

    pub async fn add(&self, normalized_user_name: &str, user_id: &str, cancel: &CancellationToken) -> Result<()> {
        require_non_blank(normalized_user_name, "user name")?;
        require_non_blank(user_id, "user id")?;
        self.index.set(normalized_user_name.to_string(), user_id, cancel).await
    }

    pub async fn find_user_id(&self, normalized_user_name: &str) -> Result<Option<String>> {
        require_non_blank(normalized_user_name, "user name")?;
        self.index.get(normalized_user_name.to_string()).await
    }

    pub async fn remove(&self, normalized_user_name: &str, cancel: &CancellationToken) -> Result<()> {
        require_non_blank(normalized_user_name, "user name")?;
        self.index.remove(normalized_user_name.to_string(), cancel).await
    }

    /// Adds the entry unless it belongs to another user.
    pub async fn claim(&self, normalized_user_name: &str, user_id: &str, cancel: &CancellationToken) -> Result<bool> {
        require_non_blank(normalized_user_name, "user name")?;
        require_non_blank(user_id, "user id")?;
        self.index.set_if_vacant(normalized_user_name.to_string(), user_id, cancel).await
    }

    /// Removes the entry only while it belongs to `user_id`.
    pub async fn release(&self, normalized_user_name: &str, user_id: &str, cancel: &CancellationToken) -> Result<bool> {
        require_non_blank(normalized_user_name, "user name")?;
        require_non_blank(user_id, "user id")?;
        self.index.remove_if(normalized_user_name.to_string(), user_id, cancel).await
    }
}

/// Normalized email → user id.
#[derive(Clone)]
pub struct UserEmailIndexService {
    index: KeyValueIndex,
}

impl UserEmailIndexService {
    pub fn new(factory: Arc<dyn ActorProxyFactory>) -> Self {
        Self {
            index: KeyValueIndex::new(factory, USER_EMAIL_INDEX_ACTOR_TYPE),
        }
    }

    pub async fn add(&self, normalized_email: &str, user_id: &str, cancel: &CancellationToken) -> Result<()> {
        require_non_blank(normalized_email, "email")?;
        require_non_blank(user_id, "user id")?;
        self.index.set(normalized_email.to_string(), user_id, cancel).await
    }

    pub async fn find_user_id(&self, normalized_email: &str) -> Result<Option<String>> {
        require_non_blank(normalized_email, "email")?;
        self.index.get(normalized_email.to_string()).await
    }

    pub async fn remove(&self, normalized_email: &str, cancel: &CancellationToken) -> Result<()> {
        require_non_blank(normalized_email, "email")?;
        self.index.remove(normalized_email.to_string(), cancel).await
    }

    /// Adds the entry unless it belongs to another user.
    pub async fn claim(&self, normalized_email: &str, user_id: &str, cancel: &CancellationToken) -> Result<bool> {
        require_non_blank(normalized_email, "email")?;
        require_non_blank(user_id, "user id")?;
        self.index.set_if_vacant(normalized_email.to_string(), user_id, cancel).await
    }

    /// Removes the entry only while it belongs to `user_id`.
    pub async fn release(&self, normalized_email: &str, user_id: &str, cancel: &CancellationToken) -> Result<bool> {
        require_non_blank(normalized_email, "email")?;
        require_non_blank(user_id, "user id")?;
        self.index.remove_if(normalized_email.to_string(), user_id, cancel).await
    }
}

/// External login (provider, provider key) → user id.
#[derive(Clone)]
pub struct UserLoginIndexService {
    index: KeyValueIndex,
}

impl UserLoginIndexService {
    pub fn new(factory: Arc<dyn ActorProxyFactory>) -> Self {
        Self {
            index: KeyValueIndex::new(factory, USER_LOGIN_INDEX_ACTOR_TYPE),
        }
    }

    pub async fn add(
        &self,
        login_provider: &str,
        provider_key: &str,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let key = LoginKey::new(login_provider, provider_key)?;
        require_non_blank(user_id, "user id")?;
        self.index.set(key.actor_id(), user_id, cancel).await
    }

    pub async fn find_user_id(&self, login_provider: &str, provider_key: &str) -> Result<Option<String>> {
        let key = LoginKey::new(login_provider, provider_key)?;
        self.index.get(key.actor_id()).await
    }

    pub async fn remove(&self, login_provider: &str, provider_key: &str, cancel: &CancellationToken) -> Result<()> {
        let key = LoginKey::new(login_provider, provider_key)?;
        self.index.remove(key.actor_id(), cancel).await
    }

    /// Adds the entry unless it belongs to another user.
    pub async fn claim(
        &self,
        login_provider: &str,
        provider_key: &str,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let key = LoginKey::new(login_provider, provider_key)?;
        require_non_blank(user_id, "user id")?;
        self.index.set_if_vacant(key.actor_id(), user_id, cancel).await
    }

    /// Removes the entry only while it belongs to `user_id`.
    pub async fn release(
        &self,
        login_provider: &str,
        provider_key: &str,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let key = LoginKey::new(login_provider, provider_key)?;
        require_non_blank(user_id, "user id")?;
        self.index.remove_if(key.actor_id(), user_id, cancel).await
    }
}

/// Token (provider, name) → user id.
#[derive(Clone)]
pub struct UserTokenIndexService {
    index: KeyValueIndex,
}

impl UserTokenIndexService {
    pub fn new(factory: Arc<dyn ActorProxyFactory>) -> Self {
        Self {
            index: KeyValueIndex::new(factory, USER_TOKEN_INDEX_ACTOR_TYPE),
        }
    }

    pub async fn add(&self, login_provider: &str, name: &str, user_id: &str, cancel: &CancellationToken) -> Result<()> {
        let key = TokenKey::new(login_provider, name)?;
        require_non_blank(user_id, "user id")?;
        self.index.set(key.actor_id(), user_id, cancel).await
    }

    pub async fn find_user_id(&self, login_provider: &str, name: &str) -> Result<Option<String>> {
        let key = TokenKey::new(login_provider, name)?;
        self.index.get(key.actor_id()).await
    }

    pub async fn remove(&self, login_provider: &str, name: &str, cancel: &CancellationToken) -> Result<()> {
        let key = TokenKey::new(login_provider, name)?;
        self.index.remove(key.actor_id(), cancel).await
    }

    /// Adds the entry unless it belongs to another user.
    pub async fn claim(
        &self,
        login_provider: &str,
        name: &str,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let key = TokenKey::new(login_provider, name)?;
        require_non_blank(user_id, "user id")?;
        self.index.set_if_vacant(key.actor_id(), user_id, cancel).await
    }

    /// Removes the entry only while it belongs to `user_id`.
    pub async fn release(
        &self,
        login_provider: &str,
        name: &str,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let key = TokenKey::new(login_provider, name)?;
        require_non_blank(user_id, "user id")?;
        self.index.remove_if(key.actor_id(), user_id, cancel).await
    }
}

/// Claim (type, value) → ids of the users holding it.
#[derive(Clone)]
pub struct UserClaimsIndexService {
    index: KeyHashIndex,
}

impl UserClaimsIndexService {
    pub fn new(factory: Arc<dyn ActorProxyFactory>) -> Self {
        Self {
            index: KeyHashIndex::new(factory, USER_CLAIM_INDEX_ACTOR_TYPE),
        }
    }

    pub async fn add(&self, claim_type: &str, value: &str, user_id: &str, cancel: &CancellationToken) -> Result<()> {
        let key = ClaimKey::new(claim_type, value)?;
        require_non_blank(user_id, "user id")?;
        self.index.add(key.actor_id(), user_id, cancel).await.map(|_| ())
    }

    pub async fn find_user_ids(&self, claim_type: &str, value: &str) -> Result<Vec<String>> {
        let key = ClaimKey::new(claim_type, value)?;
        self.index.all(key.actor_id(), 0, 0).await
    }

    pub async fn remove(&self, claim_type: &str, value: &str, user_id: &str, cancel: &CancellationToken) -> Result<()> {
        let key = ClaimKey::new(claim_type, value)?;
        require_non_blank(user_id, "user id")?;
        self.index.remove(key.actor_id(), user_id, cancel).await
    }
}

/// Every index a user actor maintains.
#[derive(Clone)]
pub struct UserIndexServices {
    pub collection: UserCollectionService,
    pub names: UserNameIndexService,
    pub emails: UserEmailIndexService,
    pub logins: UserLoginIndexService,
    pub tokens: UserTokenIndexService,
    pub claims: UserClaimsIndexService,
}

impl UserIndexServices {
    pub fn new(factory: Arc<dyn ActorProxyFactory>) -> Self {
        Self {
            collection: UserCollectionService::new(factory.clone()),
            names: UserNameIndexService::new(factory.clone()),
            emails: UserEmailIndexService::new(factory.clone()),
            logins: UserLoginIndexService::new(factory.clone()),
            tokens: UserTokenIndexService::new(factory.clone()),
            claims: UserClaimsIndexService::new(factory),
        }
    }
}
