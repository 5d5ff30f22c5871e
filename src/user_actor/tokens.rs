use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::UserActor;
use crate::domain::UserToken;
use crate::error::Result;
use crate::keys::TokenKey;

impl UserActor {
    /// Inserts the token, replacing any token with the same provider and name.
    ///
    /// The user is saved before the token index points at it.
    #[instrument(skip_all, fields(user_id = %self.id, provider = %token.login_provider, name = %token.name))]
    pub(super) async fn handle_add_token(&mut self, token: UserToken, cancel: &CancellationToken) -> Result<()> {
        TokenKey::new(&token.login_provider, &token.name)?;
        self.check_id(&token.user_id, "token")?;
        let mut state = self.require_state("Add token").await?;

        let (login_provider, name) = (token.login_provider.clone(), token.name.clone());
        state.tokens.retain(|t| !t.matches(&login_provider, &name));
        state.tokens.push(token);
        self.persist(state, cancel).await?;

        self.indexes.tokens.add(&login_provider, &name, &self.id, cancel).await?;
        debug!("Token stored");
        Ok(())
    }

    pub(super) async fn handle_get_token(&mut self, login_provider: &str, name: &str) -> Result<Option<UserToken>> {
        let state = self.require_state("Get token").await?;
        Ok(state.tokens.into_iter().find(|t| t.matches(login_provider, name)))
    }

    #[instrument(skip_all, fields(user_id = %self.id, provider = %login_provider, name = %name))]
    pub(super) async fn handle_remove_token(
        &mut self,
        login_provider: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        TokenKey::new(login_provider, name)?;
        let mut state = self.require_state("Remove token").await?;

        state.tokens.retain(|t| !t.matches(login_provider, name));
        self.persist(state, cancel).await?;

        self.indexes
            .tokens
            .release(login_provider, name, &self.id, cancel)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::super::test_support::{system, user_one};
    use crate::actor_framework::ActorProxyFactory;
    use crate::domain::{User, UserToken};
    use crate::error::IdentityError;
    use crate::services::UserIndexServices;

    #[tokio::test]
    async fn test_token_upsert_and_remove() {
        let (system, _store) = system();
        let indexes = UserIndexServices::new(system.proxy_factory());
        let cancel = CancellationToken::new();
        let actor = system.user_actor("U1");
        actor.create(user_one(), cancel.clone()).await.unwrap();

        actor
            .add_token(UserToken::new("U1", "Google", "access_token", Some("v1".into())), cancel.clone())
            .await
            .unwrap();
        actor
            .add_token(UserToken::new("U1", "Google", "access_token", Some("v2".into())), cancel.clone())
            .await
            .unwrap();

        let token = actor
            .get_token("Google".into(), "access_token".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(token.value.as_deref(), Some("v2"));
        assert_eq!(
            indexes.tokens.find_user_id("Google", "access_token").await.unwrap(),
            Some("U1".into())
        );

        actor
            .remove_token("Google".into(), "access_token".into(), cancel)
            .await
            .unwrap();
        assert_eq!(actor.get_token("Google".into(), "access_token".into()).await.unwrap(), None);
        assert_eq!(indexes.tokens.find_user_id("Google", "access_token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_token_for_other_user_is_rejected() {
        let (system, _store) = system();
        let cancel = CancellationToken::new();
        let actor = system.user_actor("U1");
        actor.create(user_one(), cancel.clone()).await.unwrap();

        let err = actor
            .add_token(UserToken::new("U2", "Google", "access_token", None), cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::IdMismatch { .. }));
    }

    #[tokio::test]
    async fn test_removing_shared_token_keeps_other_holder_indexed() {
        let (system, _store) = system();
        let indexes = UserIndexServices::new(system.proxy_factory());
        let cancel = CancellationToken::new();
        let one = system.user_actor("U1");
        let two = system.user_actor("U2");
        one.create(user_one(), cancel.clone()).await.unwrap();
        two.create(User::new("U2", "UserTwo", "user2@x.com"), cancel.clone())
            .await
            .unwrap();

        one.add_token(UserToken::new("U1", "Google", "access_token", Some("a".into())), cancel.clone())
            .await
            .unwrap();
        two.add_token(UserToken::new("U2", "Google", "access_token", Some("b".into())), cancel.clone())
            .await
            .unwrap();
        assert_eq!(
            indexes.tokens.find_user_id("Google", "access_token").await.unwrap(),
            Some("U2".into())
        );

        one.remove_token("Google".into(), "access_token".into(), cancel.clone())
            .await
            .unwrap();
        one.reindex(cancel.clone()).await.unwrap();
        one.delete(cancel).await.unwrap();

        assert_eq!(
            indexes.tokens.find_user_id("Google", "access_token").await.unwrap(),
            Some("U2".into())
        );
        let token = two
            .get_token("Google".into(), "access_token".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(token.value.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_deleting_token_holder_keeps_index_of_newer_holder() {
        let (system, _store) = system();
        let indexes = UserIndexServices::new(system.proxy_factory());
        let cancel = CancellationToken::new();
        let one = system.user_actor("U1");
        let two = system.user_actor("U2");
        one.create(user_one(), cancel.clone()).await.unwrap();
        two.create(User::new("U2", "UserTwo", "user2@x.com"), cancel.clone())
            .await
            .unwrap();
        one.add_token(UserToken::new("U1", "Google", "access_token", Some("a".into())), cancel.clone())
            .await
            .unwrap();
        two.add_token(UserToken::new("U2", "Google", "access_token", Some("b".into())), cancel.clone())
            .await
            .unwrap();

        // Reindexing the older holder must not take the entry back.
        assert!(one.reindex(cancel.clone()).await.unwrap());
        assert_eq!(
            indexes.tokens.find_user_id("Google", "access_token").await.unwrap(),
            Some("U2".into())
        );

        one.delete(cancel).await.unwrap();
        assert_eq!(
            indexes.tokens.find_user_id("Google", "access_token").await.unwrap(),
            Some("U2".into())
        );
    }

    #[test]
    fn test_token_value_is_redacted_in_debug_output() {
        let token = UserToken::new("U1", "Google", "access_token", Some("secret".into()));
        assert!(!format!("{token:?}").contains("secret"));
    }
}
