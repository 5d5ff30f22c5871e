use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::UserActor;
use crate::domain::{UserLogin, UserLoginInfo};
use crate::error::Result;
use crate::keys::LoginKey;

impl UserActor {
    /// Adds or replaces the login with the same provider and key.
    ///
    /// The user is saved before the login index points at it.
    #[instrument(skip_all, fields(user_id = %self.id, provider = %login.login_provider))]
    pub(super) async fn handle_add_login(&mut self, login: UserLoginInfo, cancel: &CancellationToken) -> Result<()> {
        LoginKey::new(&login.login_provider, &login.provider_key)?;
        let mut state = self.require_state("Add login").await?;

        state
            .logins
            .retain(|l| !l.matches(&login.login_provider, &login.provider_key));
        state.logins.push(login.clone());
        self.persist(state, cancel).await?;

        self.indexes
            .logins
            .add(&login.login_provider, &login.provider_key, &self.id, cancel)
            .await?;
        debug!("Login added");
        Ok(())
    }

    pub(super) async fn handle_find_login(
        &mut self,
        login_provider: &str,
        provider_key: &str,
    ) -> Result<Option<UserLogin>> {
        let state = self.require_state("Find login").await?;
        Ok(state
            .logins
            .iter()
            .find(|l| l.matches(login_provider, provider_key))
            .map(|l| UserLogin::from_info(l, &state.user.id)))
    }

    pub(super) async fn handle_get_logins(&mut self) -> Result<Vec<UserLoginInfo>> {
        Ok(self.require_state("Get logins").await?.logins)
    }

    #[instrument(skip_all, fields(user_id = %self.id, provider = %login_provider))]
    pub(super) async fn handle_remove_login(
        &mut self,
        login_provider: &str,
        provider_key: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        LoginKey::new(login_provider, provider_key)?;
        let mut state = self.require_state("Remove login").await?;

        state.logins.retain(|l| !l.matches(login_provider, provider_key));
        self.persist(state, cancel).await?;

        self.indexes
            .logins
            .release(login_provider, provider_key, &self.id, cancel)
            .await?;
        debug!("Login removed");
        Ok(())
    }
}
