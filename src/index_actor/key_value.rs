use async_trait::async_trait;
use tracing::{debug, instrument};

use super::VALUE_STATE_NAME;
use crate::actor_framework::VirtualActor;
use crate::error::Result;
use crate::messages::KeyValueRequest;
use crate::state::ActorStateManager;

/// Maps its own key to a single value.
///
/// No uniqueness check happens here: callers decide when a mapping should
/// exist and `set` simply overwrites.
pub struct KeyValueActor {
    state: ActorStateManager,
    // Outer None: not loaded yet in this activation.
    value: Option<Option<String>>,
}

impl KeyValueActor {
    pub fn new(state: ActorStateManager) -> Self {
        Self { state, value: None }
    }

    async fn load(&mut self) -> Result<Option<String>> {
        if let Some(value) = &self.value {
            return Ok(value.clone());
        }
        let value = self.state.try_get::<String>(VALUE_STATE_NAME).await?;
        self.value = Some(value.clone());
        Ok(value)
    }

    #[instrument(skip(self), fields(key = %self.state.scope()))]
    async fn handle_set(&mut self, value: String) -> Result<()> {
        if self.load().await?.as_deref() == Some(value.as_str()) {
            return Ok(());
        }
        self.state.set(VALUE_STATE_NAME, &value)?;
        self.value = None;
        self.state.save().await?;
        debug!("Index value set");
        self.value = Some(Some(value));
        Ok(())
    }

    #[instrument(skip(self), fields(key = %self.state.scope()))]
    async fn handle_remove(&mut self) -> Result<()> {
        if self.load().await?.is_none() {
            return Ok(());
        }
        self.state.remove(VALUE_STATE_NAME);
        self.value = None;
        self.state.save().await?;
        debug!("Index value removed");
        self.value = Some(None);
        Ok(())
    }

    async fn handle_set_if_vacant(&mut self, value: String) -> Result<bool> {
        match self.load().await? {
            Some(current) => Ok(current == value),
            None => {
                self.handle_set(value).await?;
                Ok(true)
            }
        }
    }

    async fn handle_remove_if(&mut self, expected: String) -> Result<bool> {
        if self.load().await?.as_deref() != Some(expected.as_str()) {
            debug!("Index value owned elsewhere, kept");
            return Ok(false);
        }
        self.handle_remove().await?;
        Ok(true)
    }
}

#[async_trait]
impl VirtualActor for KeyValueActor {
    type Request = KeyValueRequest;

    async fn handle(&mut self, request: KeyValueRequest) {
        match request {
            KeyValueRequest::Set { value, respond_to } => {
                let _ = respond_to.send(self.handle_set(value).await);
            }
            KeyValueRequest::Get { respond_to } => {
                let _ = respond_to.send(self.load().await);
            }
            KeyValueRequest::Remove { respond_to } => {
                let _ = respond_to.send(self.handle_remove().await);
            }
            KeyValueRequest::SetIfVacant { value, respond_to } => {
                let _ = respond_to.send(self.handle_set_if_vacant(value).await);
            }
            KeyValueRequest::RemoveIf { expected, respond_to } => {
                let _ = respond_to.send(self.handle_remove_if(expected).await);
            }
        }
    }
}
