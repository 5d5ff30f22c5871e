use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::MEMBERS_STATE_NAME;
use crate::actor_framework::VirtualActor;
use crate::error::Result;
use crate::messages::KeyHashRequest;
use crate::state::ActorStateManager;

/// A named set of member ids.
///
/// Members are kept ordered so enumeration with `skip`/`take` is stable.
pub struct KeyHashActor {
    state: ActorStateManager,
    members: Option<BTreeSet<String>>,
}

impl KeyHashActor {
    pub fn new(state: ActorStateManager) -> Self {
        Self { state, members: None }
    }

    async fn load(&mut self) -> Result<&mut BTreeSet<String>> {
        if self.members.is_none() {
            let members = self
                .state
                .try_get::<BTreeSet<String>>(MEMBERS_STATE_NAME)
                .await?
                .unwrap_or_default();
            self.members = Some(members);
        }
        Ok(self.members.get_or_insert_with(BTreeSet::new))
    }

    async fn persist(&mut self, members: BTreeSet<String>) -> Result<()> {
        if members.is_empty() {
            self.state.remove(MEMBERS_STATE_NAME);
        } else {
            self.state.set(MEMBERS_STATE_NAME, &members)?;
        }
        self.members = None;
        self.state.save().await?;
        self.members = Some(members);
        Ok(())
    }

    #[instrument(skip(self), fields(key = %self.state.scope()))]
    async fn handle_add(&mut self, member: String) -> Result<usize> {
        let members = self.load().await?;
        if members.contains(&member) {
            return Ok(members.len());
        }
        let mut members = members.clone();
        members.insert(member);
        let count = members.len();
        self.persist(members).await?;
        debug!(count, "Member added");
        Ok(count)
    }

    #[instrument(skip(self), fields(key = %self.state.scope()))]
    async fn handle_remove(&mut self, member: String) -> Result<()> {
        let members = self.load().await?;
        if !members.contains(&member) {
            return Ok(());
        }
        let mut members = members.clone();
        members.remove(&member);
        self.persist(members).await?;
        debug!("Member removed");
        Ok(())
    }

    /// `take == 0` means no limit.
    async fn handle_all(&mut self, skip: usize, take: usize) -> Result<Vec<String>> {
        let members = self.load().await?;
        let take = if take == 0 { usize::MAX } else { take };
        Ok(members.iter().skip(skip).take(take).cloned().collect())
    }
}

#[async_trait]
impl VirtualActor for KeyHashActor {
    type Request = KeyHashRequest;

    async fn handle(&mut self, request: KeyHashRequest) {
        match request {
            KeyHashRequest::Add { member, respond_to } => {
                let _ = respond_to.send(self.handle_add(member).await);
            }
            KeyHashRequest::Remove { member, respond_to } => {
                let _ = respond_to.send(self.handle_remove(member).await);
            }
            KeyHashRequest::All { skip, take, respond_to } => {
                let _ = respond_to.send(self.handle_all(skip, take).await);
            }
        }
    }
}
