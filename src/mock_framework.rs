//! # Mock Framework
//!
//! Utilities for testing stores and services without running real actors.
//!
//! [`MockProxyFactory`] hands out clients wired to channels the test owns.
//! Register an address with one of the `expect_*` methods to get the receiving
//! end, then script replies with helpers like [`expect_find`] or
//! [`expect_all`]. Calls to addresses that were never registered fail as if the
//! actor were closed.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::actor_framework::{closed_mailbox, ActorProxyFactory};
use crate::clients::{KeyHashClient, KeyValueClient, RoleActorClient, UserActorClient};
use crate::domain::{Claim, User};
use crate::keys::{ActorAddress, ROLE_ACTOR_TYPE, USER_ACTOR_TYPE};
use crate::messages::{KeyHashRequest, KeyValueRequest, Response, RoleRequest, UserRequest};

const MOCK_BUFFER_SIZE: usize = 16;

/// Proxy factory whose actors are scripted by the test.
#[derive(Default)]
pub struct MockProxyFactory {
    users: Mutex<HashMap<String, mpsc::Sender<UserRequest>>>,
    roles: Mutex<HashMap<String, mpsc::Sender<RoleRequest>>>,
    key_values: Mutex<HashMap<ActorAddress, mpsc::Sender<KeyValueRequest>>>,
    key_hashes: Mutex<HashMap<ActorAddress, mpsc::Sender<KeyHashRequest>>>,
}

fn register<K: std::hash::Hash + Eq, R>(map: &Mutex<HashMap<K, mpsc::Sender<R>>>, key: K) -> mpsc::Receiver<R> {
    let (sender, receiver) = mpsc::channel(MOCK_BUFFER_SIZE);
    map.lock().unwrap().insert(key, sender);
    receiver
}

fn lookup<K: std::hash::Hash + Eq, R>(map: &Mutex<HashMap<K, mpsc::Sender<R>>>, key: &K) -> mpsc::Sender<R> {
    map.lock().unwrap().get(key).cloned().unwrap_or_else(closed_mailbox)
}

impl MockProxyFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_user(&self, user_id: &str) -> mpsc::Receiver<UserRequest> {
        register(&self.users, user_id.to_string())
    }

    pub fn expect_role(&self, role_id: &str) -> mpsc::Receiver<RoleRequest> {
        register(&self.roles, role_id.to_string())
    }

    pub fn expect_key_value(&self, address: ActorAddress) -> mpsc::Receiver<KeyValueRequest> {
        register(&self.key_values, address)
    }

    pub fn expect_key_hash(&self, address: ActorAddress) -> mpsc::Receiver<KeyHashRequest> {
        register(&self.key_hashes, address)
    }
}

impl ActorProxyFactory for MockProxyFactory {
    fn user_actor(&self, user_id: &str) -> UserActorClient {
        UserActorClient::new(
            ActorAddress::new(USER_ACTOR_TYPE, user_id),
            lookup(&self.users, &user_id.to_string()),
        )
    }

    fn role_actor(&self, role_id: &str) -> RoleActorClient {
        RoleActorClient::new(
            ActorAddress::new(ROLE_ACTOR_TYPE, role_id),
            lookup(&self.roles, &role_id.to_string()),
        )
    }

    fn key_value_actor(&self, address: ActorAddress) -> KeyValueClient {
        let sender = lookup(&self.key_values, &address);
        KeyValueClient::new(address, sender)
    }

    fn key_hash_actor(&self, address: ActorAddress) -> KeyHashClient {
        let sender = lookup(&self.key_hashes, &address);
        KeyHashClient::new(address, sender)
    }
}

/// Helper to verify that the next message is a Find request
pub async fn expect_find(receiver: &mut mpsc::Receiver<UserRequest>) -> Option<Response<Option<User>>> {
    match receiver.recv().await {
        Some(UserRequest::Find { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is a GetClaims request
pub async fn expect_get_claims(receiver: &mut mpsc::Receiver<UserRequest>) -> Option<Response<Vec<Claim>>> {
    match receiver.recv().await {
        Some(UserRequest::GetClaims { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is a key-value Get request
pub async fn expect_get(receiver: &mut mpsc::Receiver<KeyValueRequest>) -> Option<Response<Option<String>>> {
    match receiver.recv().await {
        Some(KeyValueRequest::Get { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is a key-hash All request
pub async fn expect_all(
    receiver: &mut mpsc::Receiver<KeyHashRequest>,
) -> Option<(usize, usize, Response<Vec<String>>)> {
    match receiver.recv().await {
        Some(KeyHashRequest::All { skip, take, respond_to }) => Some((skip, take, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IdentityError;

    #[tokio::test]
    async fn test_mock_user_actor() {
        let factory = MockProxyFactory::new();
        let mut receiver = factory.expect_user("u1");
        let client = factory.user_actor("u1");

        let find_task = tokio::spawn(async move { client.find().await });

        let responder = expect_find(&mut receiver).await.expect("Expected Find request");
        responder.send(Ok(Some(User::new("u1", "alice", "alice@x.com")))).unwrap();

        let user = find_task.await.unwrap().unwrap().unwrap();
        assert_eq!(user.id, "u1");
    }

    #[tokio::test]
    async fn test_unregistered_actor_is_closed() {
        let factory = MockProxyFactory::new();
        let err = factory.user_actor("nobody").exists().await.unwrap_err();
        assert!(matches!(err, IdentityError::ActorCommunication(_)));
    }
}
