//! Typed handles to actor mailboxes.

#[macro_use]
mod macros;

mod role_client;
mod user_client;

use tokio::sync::mpsc;

use crate::keys::ActorAddress;
use crate::messages::{KeyHashRequest, KeyValueRequest};

pub use role_client::RoleActorClient;
pub use user_client::UserActorClient;

// =============================================================================
// Key-Value index client
// =============================================================================

#[derive(Clone, Debug)]
pub struct KeyValueClient {
    address: ActorAddress,
    sender: mpsc::Sender<KeyValueRequest>,
}

impl_client_new!(KeyValueClient, KeyValueRequest);

client_method!(KeyValueClient => fn set(value: String) -> () as KeyValueRequest::Set);
client_method!(KeyValueClient => fn get() -> Option<String> as KeyValueRequest::Get);
client_method!(KeyValueClient => fn remove() -> () as KeyValueRequest::Remove);
client_method!(KeyValueClient => fn set_if_vacant(value: String) -> bool as KeyValueRequest::SetIfVacant);
client_method!(KeyValueClient => fn remove_if(expected: String) -> bool as KeyValueRequest::RemoveIf);

// =============================================================================
// Key-Hash (collection) index client
// =============================================================================

#[derive(Clone, Debug)]
pub struct KeyHashClient {
    address: ActorAddress,
    sender: mpsc::Sender<KeyHashRequest>,
}

impl_client_new!(KeyHashClient, KeyHashRequest);

client_method!(KeyHashClient => fn add(member: String) -> usize as KeyHashRequest::Add);
client_method!(KeyHashClient => fn remove(member: String) -> () as KeyHashRequest::Remove);
client_method!(KeyHashClient => fn all(skip: usize, take: usize) -> Vec<String> as KeyHashRequest::All);
