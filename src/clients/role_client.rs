use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::{Claim, Role};
use crate::keys::ActorAddress;
use crate::messages::RoleRequest;

/// Client for interacting with one role actor.
#[derive(Clone, Debug)]
pub struct RoleActorClient {
    address: ActorAddress,
    sender: mpsc::Sender<RoleRequest>,
}

impl_client_new!(RoleActorClient, RoleRequest);

client_method!(RoleActorClient => fn create(role: Role, cancel: CancellationToken) -> bool as RoleRequest::Create);
client_method!(RoleActorClient => fn find() -> Option<Role> as RoleRequest::Find);
client_method!(RoleActorClient => fn exists() -> bool as RoleRequest::Exists);
client_method!(RoleActorClient => fn update(role: Role, cancel: CancellationToken) -> () as RoleRequest::Update);
client_method!(RoleActorClient => fn delete(cancel: CancellationToken) -> () as RoleRequest::Delete);

client_method!(RoleActorClient => fn add_claims(claims: Vec<Claim>, cancel: CancellationToken) -> () as RoleRequest::AddClaims);
client_method!(RoleActorClient => fn get_claims() -> Vec<Claim> as RoleRequest::GetClaims);
client_method!(RoleActorClient => fn remove_claims(claims: Vec<Claim>, cancel: CancellationToken) -> () as RoleRequest::RemoveClaims);
client_method!(RoleActorClient => fn replace_claim(claim: Claim, new_claim: Claim, cancel: CancellationToken) -> () as RoleRequest::ReplaceClaim);

client_method!(RoleActorClient => fn reindex(cancel: CancellationToken) -> bool as RoleRequest::Reindex);
