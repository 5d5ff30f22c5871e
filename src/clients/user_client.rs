use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::{Claim, User, UserLogin, UserLoginInfo, UserToken};
use crate::keys::ActorAddress;
use crate::messages::UserRequest;

/// Client for interacting with one user actor.
#[derive(Clone, Debug)]
pub struct UserActorClient {
    address: ActorAddress,
    sender: mpsc::Sender<UserRequest>,
}

impl_client_new!(UserActorClient, UserRequest);

client_method!(UserActorClient => fn create(user: User, cancel: CancellationToken) -> bool as UserRequest::Create);
client_method!(UserActorClient => fn find() -> Option<User> as UserRequest::Find);
client_method!(UserActorClient => fn exists() -> bool as UserRequest::Exists);
client_method!(UserActorClient => fn update(user: User, cancel: CancellationToken) -> () as UserRequest::Update);
client_method!(UserActorClient => fn delete(cancel: CancellationToken) -> () as UserRequest::Delete);

client_method!(UserActorClient => fn add_claims(claims: Vec<Claim>, cancel: CancellationToken) -> () as UserRequest::AddClaims);
client_method!(UserActorClient => fn get_claims() -> Vec<Claim> as UserRequest::GetClaims);
client_method!(UserActorClient => fn remove_claims(claims: Vec<Claim>, cancel: CancellationToken) -> () as UserRequest::RemoveClaims);
client_method!(UserActorClient => fn replace_claim(claim: Claim, new_claim: Claim, cancel: CancellationToken) -> () as UserRequest::ReplaceClaim);

client_method!(UserActorClient => fn add_login(login: UserLoginInfo, cancel: CancellationToken) -> () as UserRequest::AddLogin);
client_method!(UserActorClient => fn find_login(login_provider: String, provider_key: String) -> Option<UserLogin> as UserRequest::FindLogin);
client_method!(UserActorClient => fn get_logins() -> Vec<UserLoginInfo> as UserRequest::GetLogins);
client_method!(UserActorClient => fn remove_login(login_provider: String, provider_key: String, cancel: CancellationToken) -> () as UserRequest::RemoveLogin);

client_method!(UserActorClient => fn add_token(token: UserToken, cancel: CancellationToken) -> () as UserRequest::AddToken);
client_method!(UserActorClient => fn get_token(login_provider: String, name: String) -> Option<UserToken> as UserRequest::GetToken);
client_method!(UserActorClient => fn remove_token(login_provider: String, name: String, cancel: CancellationToken) -> () as UserRequest::RemoveToken);

client_method!(UserActorClient => fn reindex(cancel: CancellationToken) -> bool as UserRequest::Reindex);
