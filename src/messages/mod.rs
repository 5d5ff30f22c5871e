use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::domain::{Claim, Role, User, UserLogin, UserLoginInfo, UserToken};
use crate::error::IdentityError;

/// Reply channel carried by every request.
pub type Response<T> = oneshot::Sender<Result<T, IdentityError>>;

/// Typed message enums for actor communication. Each variant includes parameters
/// and a oneshot channel for responses. Mutating entity requests carry the
/// caller's cancellation token.

#[derive(Debug)]
pub enum KeyValueRequest {
    Set {
        value: String,
        respond_to: Response<()>,
    },
    Get {
        respond_to: Response<Option<String>>,
    },
    Remove {
        respond_to: Response<()>,
    },
    /// Sets `value` unless another value is stored; replies whether the key
    /// now maps to `value`.
    SetIfVacant {
        value: String,
        respond_to: Response<bool>,
    },
    /// Removes the value only while it equals `expected`.
    RemoveIf {
        expected: String,
        respond_to: Response<bool>,
    },
}

#[derive(Debug)]
pub enum KeyHashRequest {
    Add {
        member: String,
        respond_to: Response<usize>,
    },
    Remove {
        member: String,
        respond_to: Response<()>,
    },
    All {
        skip: usize,
        take: usize,
        respond_to: Response<Vec<String>>,
    },
}

#[derive(Debug)]
pub enum UserRequest {
    Create {
        user: User,
        cancel: CancellationToken,
        respond_to: Response<bool>,
    },
    Find {
        respond_to: Response<Option<User>>,
    },
    Exists {
        respond_to: Response<bool>,
    },
    Update {
        user: User,
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    Delete {
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    AddClaims {
        claims: Vec<Claim>,
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    GetClaims {
        respond_to: Response<Vec<Claim>>,
    },
    RemoveClaims {
        claims: Vec<Claim>,
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    ReplaceClaim {
        claim: Claim,
        new_claim: Claim,
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    AddLogin {
        login: UserLoginInfo,
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    FindLogin {
        login_provider: String,
        provider_key: String,
        respond_to: Response<Option<UserLogin>>,
    },
    GetLogins {
        respond_to: Response<Vec<UserLoginInfo>>,
    },
    RemoveLogin {
        login_provider: String,
        provider_key: String,
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    AddToken {
        token: UserToken,
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    GetToken {
        login_provider: String,
        name: String,
        respond_to: Response<Option<UserToken>>,
    },
    RemoveToken {
        login_provider: String,
        name: String,
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    Reindex {
        cancel: CancellationToken,
        respond_to: Response<bool>,
    },
}

#[derive(Debug)]
pub enum RoleRequest {
    Create {
        role: Role,
        cancel: CancellationToken,
        respond_to: Response<bool>,
    },
    Find {
        respond_to: Response<Option<Role>>,
    },
    Exists {
        respond_to: Response<bool>,
    },
    Update {
        role: Role,
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    Delete {
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    AddClaims {
        claims: Vec<Claim>,
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    GetClaims {
        respond_to: Response<Vec<Claim>>,
    },
    RemoveClaims {
        claims: Vec<Claim>,
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    ReplaceClaim {
        claim: Claim,
        new_claim: Claim,
        cancel: CancellationToken,
        respond_to: Response<()>,
    },
    Reindex {
        cancel: CancellationToken,
        respond_to: Response<bool>,
    },
}
