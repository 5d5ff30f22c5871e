//! Store façades over the identity actors.
//!
//! Calls go straight to the entity actor when the id is known, otherwise an
//! index is consulted first. Domain failures such as duplicates come back as
//! [`IdentityResult`](crate::domain::IdentityResult); infrastructure failures
//! as [`IdentityError`](crate::error::IdentityError).

mod role_store;
mod user_store;

pub use role_store::RoleStore;
pub use user_store::UserStore;

use crate::error::Result;

/// Keeps `Ok(Some(_))` values, skipping ids that vanished in between.
///
/// Ids whose actor reports `NotFound` are dropped like absent ones; other
/// errors are returned.
pub(crate) fn collect_found<T>(results: Vec<Result<Option<T>>>) -> Result<Vec<T>> {
    let mut found = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(Some(value)) => found.push(value),
            Ok(None) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
    }
    Ok(found)
}
