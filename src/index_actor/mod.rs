//! Index actors: the identity of each instance is the index key.

mod key_hash;
mod key_value;

pub use key_hash::KeyHashActor;
pub use key_value::KeyValueActor;

/// State slot of a key-value index actor.
pub const VALUE_STATE_NAME: &str = "Value";

/// State slot of a key-hash index actor.
pub const MEMBERS_STATE_NAME: &str = "Members";
