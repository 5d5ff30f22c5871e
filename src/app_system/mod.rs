//! System orchestration, startup, and shutdown logic.

pub mod identity_system;
pub mod tracing;

pub use self::identity_system::*;
pub use self::tracing::*;
