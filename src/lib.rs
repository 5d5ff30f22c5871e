//! Identity store built on virtual actors.
//!
//! Users and roles each live in their own actor, addressed by id. Lookups by
//! name, email, login, token or claim go through index actors keyed by the
//! looked-up value. The [`stores`] expose the whole thing as user and role
//! stores; [`app_system::IdentitySystem`] wires it together.

pub mod actor_framework;
pub mod actors;
pub mod app_system;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod index_actor;
pub mod keys;
pub mod messages;
pub mod role_actor;
pub mod saga;
pub mod services;
pub mod state;
pub mod stores;
pub mod user_actor;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod mock_framework;
