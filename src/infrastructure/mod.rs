//! Infrastructure module.
//!
//! This module contains the list store and the identity provider client.

pub mod identity;
pub mod in_memory;
pub mod repository;

pub use identity::{
    HttpIdentityProvider, IdentityConfig, IdentityError, IdentityProvider, StubIdentityProvider,
    UserIdentity, UserRecord,
};
pub use in_memory::{InMemoryListStore, ItemIdPolicy};
pub use repository::{ListRepository, StoreError, TodoLists};
