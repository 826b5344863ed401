//! Todo Lists API Library
//!
//! This library provides an in-memory store of named todo lists and the
//! HTTP layer that exposes it.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
