//! API-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are plain hex strings.
//! - Passwords only ever travel inbound.

pub mod auth;
pub mod candidate;
pub mod event;
pub mod form;
pub mod user;

mod id;
pub use id::ApiId;
