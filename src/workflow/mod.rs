//! Operations behind the HTTP routes, independent of Rocket's request types.

pub mod accounts;
pub mod candidates;
pub mod voting;
