//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - IDs and datetimes are serialised in MongoDB's own format.
//! - Passwords only ever appear as Argon2 hashes.

mod candidate;
pub use candidate::{Candidate, CandidateCore, NewCandidate, VoteRecord};

mod user;
pub use user::{NationalId, NewUser, PasswordHash, Role, User, UserCore};

#[cfg(test)]
pub(crate) use user::examples;
