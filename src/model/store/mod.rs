//! Storage contracts for users and candidates.
//!
//! Every operation is atomic with respect to a single document; nothing here
//! spans more than one document, so callers sequence multi-document changes
//! themselves.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{
    db::{Candidate, NationalId, NewCandidate, NewUser, PasswordHash, Role, User},
    mongodb::Id,
};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Persistence of user records.
#[rocket::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user by their database ID.
    async fn user_by_id(&self, id: Id) -> Result<Option<User>>;

    /// Find a user by national ID.
    async fn user_by_national_id(&self, national_id: &NationalId) -> Result<Option<User>>;

    /// Find a user by national ID, only if they hold the given role.
    async fn user_by_national_id_and_role(
        &self,
        national_id: &NationalId,
        role: Role,
    ) -> Result<Option<User>>;

    /// Does at least one user hold the given role?
    async fn any_with_role(&self, role: Role) -> Result<bool>;

    /// Insert a new user, failing with `DuplicateIdentity` if the national ID is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User>;

    /// Replace a user's password hash and clear their must-change-password flag.
    /// Returns false if no such user exists.
    async fn set_password(&self, id: Id, password_hash: PasswordHash) -> Result<bool>;

    /// Set `has_voted` only if it is currently false.
    /// Returns whether the update applied.
    async fn mark_voted(&self, id: Id) -> Result<bool>;

    /// Reverse a `mark_voted` whose vote could not be recorded.
    async fn unmark_voted(&self, id: Id) -> Result<()>;

    /// Number of users whose has-voted flag is set.
    async fn count_voted(&self) -> Result<u64>;
}

/// Persistence of candidate records.
#[rocket::async_trait]
pub trait CandidateStore: Send + Sync {
    /// All candidates, in insertion order.
    async fn all_candidates(&self) -> Result<Vec<Candidate>>;

    /// Find a candidate by ID.
    async fn candidate_by_id(&self, id: Id) -> Result<Option<Candidate>>;

    /// Insert a new candidate.
    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate>;

    /// Delete a candidate, returning it as it was at deletion.
    /// Returns `None` if no such candidate exists.
    async fn delete_candidate(&self, id: Id) -> Result<Option<Candidate>>;

    /// Append a vote by `voter` and increment the count, in one update.
    /// Returns the new vote count, or `None` if the candidate doesn't exist.
    async fn record_vote(&self, id: Id, voter: Id) -> Result<Option<u64>>;
}

/// Handles on both stores, placed in managed state.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn CredentialStore>,
    pub candidates: Arc<dyn CandidateStore>,
}

impl Stores {
    /// Stores backed by the given MongoDB database.
    pub fn mongodb(db: &mongodb::Database) -> Self {
        let store = Arc::new(MongoStore::new(db));
        Self {
            users: store.clone(),
            candidates: store,
        }
    }

    /// Stores held entirely in process memory.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            users: store.clone(),
            candidates: store,
        }
    }
}
