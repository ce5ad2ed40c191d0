use rocket::tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::model::{
    db::{Candidate, NationalId, NewCandidate, NewUser, PasswordHash, Role, User},
    mongodb::Id,
};

use super::{CandidateStore, CredentialStore};

/// A store keeping every document in process memory.
///
/// Each collection sits behind its own lock, and every operation holds that
/// lock for its whole read-modify-write, which gives the same per-document
/// atomicity as the MongoDB store.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    candidates: RwLock<Vec<Candidate>>,
}

#[cfg(test)]
impl MemoryStore {
    pub async fn count_users(&self) -> usize {
        self.users.read().await.len()
    }
}

#[rocket::async_trait]
impl CredentialStore for MemoryStore {
    async fn user_by_id(&self, id: Id) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_national_id(&self, national_id: &NationalId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| &u.national_id == national_id)
            .cloned())
    }

    async fn user_by_national_id_and_role(
        &self,
        national_id: &NationalId,
        role: Role,
    ) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| &u.national_id == national_id && u.role == role)
            .cloned())
    }

    async fn any_with_role(&self, role: Role) -> Result<bool> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.role == role))
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.national_id == user.national_id) {
            return Err(Error::DuplicateIdentity(user.national_id.to_string()));
        }
        let user = User { id: Id::new(), user };
        users.push(user.clone());
        Ok(user)
    }

    async fn set_password(&self, id: Id, password_hash: PasswordHash) -> Result<bool> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = password_hash;
                user.must_change_password = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_voted(&self, id: Id) -> Result<bool> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id && !u.has_voted) {
            Some(user) => {
                user.has_voted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn unmark_voted(&self, id: Id) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.has_voted = false;
        }
        Ok(())
    }

    async fn count_voted(&self) -> Result<u64> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| u.has_voted).count() as u64)
    }
}

#[rocket::async_trait]
impl CandidateStore for MemoryStore {
    async fn all_candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self.candidates.read().await.clone())
    }

    async fn candidate_by_id(&self, id: Id) -> Result<Option<Candidate>> {
        let candidates = self.candidates.read().await;
        Ok(candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate> {
        let candidate = Candidate {
            id: Id::new(),
            candidate,
        };
        self.candidates.write().await.push(candidate.clone());
        Ok(candidate)
    }

    async fn delete_candidate(&self, id: Id) -> Result<Option<Candidate>> {
        let mut candidates = self.candidates.write().await;
        Ok(candidates
            .iter()
            .position(|c| c.id == id)
            .map(|index| candidates.remove(index)))
    }

    async fn record_vote(&self, id: Id, voter: Id) -> Result<Option<u64>> {
        let mut candidates = self.candidates.write().await;
        Ok(candidates.iter_mut().find(|c| c.id == id).map(|candidate| {
            candidate.record_vote(voter);
            candidate.vote_count
        }))
    }
}
