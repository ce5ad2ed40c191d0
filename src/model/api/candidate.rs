use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::db::{Candidate, NewCandidate};

use super::ApiId;

/// A new candidate, as submitted by an admin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CandidateRequest {
    pub name: String,
    pub party: String,
    pub age: u32,
}

impl CandidateRequest {
    /// Validate the request, producing a candidate with no votes.
    pub fn into_candidate(self) -> Result<NewCandidate> {
        let name = self.name.trim();
        let party = self.party.trim();
        if name.is_empty() {
            return Err(Error::validation("Candidate name must not be empty"));
        }
        if party.is_empty() {
            return Err(Error::validation("Candidate party must not be empty"));
        }
        Ok(NewCandidate::new(name.to_string(), party.to_string(), self.age))
    }
}

/// A candidate as shown to users: everything except who voted for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: ApiId,
    pub name: String,
    pub party: String,
    pub age: u32,
    pub vote_count: u64,
}

impl From<Candidate> for CandidateSummary {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id.into(),
            name: candidate.candidate.name,
            party: candidate.candidate.party,
            age: candidate.candidate.age,
            vote_count: candidate.candidate.vote_count,
        }
    }
}

/// The candidate list seen by a signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateList {
    pub candidates: Vec<CandidateSummary>,
    pub is_admin: bool,
}

/// The outcome of a successful vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub candidate_id: ApiId,
    pub vote_count: u64,
}
