use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// One vote received by a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub user: Id,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub voted_at: DateTime<Utc>,
}

impl VoteRecord {
    pub fn new(user: Id) -> Self {
        Self {
            user,
            voted_at: Utc::now(),
        }
    }
}

/// Core candidate data, as stored in the database.
///
/// `vote_count` always equals `votes.len()`: the two are only ever
/// changed together in a single document update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    pub name: String,
    pub party: String,
    pub age: u32,
    pub vote_count: u64,
    pub votes: Vec<VoteRecord>,
}

impl CandidateCore {
    /// A candidate that has not yet received any votes.
    pub fn new(name: String, party: String, age: u32) -> Self {
        Self {
            name,
            party,
            age,
            vote_count: 0,
            votes: Vec::new(),
        }
    }

    /// Append a vote, keeping the count in step.
    pub fn record_vote(&mut self, voter: Id) {
        self.votes.push(VoteRecord::new(voter));
        self.vote_count += 1;
    }

    /// Does the count agree with the vote list?
    pub fn is_consistent(&self) -> bool {
        self.vote_count == self.votes.len() as u64
    }
}

/// A candidate without an ID.
pub type NewCandidate = CandidateCore;

/// A candidate from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}
