use serde::{Deserialize, Serialize};

use super::ApiId;

/// A state change pushed to live clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum LiveEvent {
    #[serde(rename_all = "camelCase")]
    CandidateAdded { candidate_id: ApiId },
    #[serde(rename_all = "camelCase")]
    CandidateDeleted { candidate_id: ApiId },
    #[serde(rename_all = "camelCase")]
    VoteCountUpdate { candidate_id: ApiId, vote_count: u64 },
}

impl LiveEvent {
    /// The event name clients subscribe to.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CandidateAdded { .. } => "candidateAdded",
            Self::CandidateDeleted { .. } => "candidateDeleted",
            Self::VoteCountUpdate { .. } => "voteCountUpdate",
        }
    }
}
