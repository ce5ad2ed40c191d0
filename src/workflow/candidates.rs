use crate::error::{Error, Result};
use crate::model::{
    api::{
        candidate::{CandidateRequest, CandidateSummary},
        event::LiveEvent,
    },
    mongodb::Id,
    store::{CandidateStore, CredentialStore},
};
use crate::notifier::Notifier;

/// Every candidate, without their voter lists.
pub async fn list_candidates(candidates: &dyn CandidateStore) -> Result<Vec<CandidateSummary>> {
    let all = candidates.all_candidates().await?;
    Ok(all.into_iter().map(Into::into).collect())
}

/// Whether the given user currently holds the admin role.
/// A user that no longer exists is not an admin.
pub async fn is_admin(users: &dyn CredentialStore, id: Id) -> Result<bool> {
    Ok(users
        .user_by_id(id)
        .await?
        .is_some_and(|user| user.is_admin()))
}

/// Create a candidate. The caller must already have passed the admin gate.
pub async fn add_candidate(
    candidates: &dyn CandidateStore,
    notifier: &Notifier,
    request: CandidateRequest,
) -> Result<CandidateSummary> {
    let candidate = candidates.insert_candidate(request.into_candidate()?).await?;
    info!("Added candidate {} ({})", candidate.id, candidate.name);

    notifier.publish(LiveEvent::CandidateAdded {
        candidate_id: candidate.id.into(),
    });
    Ok(candidate.into())
}

/// Delete a candidate. The caller must already have passed the admin gate.
///
/// Votes already cast for the candidate are discarded, but their voters stay
/// marked as having voted. Returns the number of votes discarded.
pub async fn remove_candidate(
    candidates: &dyn CandidateStore,
    notifier: &Notifier,
    id: Id,
) -> Result<u64> {
    let removed = candidates
        .delete_candidate(id)
        .await?
        .ok_or(Error::CandidateNotFound(id))?;
    let discarded = removed.vote_count;
    if discarded > 0 {
        warn!("Removed candidate {id} with {discarded} vote(s); those voters cannot vote again");
    } else {
        info!("Removed candidate {id}");
    }

    notifier.publish(LiveEvent::CandidateDeleted {
        candidate_id: id.into(),
    });
    Ok(discarded)
}
