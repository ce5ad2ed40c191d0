use crate::error::{Error, Result};
use crate::model::{
    api::{candidate::VoteReceipt, event::LiveEvent},
    mongodb::Id,
    store::Stores,
};
use crate::notifier::Notifier;

/// Cast `caller_id`'s single vote for `candidate_id`.
///
/// Preconditions are checked in order, each with its own error: the
/// candidate exists, the caller exists, the caller is not an admin, and the
/// caller has not voted.
///
/// The has-voted flag is then flipped with a conditional update *before*
/// the candidate is touched, so concurrent attempts by the same user have
/// exactly one winner. The two writes are not transactional: a crash between
/// them leaves the user marked as voted with the vote uncounted, which is
/// visible as `count_voted() > sum of vote counts` and never as a double vote.
pub async fn cast_vote(
    stores: &Stores,
    notifier: &Notifier,
    candidate_id: Id,
    caller_id: Id,
) -> Result<VoteReceipt> {
    stores
        .candidates
        .candidate_by_id(candidate_id)
        .await?
        .ok_or(Error::CandidateNotFound(candidate_id))?;

    let user = stores
        .users
        .user_by_id(caller_id)
        .await?
        .ok_or(Error::UserNotFound(caller_id))?;
    if user.is_admin() {
        return Err(Error::VoteNotPermittedForAdmin);
    }
    if user.has_voted {
        return Err(Error::AlreadyVoted);
    }

    // Another request may have voted since the read above.
    if !stores.users.mark_voted(caller_id).await? {
        debug!("Lost a concurrent vote race for user {caller_id}");
        return Err(Error::AlreadyVoted);
    }

    let vote_count = match stores.candidates.record_vote(candidate_id, caller_id).await {
        Ok(Some(count)) => count,
        Ok(None) => {
            // Deleted after the existence check; give the user their vote back.
            stores.users.unmark_voted(caller_id).await?;
            return Err(Error::CandidateNotFound(candidate_id));
        }
        Err(e) => {
            error!("User {caller_id} is marked as voted but their vote for {candidate_id} was not recorded");
            return Err(e);
        }
    };

    info!("Recorded vote by {caller_id} for candidate {candidate_id} (now {vote_count})");
    notifier.publish(LiveEvent::VoteCountUpdate {
        candidate_id: candidate_id.into(),
        vote_count,
    });

    Ok(VoteReceipt {
        candidate_id: candidate_id.into(),
        vote_count,
    })
}
