use mongodb::bson::oid::Error as IdError;
use rocket::{http::CookieJar, serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::{
        auth::AuthToken,
        candidate::{CandidateList, VoteReceipt},
    },
    mongodb::Id,
    store::Stores,
};
use crate::notifier::Notifier;
use crate::workflow::{candidates, voting};

pub fn routes() -> Vec<Route> {
    routes![candidate_list, vote]
}

#[get("/candidates")]
async fn candidate_list(token: AuthToken, stores: &State<Stores>) -> Result<Json<CandidateList>> {
    let is_admin = candidates::is_admin(stores.users.as_ref(), token.id).await?;
    let candidates = candidates::list_candidates(stores.candidates.as_ref()).await?;
    Ok(Json(CandidateList {
        candidates,
        is_admin,
    }))
}

/// Cast the caller's vote, ending their session once it is counted.
#[post("/vote/<candidate_id>")]
async fn vote(
    candidate_id: std::result::Result<Id, IdError>,
    token: AuthToken,
    cookies: &CookieJar<'_>,
    stores: &State<Stores>,
    notifier: &State<Notifier>,
) -> Result<Json<VoteReceipt>> {
    let candidate_id = super::candidate_id(candidate_id)?;
    let receipt = voting::cast_vote(stores, notifier, candidate_id, token.id).await?;
    AuthToken::end_session(cookies);
    Ok(Json(receipt))
}

#[cfg(test)]
mod tests {
    use rocket::{http::Status, local::asynchronous::Client};

    use super::*;
    use crate::error::ErrorBody;
    use crate::model::{
        api::auth::AUTH_TOKEN_COOKIE,
        db::{examples::VOTER_NATIONAL_ID, NationalId, NewCandidate, NewUser},
    };

    #[backend_test]
    async fn candidates_requires_session(client: Client) {
        let response = client.get(uri!(candidate_list)).dispatch().await;

        assert_eq!(Status::Unauthorized, response.status());
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.error, "Unauthenticated");
    }

    #[backend_test]
    async fn candidates_with_garbage_token(client: Client) {
        let response = client
            .get(uri!(candidate_list))
            .cookie(rocket::http::Cookie::new(AUTH_TOKEN_COOKIE, "not.a.jwt"))
            .dispatch()
            .await;

        assert_eq!(Status::BadRequest, response.status());
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.error, "InvalidToken");
    }

    #[backend_test(voter)]
    async fn candidates_as_voter(client: Client, stores: Stores) {
        stores
            .candidates
            .insert_candidate(NewCandidate::example())
            .await
            .unwrap();

        let response = client.get(uri!(candidate_list)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        let list: CandidateList = response.into_json().await.unwrap();
        assert!(!list.is_admin);
        assert_eq!(list.candidates.len(), 1);
    }

    #[backend_test(admin)]
    async fn candidates_as_admin(client: Client) {
        let response = client.get(uri!(candidate_list)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        let list: CandidateList = response.into_json().await.unwrap();
        assert!(list.is_admin);
    }

    #[backend_test(voter)]
    async fn vote_valid(client: Client, stores: Stores) {
        let candidate = stores
            .candidates
            .insert_candidate(NewCandidate::example())
            .await
            .unwrap();

        let response = client.post(uri!(vote(candidate.id))).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        let receipt: VoteReceipt = response.into_json().await.unwrap();
        assert_eq!(receipt.vote_count, 1);
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));

        let national_id = NationalId::parse(VOTER_NATIONAL_ID).unwrap();
        let voter = stores
            .users
            .user_by_national_id(&national_id)
            .await
            .unwrap()
            .unwrap();
        assert!(voter.has_voted);
    }

    #[backend_test(voter)]
    async fn vote_missing_candidate(client: Client) {
        let response = client.post(uri!(vote(Id::new()))).dispatch().await;

        assert_eq!(Status::NotFound, response.status());
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.error, "CandidateNotFound");
        // Nothing was cast, so the session survives.
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test(voter)]
    async fn vote_unparseable_candidate_id(client: Client, stores: Stores) {
        let response = client.post("/vote/not-an-id").dispatch().await;

        assert_eq!(Status::BadRequest, response.status());
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.error, "ValidationError");
        assert_eq!(stores.users.count_voted().await.unwrap(), 0);
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test(voter)]
    async fn vote_twice(client: Client, stores: Stores) {
        let candidate = stores
            .candidates
            .insert_candidate(NewCandidate::example())
            .await
            .unwrap();
        let national_id = NationalId::parse(VOTER_NATIONAL_ID).unwrap();
        let voter = stores
            .users
            .user_by_national_id(&national_id)
            .await
            .unwrap()
            .unwrap();
        voting::cast_vote(&stores, &Notifier::new(), candidate.id, voter.id)
            .await
            .unwrap();

        let response = client.post(uri!(vote(candidate.id))).dispatch().await;

        assert_eq!(Status::BadRequest, response.status());
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.error, "AlreadyVoted");
        let candidate = stores
            .candidates
            .candidate_by_id(candidate.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(candidate.vote_count, 1);
    }

    #[backend_test(admin)]
    async fn vote_as_admin(client: Client, stores: Stores) {
        let candidate = stores
            .candidates
            .insert_candidate(NewCandidate::example())
            .await
            .unwrap();

        let response = client.post(uri!(vote(candidate.id))).dispatch().await;

        assert_eq!(Status::Forbidden, response.status());
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.error, "VoteNotPermittedForAdmin");
        let candidate = stores
            .candidates
            .candidate_by_id(candidate.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(candidate.vote_count, 0);
    }

    #[backend_test]
    async fn vote_without_session(client: Client, stores: Stores) {
        stores
            .users
            .insert_user(NewUser::example_voter())
            .await
            .unwrap();
        let candidate = stores
            .candidates
            .insert_candidate(NewCandidate::example())
            .await
            .unwrap();

        let response = client.post(uri!(vote(candidate.id))).dispatch().await;

        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(stores.users.count_voted().await.unwrap(), 0);
    }
}
