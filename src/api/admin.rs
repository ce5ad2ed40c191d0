use mongodb::bson::oid::Error as IdError;
use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::{
        auth::AdminToken,
        candidate::{CandidateRequest, CandidateSummary},
        form::{FormDescription, ADD_CANDIDATE_FORM},
    },
    mongodb::Id,
    store::Stores,
};
use crate::notifier::Notifier;
use crate::workflow::candidates;

pub fn routes() -> Vec<Route> {
    routes![add_candidate_form, add_candidate, delete_candidate]
}

#[get("/add")]
fn add_candidate_form(_token: AdminToken) -> Json<FormDescription> {
    Json(ADD_CANDIDATE_FORM)
}

#[post("/add", data = "<request>", format = "json")]
async fn add_candidate(
    _token: AdminToken,
    request: Json<CandidateRequest>,
    stores: &State<Stores>,
    notifier: &State<Notifier>,
) -> Result<Json<CandidateSummary>> {
    let candidate =
        candidates::add_candidate(stores.candidates.as_ref(), notifier, request.into_inner()).await?;
    Ok(Json(candidate))
}

#[post("/delete/<candidate_id>")]
async fn delete_candidate(
    _token: AdminToken,
    candidate_id: std::result::Result<Id, IdError>,
    stores: &State<Stores>,
    notifier: &State<Notifier>,
) -> Result<()> {
    let candidate_id = super::candidate_id(candidate_id)?;
    candidates::remove_candidate(stores.candidates.as_ref(), notifier, candidate_id).await?;
    Ok(())
}
