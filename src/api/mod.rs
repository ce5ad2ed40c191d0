use mongodb::bson::oid::Error as IdError;
use rocket::{http::Status, response::status::Custom, serde::json::Json, Catcher, Request, Route};

use crate::error::{Error, ErrorBody, Result};
use crate::model::{api::auth::GuardFailure, mongodb::Id};

mod admin;
mod auth;
mod public;
mod voter;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(auth::routes());
    routes.extend(public::routes());
    routes.extend(voter::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Reject a candidate ID path segment that is not an ObjectId.
fn candidate_id(param: std::result::Result<Id, IdError>) -> Result<Id> {
    param.map_err(|err| Error::validation(format!("Invalid candidate ID: {err}")))
}

/// Render every unhandled failure as an [`ErrorBody`].
///
/// Guard failures leave their error in the request-local cache; anything
/// else is described from the status alone.
#[catch(default)]
fn default_catcher(status: Status, req: &Request<'_>) -> Custom<Json<ErrorBody>> {
    if let Some(body) = &req.local_cache(GuardFailure::default).0 {
        return Custom(status, Json(body.clone()));
    }

    // Unparseable bodies are validation errors, whatever Rocket called them.
    let status = if status == Status::UnprocessableEntity {
        Status::BadRequest
    } else {
        status
    };
    let error = match status.code {
        400 => "ValidationError",
        401 => "Unauthenticated",
        403 => "Forbidden",
        404 => "NotFound",
        500..=599 => "Internal",
        _ => "Error",
    };
    let body = ErrorBody {
        error: error.to_string(),
        message: status.reason_lossy().to_string(),
    };
    Custom(status, Json(body))
}
