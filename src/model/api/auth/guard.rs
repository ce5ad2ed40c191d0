use rocket::{
    outcome::try_outcome,
    request::{FromRequest, Outcome},
    Request,
};

use crate::config::Config;
use crate::error::{Error, ErrorBody};
use crate::model::{mongodb::Id, store::Stores};

use super::token::{AuthToken, AUTH_TOKEN_COOKIE};

/// Why a request guard rejected the request, kept in the request-local
/// cache so the error catcher can report it.
#[derive(Debug, Default)]
pub struct GuardFailure(pub Option<ErrorBody>);

/// Record the failure for the catcher and fail the guard.
fn fail<T>(req: &Request<'_>, err: Error) -> Outcome<T, Error> {
    let status = err.status();
    let body = err.body();
    req.local_cache(move || GuardFailure(Some(body)));
    Outcome::Failure((status, err))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = Error;

    /// Get an [`AuthToken`] from the session cookie, verifying its signature
    /// and expiry.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(config) = req.rocket().state::<Config>() else {
            return fail(req, Error::Internal("Config is not managed".to_string()));
        };

        let Some(cookie) = req.cookies().get(AUTH_TOKEN_COOKIE) else {
            return fail(req, Error::Unauthenticated);
        };

        match AuthToken::from_cookie(cookie, config) {
            Ok(token) => Outcome::Success(token),
            Err(err) => {
                debug!("Rejected session token: {err}");
                fail(req, err)
            }
        }
    }
}

/// Proof that the caller is, right now, an admin.
///
/// The role is re-read from the credential store on every request, so a
/// demotion takes effect immediately.
#[derive(Debug, Clone, Copy)]
pub struct AdminToken {
    pub id: Id,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = try_outcome!(req.guard::<AuthToken>().await);

        let Some(stores) = req.rocket().state::<Stores>() else {
            return fail(req, Error::Internal("Stores are not managed".to_string()));
        };

        let user = match stores.users.user_by_id(token.id).await {
            Ok(user) => user,
            Err(err) => return fail(req, err),
        };
        match user {
            Some(user) if user.is_admin() => {
                if user.must_change_password {
                    fail(req, Error::PasswordChangeRequired)
                } else {
                    Outcome::Success(AdminToken { id: user.id })
                }
            }
            _ => fail(req, Error::Forbidden("admin role required".to_string())),
        }
    }
}
