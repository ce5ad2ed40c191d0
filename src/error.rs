use argon2::Error as Argon2Error;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use mongodb::error::Error as DbError;
use rocket::{
    http::Status,
    response::{self, status::Custom, Responder},
    serde::json::Json,
    Request,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::mongodb::Id;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Access denied. No token provided.")]
    Unauthenticated,
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),
    #[error("Access denied: {0}")]
    Forbidden(String),
    #[error("The default password must be changed before performing admin actions")]
    PasswordChangeRequired,
    #[error("{0}")]
    Validation(String),
    #[error("User with national ID {0} already exists")]
    DuplicateIdentity(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Candidate {0} not found")]
    CandidateNotFound(Id),
    #[error("User {0} not found")]
    UserNotFound(Id),
    #[error("You have already voted")]
    AlreadyVoted,
    #[error("Admin is not allowed to vote")]
    VoteNotPermittedForAdmin,
    #[error(transparent)]
    StoreUnavailable(#[from] DbError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// The stable, client-visible name of this kind of error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Unauthenticated",
            Self::InvalidToken(_) => "InvalidToken",
            Self::Forbidden(_) => "Forbidden",
            Self::PasswordChangeRequired => "PasswordChangeRequired",
            Self::Validation(_) => "ValidationError",
            Self::DuplicateIdentity(_) => "DuplicateIdentity",
            Self::InvalidCredentials => "InvalidCredentials",
            Self::CandidateNotFound(_) => "CandidateNotFound",
            Self::UserNotFound(_) => "UserNotFound",
            Self::AlreadyVoted => "AlreadyVoted",
            Self::VoteNotPermittedForAdmin => "VoteNotPermittedForAdmin",
            Self::StoreUnavailable(_) => "StoreUnavailable",
            Self::Argon2(_) | Self::Internal(_) => "Internal",
        }
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Unauthenticated | Self::InvalidCredentials => Status::Unauthorized,
            Self::InvalidToken(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Self::Forbidden(_) | Self::PasswordChangeRequired | Self::VoteNotPermittedForAdmin => {
                Status::Forbidden
            }
            Self::Validation(_) | Self::DuplicateIdentity(_) | Self::AlreadyVoted => {
                Status::BadRequest
            }
            Self::CandidateNotFound(_) | Self::UserNotFound(_) => Status::NotFound,
            Self::StoreUnavailable(_) | Self::Argon2(_) | Self::Internal(_) => {
                Status::InternalServerError
            }
        }
    }

    /// The response body for this error.
    pub fn body(&self) -> ErrorBody {
        let message = match self {
            // Driver errors can leak deployment details.
            Self::StoreUnavailable(_) | Self::Argon2(_) | Self::Internal(_) => {
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        ErrorBody {
            error: self.kind().to_string(),
            message,
        }
    }
}

/// The JSON shape of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        if status.code >= 500 {
            error!("{} {}: {self}", req.method(), req.uri());
        } else {
            warn!("{} {}: {self}", req.method(), req.uri());
        }
        Custom(status, Json(self.body())).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = Error::validation("National ID must be exactly 12 digits");
        assert_eq!(err.status(), Status::BadRequest);
        assert_eq!(
            err.body(),
            ErrorBody {
                error: "ValidationError".to_string(),
                message: "National ID must be exactly 12 digits".to_string(),
            }
        );
    }

    #[test]
    fn store_errors_hide_details() {
        let err = Error::Internal("secret path /var/db".to_string());
        let body = err.body();
        assert_eq!(body.error, "Internal");
        assert!(!body.message.contains("/var/db"));
        assert_eq!(err.status(), Status::InternalServerError);
    }

    #[test]
    fn expired_tokens_are_unauthorized() {
        let expired: JwtError = JwtErrorKind::ExpiredSignature.into();
        assert_eq!(Error::from(expired).status(), Status::Unauthorized);
        let garbage: JwtError = JwtErrorKind::InvalidToken.into();
        assert_eq!(Error::from(garbage).status(), Status::BadRequest);
    }
}
