mod guard;
mod token;

pub use guard::{AdminToken, GuardFailure};
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
