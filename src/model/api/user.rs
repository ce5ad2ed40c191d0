use serde::{Deserialize, Serialize};

use crate::model::db::Role;

/// Account details submitted at signup. The password is plaintext and is
/// hashed before anything is stored.
#[derive(Clone, Deserialize, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub age: u32,
    pub email: String,
    pub mobile: String,
    pub address: String,
    pub national_id: String,
    pub password: String,
}

/// Raw login credentials, received from a user.
#[derive(Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub national_id: String,
    pub password: String,
    pub role: Role,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Public view of a user's own account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub national_id: String,
    pub role: Role,
    pub has_voted: bool,
    pub must_change_password: bool,
}

impl From<&crate::model::db::User> for Account {
    fn from(user: &crate::model::db::User) -> Self {
        Self {
            name: user.name.clone(),
            national_id: user.national_id.to_string(),
            role: user.role,
            has_voted: user.has_voted,
            must_change_password: user.must_change_password,
        }
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;
    use crate::model::db::examples::{ADMIN_NATIONAL_ID, ADMIN_PASSWORD, VOTER_PASSWORD};

    impl SignupRequest {
        pub fn example(national_id: &str) -> Self {
            Self {
                name: "Charles Babbage".to_string(),
                age: 79,
                email: "charles@example.com".to_string(),
                mobile: "5550199".to_string(),
                address: "1 Dorset Street".to_string(),
                national_id: national_id.to_string(),
                password: VOTER_PASSWORD.to_string(),
            }
        }
    }

    impl LoginRequest {
        pub fn example_admin() -> Self {
            Self {
                national_id: ADMIN_NATIONAL_ID.to_string(),
                password: ADMIN_PASSWORD.to_string(),
                role: Role::Admin,
            }
        }

        pub fn example_voter(national_id: &str) -> Self {
            Self {
                national_id: national_id.to_string(),
                password: VOTER_PASSWORD.to_string(),
                role: Role::Voter,
            }
        }
    }
}
