use std::{
    fmt::Display,
    ops::{Deref, DerefMut},
};

use argon2::Config;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::Id;

const NATIONAL_ID_LENGTH: usize = 12;

/// A national identity number: exactly twelve ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NationalId(String);

impl NationalId {
    /// Validate the given string as a national ID.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.len() == NATIONAL_ID_LENGTH && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(Error::validation(format!(
                "National ID must be exactly {NATIONAL_ID_LENGTH} digits"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NationalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Different privilege levels.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Voter,
}

impl Display for Role {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Admin => "admin",
                Self::Voter => "voter",
            }
        )
    }
}

/// An Argon2-encoded password hash. The only way to build one from a
/// plaintext password is [`PasswordHash::new`], so every stored secret
/// is hashed on write.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash the given plaintext password with a fresh random salt.
    pub fn new(password: &str) -> Result<Self> {
        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let encoded = argon2::hash_encoded(password.as_bytes(), &salt, &Config::default())?;
        Ok(Self(encoded))
    }

    /// Check whether the given password matches this hash.
    pub fn verify(&self, password: &str) -> Result<bool> {
        Ok(argon2::verify_encoded(&self.0, password.as_bytes())?)
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Core user data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCore {
    pub name: String,
    pub age: u32,
    pub email: String,
    pub mobile: String,
    pub address: String,
    pub national_id: NationalId,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub has_voted: bool,
    /// Set on provisioned accounts whose password is a published default.
    #[serde(default)]
    pub must_change_password: bool,
}

impl UserCore {
    /// Check whether the given password is correct.
    pub fn verify_password(&self, password: &str) -> Result<bool> {
        self.password_hash.verify(password)
    }
}

/// A user without an ID.
pub type NewUser = UserCore;

/// A user from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub user: UserCore,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl Deref for User {
    type Target = UserCore;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl DerefMut for User {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.user
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn national_id_format() {
        assert!(NationalId::parse("000000000000").is_ok());
        assert!(NationalId::parse("123456789012").is_ok());

        for bad in ["", "12345678901", "1234567890123", "12345678901a", " 23456789012", "１２３４５６７８９０１２"] {
            assert!(
                matches!(NationalId::parse(bad), Err(Error::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = PasswordHash::new("correct horse").unwrap();
        assert!(hash.verify("correct horse").unwrap());
        assert!(!hash.verify("battery staple").unwrap());
    }

    #[test]
    fn password_hashes_are_salted() {
        let a = PasswordHash::new("same").unwrap();
        let b = PasswordHash::new("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn role_names() {
        assert_eq!(Role::default(), Role::Voter);
        assert_eq!(Role::Admin.to_string(), "admin");
        let role: Role = rocket::serde::json::from_str("\"voter\"").unwrap();
        assert_eq!(role, Role::Voter);
    }
}
