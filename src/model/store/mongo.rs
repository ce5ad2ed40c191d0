use mongodb::{
    bson::{doc, to_bson},
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Database,
};
use rocket::futures::TryStreamExt;

use crate::error::{Error, Result};
use crate::model::{
    db::{Candidate, NationalId, NewCandidate, NewUser, PasswordHash, Role, User, VoteRecord},
    mongodb::{is_duplicate_key_error, Coll, Id},
};

use super::{CandidateStore, CredentialStore};

/// A store backed by MongoDB collections.
#[derive(Clone)]
pub struct MongoStore {
    users: Coll<User>,
    new_users: Coll<NewUser>,
    candidates: Coll<Candidate>,
    new_candidates: Coll<NewCandidate>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            users: Coll::from_db(db),
            new_users: Coll::from_db(db),
            candidates: Coll::from_db(db),
            new_candidates: Coll::from_db(db),
        }
    }
}

/// Serialize a value for use inside a filter or update document.
fn bson_of<T: serde::Serialize>(value: &T) -> Result<mongodb::bson::Bson> {
    to_bson(value).map_err(|e| Error::Internal(format!("BSON serialization failed: {e}")))
}

#[rocket::async_trait]
impl CredentialStore for MongoStore {
    async fn user_by_id(&self, id: Id) -> Result<Option<User>> {
        Ok(self.users.find_one(id.as_doc(), None).await?)
    }

    async fn user_by_national_id(&self, national_id: &NationalId) -> Result<Option<User>> {
        let filter = doc! {
            "national_id": national_id.as_str(),
        };
        Ok(self.users.find_one(filter, None).await?)
    }

    async fn user_by_national_id_and_role(
        &self,
        national_id: &NationalId,
        role: Role,
    ) -> Result<Option<User>> {
        let filter = doc! {
            "national_id": national_id.as_str(),
            "role": bson_of(&role)?,
        };
        Ok(self.users.find_one(filter, None).await?)
    }

    async fn any_with_role(&self, role: Role) -> Result<bool> {
        let filter = doc! {
            "role": bson_of(&role)?,
        };
        Ok(self.users.find_one(filter, None).await?.is_some())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let national_id = user.national_id.to_string();
        let new_id: Id = match self.new_users.insert_one(&user, None).await {
            Ok(result) => result
                .inserted_id
                .as_object_id()
                .ok_or_else(|| Error::Internal("Inserted user has no ObjectId".to_string()))?
                .into(),
            // The unique index catches races between concurrent signups.
            Err(e) if is_duplicate_key_error(&e) => {
                return Err(Error::DuplicateIdentity(national_id))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(User { id: new_id, user })
    }

    async fn set_password(&self, id: Id, password_hash: PasswordHash) -> Result<bool> {
        let update = doc! {
            "$set": {
                "password_hash": bson_of(&password_hash)?,
                "must_change_password": false,
            }
        };
        let result = self.users.update_one(id.as_doc(), update, None).await?;
        Ok(result.matched_count == 1)
    }

    async fn mark_voted(&self, id: Id) -> Result<bool> {
        let filter = doc! {
            "_id": id,
            "has_voted": false,
        };
        let update = doc! {
            "$set": {
                "has_voted": true,
            }
        };
        let result = self.users.update_one(filter, update, None).await?;
        Ok(result.modified_count == 1)
    }

    async fn unmark_voted(&self, id: Id) -> Result<()> {
        let update = doc! {
            "$set": {
                "has_voted": false,
            }
        };
        self.users.update_one(id.as_doc(), update, None).await?;
        Ok(())
    }

    async fn count_voted(&self) -> Result<u64> {
        let filter = doc! {
            "has_voted": true,
        };
        Ok(self.users.count_documents(filter, None).await?)
    }
}

#[rocket::async_trait]
impl CandidateStore for MongoStore {
    async fn all_candidates(&self) -> Result<Vec<Candidate>> {
        let candidates = self
            .candidates
            .find(None, None)
            .await?
            .try_collect()
            .await?;
        Ok(candidates)
    }

    async fn candidate_by_id(&self, id: Id) -> Result<Option<Candidate>> {
        Ok(self.candidates.find_one(id.as_doc(), None).await?)
    }

    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate> {
        let new_id: Id = self
            .new_candidates
            .insert_one(&candidate, None)
            .await?
            .inserted_id
            .as_object_id()
            .ok_or_else(|| Error::Internal("Inserted candidate has no ObjectId".to_string()))?
            .into();
        Ok(Candidate {
            id: new_id,
            candidate,
        })
    }

    async fn delete_candidate(&self, id: Id) -> Result<Option<Candidate>> {
        Ok(self.candidates.find_one_and_delete(id.as_doc(), None).await?)
    }

    async fn record_vote(&self, id: Id, voter: Id) -> Result<Option<u64>> {
        // Push and increment in the same update so the count never drifts from the list.
        let update = doc! {
            "$push": { "votes": bson_of(&VoteRecord::new(voter))? },
            "$inc": { "vote_count": 1_i64 },
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let candidate = self
            .candidates
            .find_one_and_update(id.as_doc(), update, options)
            .await?;
        Ok(candidate.map(|c| c.vote_count))
    }
}
