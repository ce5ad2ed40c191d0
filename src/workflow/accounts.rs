use crate::config::DefaultAdmin;
use crate::error::{Error, Result};
use crate::model::{
    api::user::{ChangePasswordRequest, LoginRequest, SignupRequest},
    db::{NationalId, NewUser, PasswordHash, Role, User},
    mongodb::Id,
    store::CredentialStore,
};

/// Create a voter account.
///
/// The national ID is validated before storage is touched. Signup never
/// produces an admin.
pub async fn signup(users: &dyn CredentialStore, request: SignupRequest) -> Result<User> {
    let national_id = NationalId::parse(&request.national_id)?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Name must not be empty"));
    }
    if request.password.is_empty() {
        return Err(Error::validation("Password must not be empty"));
    }

    if users.user_by_national_id(&national_id).await?.is_some() {
        debug!("Rejected signup for existing national ID {national_id}");
        return Err(Error::DuplicateIdentity(national_id.to_string()));
    }

    let user = NewUser {
        name: name.to_string(),
        age: request.age,
        email: request.email,
        mobile: request.mobile,
        address: request.address,
        national_id,
        password_hash: PasswordHash::new(&request.password)?,
        role: Role::Voter,
        has_voted: false,
        must_change_password: false,
    };
    // The store enforces uniqueness too, in case of a concurrent signup.
    let user = users.insert_user(user).await?;
    info!("Registered voter {}", user.id);
    Ok(user)
}

/// Check credentials for the claimed role.
///
/// Every mismatch fails with the same [`Error::InvalidCredentials`], so the
/// caller can't tell which field was wrong.
pub async fn login(users: &dyn CredentialStore, request: LoginRequest) -> Result<User> {
    if request.national_id.is_empty() || request.password.is_empty() {
        return Err(Error::validation("National ID and password are required"));
    }
    let Ok(national_id) = NationalId::parse(&request.national_id) else {
        return Err(Error::InvalidCredentials);
    };

    let user = users
        .user_by_national_id_and_role(&national_id, request.role)
        .await?
        .ok_or(Error::InvalidCredentials)?;
    if !user.verify_password(&request.password)? {
        debug!("Wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    info!("User {} logged in as {}", user.id, user.role);
    Ok(user)
}

/// Replace the password of `user_id` after checking the current one.
pub async fn change_password(
    users: &dyn CredentialStore,
    user_id: Id,
    request: ChangePasswordRequest,
) -> Result<()> {
    if request.new_password.is_empty() {
        return Err(Error::validation("New password must not be empty"));
    }

    let user = users
        .user_by_id(user_id)
        .await?
        .ok_or(Error::UserNotFound(user_id))?;
    if !user.verify_password(&request.current_password)? {
        return Err(Error::InvalidCredentials);
    }

    let hash = PasswordHash::new(&request.new_password)?;
    if !users.set_password(user_id, hash).await? {
        return Err(Error::UserNotFound(user_id));
    }
    info!("User {user_id} changed their password");
    Ok(())
}

/// Provision the configured admin if no admin exists yet.
/// Returns whether an account was created.
pub async fn ensure_admin_exists(
    users: &dyn CredentialStore,
    admin: &DefaultAdmin,
) -> Result<bool> {
    if users.any_with_role(Role::Admin).await? {
        return Ok(false);
    }

    let user = NewUser {
        name: admin.name.clone(),
        age: admin.age,
        email: admin.email.clone(),
        mobile: admin.mobile.clone(),
        address: admin.address.clone(),
        national_id: NationalId::parse(&admin.national_id)?,
        password_hash: PasswordHash::new(&admin.password)?,
        role: Role::Admin,
        has_voted: false,
        must_change_password: true,
    };
    let user = users.insert_user(user).await?;
    warn!(
        "No admin found, created one with national ID {}. Log in and change its password before using admin actions",
        user.national_id
    );
    Ok(true)
}
