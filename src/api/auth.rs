use rocket::{http::CookieJar, serde::json::Json, Route, State};

use crate::config::Config;
use crate::error::Result;
use crate::model::{
    api::{
        auth::AuthToken,
        form::{FormDescription, CHANGE_PASSWORD_FORM, LOGIN_FORM, SIGNUP_FORM},
        user::{Account, ChangePasswordRequest, LoginRequest, SignupRequest},
    },
    store::Stores,
};
use crate::workflow::accounts;

pub fn routes() -> Vec<Route> {
    routes![
        signup_form,
        signup,
        login_form,
        login,
        change_password_form,
        change_password,
        logout,
    ]
}

#[get("/signup")]
fn signup_form() -> Json<FormDescription> {
    Json(SIGNUP_FORM)
}

#[post("/signup", data = "<request>", format = "json")]
async fn signup(
    request: Json<SignupRequest>,
    cookies: &CookieJar<'_>,
    stores: &State<Stores>,
    config: &State<Config>,
) -> Result<Json<Account>> {
    let user = accounts::signup(stores.users.as_ref(), request.into_inner()).await?;
    AuthToken::new(user.id).start_session(cookies, config)?;
    Ok(Json(Account::from(&user)))
}

#[get("/login")]
fn login_form() -> Json<FormDescription> {
    Json(LOGIN_FORM)
}

#[post("/login", data = "<request>", format = "json")]
async fn login(
    request: Json<LoginRequest>,
    cookies: &CookieJar<'_>,
    stores: &State<Stores>,
    config: &State<Config>,
) -> Result<Json<Account>> {
    let user = accounts::login(stores.users.as_ref(), request.into_inner()).await?;
    AuthToken::new(user.id).start_session(cookies, config)?;
    Ok(Json(Account::from(&user)))
}

#[get("/change-password")]
fn change_password_form(_token: AuthToken) -> Json<FormDescription> {
    Json(CHANGE_PASSWORD_FORM)
}

/// Rotating the password ends the session, so the new one must be used to
/// log back in.
#[post("/change-password", data = "<request>", format = "json")]
async fn change_password(
    token: AuthToken,
    request: Json<ChangePasswordRequest>,
    cookies: &CookieJar<'_>,
    stores: &State<Stores>,
) -> Result<()> {
    accounts::change_password(stores.users.as_ref(), token.id, request.into_inner()).await?;
    AuthToken::end_session(cookies);
    Ok(())
}

#[get("/logout")]
fn logout(cookies: &CookieJar<'_>) {
    AuthToken::end_session(cookies);
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::json,
    };

    use super::*;
    use crate::error::ErrorBody;
    use crate::model::{
        api::auth::AUTH_TOKEN_COOKIE,
        db::{
            examples::{ADMIN_NATIONAL_ID, VOTER_NATIONAL_ID, VOTER_PASSWORD},
            NationalId, NewUser, Role,
        },
    };

    #[backend_test]
    async fn signup_starts_session(client: Client, stores: Stores) {
        let response = client
            .post(uri!(signup))
            .header(ContentType::JSON)
            .body(json!(SignupRequest::example(VOTER_NATIONAL_ID)).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        let account: Account = response.into_json().await.unwrap();
        assert_eq!(account.role, Role::Voter);
        assert_eq!(account.national_id, VOTER_NATIONAL_ID);
        assert!(!account.has_voted);
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());

        let national_id = NationalId::parse(VOTER_NATIONAL_ID).unwrap();
        let user = stores
            .users
            .user_by_national_id(&national_id)
            .await
            .unwrap()
            .unwrap();
        assert!(user.verify_password(VOTER_PASSWORD).unwrap());
    }

    #[backend_test]
    async fn signup_invalid_national_id(client: Client, stores: Stores) {
        let response = client
            .post(uri!(signup))
            .header(ContentType::JSON)
            .body(json!(SignupRequest::example("12345")).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::BadRequest, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.error, "ValidationError");
        assert!(!stores.users.any_with_role(Role::Voter).await.unwrap());
    }

    #[backend_test]
    async fn signup_duplicate(client: Client, stores: Stores) {
        stores
            .users
            .insert_user(NewUser::example_voter())
            .await
            .unwrap();

        let response = client
            .post(uri!(signup))
            .header(ContentType::JSON)
            .body(json!(SignupRequest::example(VOTER_NATIONAL_ID)).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::BadRequest, response.status());
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.error, "DuplicateIdentity");
    }

    #[backend_test]
    async fn login_valid(client: Client, stores: Stores) {
        stores
            .users
            .insert_user(NewUser::example_voter())
            .await
            .unwrap();

        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(json!(LoginRequest::example_voter(VOTER_NATIONAL_ID)).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test]
    async fn login_wrong_role_looks_like_wrong_password(client: Client, stores: Stores) {
        stores
            .users
            .insert_user(NewUser::example_voter())
            .await
            .unwrap();

        let wrong_role = LoginRequest {
            role: Role::Admin,
            ..LoginRequest::example_voter(VOTER_NATIONAL_ID)
        };
        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(json!(wrong_role).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
        let wrong_role: ErrorBody = response.into_json().await.unwrap();

        let wrong_password = LoginRequest {
            password: "hunter2".to_string(),
            ..LoginRequest::example_voter(VOTER_NATIONAL_ID)
        };
        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(json!(wrong_password).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
        let wrong_password: ErrorBody = response.into_json().await.unwrap();

        assert_eq!(wrong_role, wrong_password);
        assert_eq!(wrong_role.error, "InvalidCredentials");
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test]
    async fn forms_are_described(client: Client) {
        for (uri, form) in [(uri!(signup_form), SIGNUP_FORM), (uri!(login_form), LOGIN_FORM)] {
            let response = client.get(uri).dispatch().await;
            assert_eq!(Status::Ok, response.status());
            let body: rocket::serde::json::Value = response.into_json().await.unwrap();
            assert_eq!(body["submit_to"], form.submit_to);
            assert_eq!(body["fields"].as_array().unwrap().len(), form.fields.len());
        }
    }

    #[backend_test]
    async fn change_password_requires_session(client: Client) {
        let response = client.get(uri!(change_password_form)).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.error, "Unauthenticated");
    }

    #[backend_test(voter)]
    async fn change_password_ends_session(client: Client, stores: Stores) {
        let request = ChangePasswordRequest {
            current_password: VOTER_PASSWORD.to_string(),
            new_password: "a better password".to_string(),
        };
        let response = client
            .post(uri!(change_password))
            .header(ContentType::JSON)
            .body(json!(request).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));

        let national_id = NationalId::parse(VOTER_NATIONAL_ID).unwrap();
        let user = stores
            .users
            .user_by_national_id(&national_id)
            .await
            .unwrap()
            .unwrap();
        assert!(user.verify_password("a better password").unwrap());
    }

    #[backend_test(voter)]
    async fn change_password_wrong_current(client: Client) {
        let request = ChangePasswordRequest {
            current_password: "not my password".to_string(),
            new_password: "a better password".to_string(),
        };
        let response = client
            .post(uri!(change_password))
            .header(ContentType::JSON)
            .body(json!(request).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Unauthorized, response.status());
        // A failed attempt keeps the session.
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test(admin)]
    async fn logout_admin(client: Client) {
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
        let response = client.get(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test]
    async fn logout_not_logged_in(client: Client) {
        let response = client.get(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
    }

    #[backend_test]
    async fn provisioned_admin_must_rotate_password(client: Client, stores: Stores) {
        let mut admin = NewUser::example_admin();
        admin.must_change_password = true;
        stores.users.insert_user(admin).await.unwrap();

        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(json!(LoginRequest::example_admin()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let account: Account = response.into_json().await.unwrap();
        assert_eq!(account.national_id, ADMIN_NATIONAL_ID);
        assert!(account.must_change_password);

        let response = client.get("/add").dispatch().await;
        assert_eq!(Status::Forbidden, response.status());
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.error, "PasswordChangeRequired");
    }
}
