//! Signup and token exchange endpoints.

use crate::auth;
use crate::db::get_db_pool;
use crate::web::error::ApiError;
use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(signup).service(get_token);
}

#[derive(Deserialize, Validate)]
struct SignupForm {
    #[validate(length(min = 1, max = 120))]
    username: String,
    #[validate(email, length(max = 200))]
    email: String,
}

#[derive(Serialize)]
struct SignupResponse {
    username: String,
    email: String,
}

/// POST /api/v1/auth/signup - register, or re-issue a confirmation code
#[post("/api/v1/auth/signup")]
async fn signup(form: web::Json<SignupForm>) -> Result<HttpResponse, ApiError> {
    form.validate()?;

    let signup = auth::signup(get_db_pool(), form.username.trim(), form.email.trim()).await?;

    // Fire-and-forget; a failed send is logged, never surfaced.
    auth::dispatch_confirmation_email(&signup.user, &signup.code);

    log::info!("Confirmation code issued for user: {}", signup.user.username);

    Ok(HttpResponse::Ok().json(SignupResponse {
        username: signup.user.username,
        email: signup.user.email,
    }))
}

#[derive(Deserialize, Validate)]
struct TokenForm {
    #[validate(length(min = 1))]
    username: String,
    #[validate(length(min = 1))]
    confirmation_code: String,
}

#[derive(Serialize)]
struct TokenResponse {
    token: String,
}

/// POST /api/v1/auth/token - exchange username+code for a bearer token
#[post("/api/v1/auth/token")]
async fn get_token(form: web::Json<TokenForm>) -> Result<HttpResponse, ApiError> {
    form.validate()?;

    let token =
        auth::exchange_token(get_db_pool(), &form.username, &form.confirmation_code).await?;

    Ok(HttpResponse::Created().json(TokenResponse { token }))
}
