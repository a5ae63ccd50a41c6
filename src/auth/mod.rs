//! Signup and confirmation-code token exchange.
//!
//! A user signs up with a username and email, receives a UUID
//! confirmation code by email, and exchanges it together with the
//! username for a signed bearer token. Codes never expire; a repeated
//! signup for the same (username, email) pair overwrites the stored
//! code with a fresh one.

pub mod token;

use crate::email;
use crate::orm::users::{self, Role};
use crate::web::error::ApiError;
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection};
use uuid::Uuid;

/// Outcome of a signup: the affected user row and the freshly issued
/// confirmation code. The code leaves the server by email only.
pub struct Signup {
    pub user: users::Model,
    pub code: String,
}

/// Register a user, or re-issue a confirmation code for an existing
/// exact (username, email) pair. A collision on either field alone is a
/// uniqueness violation.
pub async fn signup(
    db: &DatabaseConnection,
    username: &str,
    email_addr: &str,
) -> Result<Signup, ApiError> {
    if username == "me" {
        return Err(ApiError::Validation(
            "username \"me\" is reserved".to_string(),
        ));
    }

    let code = Uuid::new_v4().to_string();

    let existing = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .filter(users::Column::Email.eq(email_addr))
        .one(db)
        .await?;

    let user = match existing {
        Some(user) => {
            // Idempotent re-issue: overwrite the stored code.
            let mut active: users::ActiveModel = user.into();
            active.confirmation_code = Set(Some(code.clone()));
            active.update(db).await?
        }
        None => {
            let username_taken = users::Entity::find()
                .filter(users::Column::Username.eq(username))
                .one(db)
                .await?
                .is_some();
            if username_taken {
                return Err(ApiError::Validation(format!(
                    "username \"{}\" is already taken",
                    username
                )));
            }

            let email_taken = users::Entity::find()
                .filter(users::Column::Email.eq(email_addr))
                .one(db)
                .await?
                .is_some();
            if email_taken {
                return Err(ApiError::Validation(format!(
                    "email \"{}\" is already registered",
                    email_addr
                )));
            }

            users::ActiveModel {
                username: Set(username.to_owned()),
                email: Set(email_addr.to_owned()),
                role: Set(Role::User),
                confirmation_code: Set(Some(code.clone())),
                created_at: Set(Utc::now().naive_utc()),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    Ok(Signup { user, code })
}

/// Exchange a username and confirmation code for a bearer token.
pub async fn exchange_token(
    db: &DatabaseConnection,
    username: &str,
    confirmation_code: &str,
) -> Result<String, ApiError> {
    let user = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user \"{}\" not found", username)))?;

    match user.confirmation_code.as_deref() {
        Some(code) if code == confirmation_code => {}
        _ => {
            return Err(ApiError::InvalidCredentials(
                "confirmation code does not match".to_string(),
            ))
        }
    }

    token::issue(user.id, &user.username).map_err(|e| {
        log::error!("Failed to issue token for {}: {}", user.username, e);
        ApiError::Internal("token issuance failed".to_string())
    })
}

/// Fire-and-forget dispatch of the confirmation code email. A failed
/// send is logged, never surfaced to the caller.
pub fn dispatch_confirmation_email(user: &users::Model, code: &str) {
    let to = user.email.clone();
    let username = user.username.clone();
    let code = code.to_owned();

    actix_web::rt::spawn(async move {
        if let Err(e) = email::templates::send_confirmation_code_email(&to, &username, &code).await
        {
            log::error!("Failed to send confirmation email to {}: {}", to, e);
        }
    });
}
