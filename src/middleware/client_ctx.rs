//! Per-request client context.
//!
//! Resolves the `Authorization: Bearer` header to a user row. A missing
//! header makes a guest context; a header that is present but invalid
//! fails extraction outright.

use crate::auth::token;
use crate::db::get_db_pool;
use crate::orm::users;
use crate::permission::{decide, Action, Decision, Target};
use crate::web::error::ApiError;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sea_orm::entity::prelude::*;

/// Client data resolved for a single request cycle.
#[derive(Clone, Debug, Default)]
pub struct ClientCtx {
    /// User data. None is a guest.
    user: Option<users::Model>,
}

impl ClientCtx {
    /// Build a context for a known user. Intended for tests.
    pub fn for_user(user: users::Model) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&users::Model> {
        self.user.as_ref()
    }

    pub fn get_id(&self) -> Option<i32> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn is_user(&self) -> bool {
        self.user.is_some()
    }

    /// The authenticated user, or 401.
    pub fn require_user(&self) -> Result<&users::Model, ApiError> {
        self.user.as_ref().ok_or(ApiError::AuthenticationRequired)
    }

    /// Run an action+target pair through the authorization engine,
    /// mapping a denial onto 401 for guests and 403 for everyone else.
    pub fn enforce(&self, action: Action, target: Target) -> Result<(), ApiError> {
        match decide(self.user(), action, target) {
            Decision::Allow => Ok(()),
            Decision::Deny => match self.user {
                Some(_) => Err(ApiError::Forbidden),
                None => Err(ApiError::AuthenticationRequired),
            },
        }
    }
}

impl FromRequest for ClientCtx {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let raw = match header {
                None => return Ok(ClientCtx::default()),
                Some(raw) => raw,
            };

            let token_str = raw
                .strip_prefix("Bearer ")
                .ok_or(ApiError::AuthenticationRequired)?;

            let claims = token::verify(token_str).map_err(|_| ApiError::AuthenticationRequired)?;

            // A token for a user that no longer exists is no credential.
            let user = users::Entity::find_by_id(claims.sub)
                .one(get_db_pool())
                .await
                .map_err(|e| {
                    log::error!("Failed to load user {}: {}", claims.sub, e);
                    ApiError::Internal("failed to resolve client".to_string())
                })?
                .ok_or(ApiError::AuthenticationRequired)?;

            Ok(ClientCtx { user: Some(user) })
        })
    }
}
