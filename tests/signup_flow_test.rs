//! Integration tests for the signup / token exchange flow

mod common;

use common::fixtures::*;
use critique::auth::{self, token};
use critique::orm::users;
use critique::web::error::ApiError;
use sea_orm::{DatabaseBackend, MockDatabase};

#[actix_rt::test]
async fn test_signup_rejects_reserved_username() {
    // No queries expected; the reserved name is rejected up front.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let result = auth::signup(&db, "me", "anything@example.com").await;
    assert!(
        matches!(result, Err(ApiError::Validation(_))),
        "username \"me\" must always fail validation"
    );
}

#[actix_rt::test]
async fn test_signup_creates_user_with_fresh_code() {
    let stored = make_user_with_code(1, "alice", "d8f3f24e-9f1e-4d92-bb52-6a54eb1cf8a1");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            Vec::<users::Model>::new(), // exact (username, email) pair lookup
            Vec::<users::Model>::new(), // username conflict lookup
            Vec::<users::Model>::new(), // email conflict lookup
            vec![stored],               // insert returning
        ])
        .into_connection();

    let signup = auth::signup(&db, "alice", "alice@example.com")
        .await
        .expect("signup should succeed");

    assert_eq!(signup.user.username, "alice");
    // UUID-grade code, issued fresh for this signup.
    assert_eq!(signup.code.len(), 36);
}

#[actix_rt::test]
async fn test_signup_reissues_code_for_existing_pair() {
    let existing = make_user_with_code(1, "alice", "old-code");
    let updated = existing.clone();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            vec![existing], // exact pair found
            vec![updated],  // code overwrite returning
        ])
        .into_connection();

    let signup = auth::signup(&db, "alice", "alice@example.com")
        .await
        .expect("re-signup for the exact pair should be idempotent");

    assert_eq!(signup.code.len(), 36);
    assert_ne!(signup.code, "old-code", "a fresh code is issued each time");
}

#[actix_rt::test]
async fn test_signup_rejects_taken_username() {
    let other = make_user_with_code(1, "alice", "whatever");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            Vec::<users::Model>::new(), // exact pair: no match
            vec![other],                // username taken by another email
        ])
        .into_connection();

    let result = auth::signup(&db, "alice", "different@example.com").await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[actix_rt::test]
async fn test_token_exchange_unknown_username_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<users::Model>::new()])
        .into_connection();

    let result = auth::exchange_token(&db, "ghost", "some-code").await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[actix_rt::test]
async fn test_token_exchange_wrong_code_is_invalid_credentials() {
    let user = make_user_with_code(1, "alice", "the-right-code");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user]])
        .into_connection();

    let result = auth::exchange_token(&db, "alice", "the-wrong-code").await;
    assert!(matches!(result, Err(ApiError::InvalidCredentials(_))));
}

#[actix_rt::test]
async fn test_token_exchange_with_correct_code_yields_usable_token() {
    let user = make_user_with_code(7, "alice", "the-right-code");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user]])
        .into_connection();

    let bearer = auth::exchange_token(&db, "alice", "the-right-code")
        .await
        .expect("matching code should yield a token");

    let claims = token::verify(&bearer).expect("issued token should verify");
    assert_eq!(claims.sub, 7);
    assert_eq!(claims.username, "alice");
    assert!(claims.exp > claims.iat);
}
