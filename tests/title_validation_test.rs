//! Validation tests for titles and reviews

mod common;

use chrono::{Datelike, Utc};
use common::fixtures::*;
use critique::orm::users::Role;
use critique::orm::{categories, genres, reviews};
use critique::web::error::ApiError;
use critique::web::reviews::{create_review_for, validate_score};
use critique::web::titles::{resolve_category, resolve_genres, validate_year};
use sea_orm::{DatabaseBackend, MockDatabase};

#[test]
fn test_year_beyond_current_is_rejected() {
    let current = Utc::now().year() as i16;

    assert!(matches!(
        validate_year(current + 1),
        Err(ApiError::Validation(_))
    ));
    assert!(validate_year(current).is_ok());
    assert!(validate_year(1894).is_ok());
}

#[test]
fn test_score_must_be_between_one_and_ten() {
    assert!(matches!(validate_score(0), Err(ApiError::Validation(_))));
    assert!(matches!(validate_score(11), Err(ApiError::Validation(_))));
    assert!(matches!(validate_score(-3), Err(ApiError::Validation(_))));
    assert!(validate_score(1).is_ok());
    assert!(validate_score(10).is_ok());
}

#[actix_rt::test]
async fn test_unknown_category_slug_fails_validation() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<categories::Model>::new()])
        .into_connection();

    let result = resolve_category(&db, "no-such-category").await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[actix_rt::test]
async fn test_unknown_genre_slug_fails_validation() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<genres::Model>::new()])
        .into_connection();

    let result = resolve_genres(&db, &["no-such-genre".to_string()]).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[actix_rt::test]
async fn test_second_review_per_title_and_author_is_rejected() {
    let title = make_title(1, "Dune", 1965);
    let bob = make_user(5, "bob", Role::User);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![make_review(1, 1, 5, 7)]])
        .into_connection();

    let result = create_review_for(&db, &title, &bob, "again", 7).await;
    assert!(
        matches!(result, Err(ApiError::Validation(_))),
        "a second review for the same (title, author) pair must fail"
    );
}

#[actix_rt::test]
async fn test_first_review_is_created_with_requester_as_author() {
    let title = make_title(1, "Dune", 1965);
    let bob = make_user(5, "bob", Role::User);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            Vec::<reviews::Model>::new(), // no prior review
            vec![make_review(1, 1, 5, 7)], // insert returning
        ])
        .into_connection();

    let review = create_review_for(&db, &title, &bob, "classic", 7)
        .await
        .expect("first review should be created");

    assert_eq!(review.title_id, 1);
    assert_eq!(review.user_id, 5);
    assert_eq!(review.score, 7);
}

#[actix_rt::test]
async fn test_out_of_range_score_never_reaches_the_store() {
    // No queries appended: an out-of-range score must fail before any
    // lookup happens.
    let title = make_title(1, "Dune", 1965);
    let bob = make_user(5, "bob", Role::User);

    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let result = create_review_for(&db, &title, &bob, "way too good", 12).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}
