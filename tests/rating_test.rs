//! Rating aggregation tests

mod common;

use common::fixtures::*;
use critique::orm::reviews;
use critique::rating::{mean_score, title_rating};
use sea_orm::{DatabaseBackend, MockDatabase};

#[test]
fn test_no_scores_means_no_rating() {
    // Absent, not zero.
    assert_eq!(mean_score(&[]), None);
}

#[test]
fn test_mean_of_scores() {
    assert_eq!(mean_score(&[7]), Some(7.0));
    assert_eq!(mean_score(&[7, 9]), Some(8.0));

    let rating = mean_score(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]).unwrap();
    assert!((rating - 5.5).abs() < 1e-9);

    // Non-integer means survive.
    let rating = mean_score(&[3, 4]).unwrap();
    assert!((rating - 3.5).abs() < 1e-9);
}

#[actix_rt::test]
async fn test_title_with_no_reviews_has_null_rating() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<reviews::Model>::new()])
        .into_connection();

    let rating = title_rating(&db, 1).await.expect("query should succeed");
    assert_eq!(rating, None);
}

#[actix_rt::test]
async fn test_title_rating_is_mean_of_its_reviews() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            make_review(1, 1, 10, 7),
            make_review(2, 1, 11, 9),
            make_review(3, 1, 12, 10),
        ]])
        .into_connection();

    let rating = title_rating(&db, 1)
        .await
        .expect("query should succeed")
        .expect("three reviews should yield a rating");
    assert!((rating - 26.0 / 3.0).abs() < 1e-9);
}
