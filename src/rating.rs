//! Title rating aggregation.
//!
//! Ratings are recomputed from the review rows on every read. There is
//! no cache and no incremental bookkeeping to fall out of sync.

use crate::orm::reviews;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};

/// Arithmetic mean of review scores.
///
/// A title with no reviews has no rating at all, which is distinct from
/// a rating of zero.
pub fn mean_score(scores: &[i16]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: i64 = scores.iter().map(|s| i64::from(*s)).sum();
    Some(sum as f64 / scores.len() as f64)
}

/// Recompute a title's rating from its review scores.
pub async fn title_rating(
    db: &DatabaseConnection,
    title_id: i32,
) -> Result<Option<f64>, DbErr> {
    let scores: Vec<i16> = reviews::Entity::find()
        .filter(reviews::Column::TitleId.eq(title_id))
        .all(db)
        .await?
        .iter()
        .map(|r| r.score)
        .collect();

    Ok(mean_score(&scores))
}
