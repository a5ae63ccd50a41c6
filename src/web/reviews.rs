//! Review endpoints, nested under titles.

use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{reviews, titles, users};
use crate::pagination::{Page, PageQuery};
use crate::permission::{Action, Target};
use crate::web::error::ApiError;
use crate::web::titles::find_title;
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_reviews)
        .service(create_review)
        .service(retrieve_review)
        .service(update_review)
        .service(delete_review);
}

#[derive(Serialize)]
struct ReviewResponse {
    id: i32,
    author: String,
    title: String,
    text: String,
    score: i16,
    pub_date: chrono::NaiveDateTime,
}

#[derive(Deserialize, Validate)]
struct ReviewForm {
    #[validate(length(min = 1, max = 200))]
    text: String,
    score: i16,
}

#[derive(Deserialize, Validate)]
struct ReviewPatchForm {
    #[validate(length(min = 1, max = 200))]
    text: Option<String>,
    score: Option<i16>,
}

/// Scores run from 1 to 10 inclusive.
pub fn validate_score(score: i16) -> Result<(), ApiError> {
    if !(1..=10).contains(&score) {
        return Err(ApiError::Validation(format!(
            "score {} is outside the allowed 1..=10 range",
            score
        )));
    }
    Ok(())
}

/// Look a review up within a title or 404.
pub async fn find_review(
    db: &DatabaseConnection,
    title_id: i32,
    review_id: i32,
) -> Result<reviews::Model, ApiError> {
    reviews::Entity::find_by_id(review_id)
        .filter(reviews::Column::TitleId.eq(title_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("review {} not found", review_id)))
}

/// Create a review, enforcing the one-per-(title, author) rule and the
/// score range. The author is always the authenticated requester.
pub async fn create_review_for(
    db: &DatabaseConnection,
    title: &titles::Model,
    author: &users::Model,
    text: &str,
    score: i16,
) -> Result<reviews::Model, ApiError> {
    validate_score(score)?;

    let already_reviewed = reviews::Entity::find()
        .filter(reviews::Column::TitleId.eq(title.id))
        .filter(reviews::Column::UserId.eq(author.id))
        .one(db)
        .await?
        .is_some();
    if already_reviewed {
        return Err(ApiError::Validation(
            "you have already reviewed this title".to_string(),
        ));
    }

    Ok(reviews::ActiveModel {
        title_id: Set(title.id),
        user_id: Set(author.id),
        text: Set(text.to_owned()),
        score: Set(score),
        pub_date: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Helper: map author ids onto usernames in one query.
async fn author_names(
    db: &DatabaseConnection,
    user_ids: Vec<i32>,
) -> Result<HashMap<i32, String>, ApiError> {
    Ok(users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect())
}

fn review_response(review: reviews::Model, title: &titles::Model, author: String) -> ReviewResponse {
    ReviewResponse {
        id: review.id,
        author,
        title: title.name.clone(),
        text: review.text,
        score: review.score,
        pub_date: review.pub_date,
    }
}

/// GET /api/v1/titles/{title_id}/reviews
#[get("/api/v1/titles/{title_id}/reviews")]
async fn list_reviews(
    client: ClientCtx,
    req: HttpRequest,
    path: web::Path<i32>,
    pq: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::List, Target::FeedbackCollection)?;

    let db = get_db_pool();
    let title = find_title(db, path.into_inner()).await?;

    let paginator = reviews::Entity::find()
        .filter(reviews::Column::TitleId.eq(title.id))
        .order_by_desc(reviews::Column::PubDate)
        .paginate(db, pq.size());
    let count = paginator.num_items().await?;
    let rows = paginator.fetch_page(pq.page() - 1).await?;

    let names = author_names(db, rows.iter().map(|r| r.user_id).collect()).await?;
    let results: Vec<ReviewResponse> = rows
        .into_iter()
        .map(|r| {
            let author = names.get(&r.user_id).cloned().unwrap_or_default();
            review_response(r, &title, author)
        })
        .collect();

    Ok(HttpResponse::Ok().json(Page::new(req.path(), pq.page(), pq.size(), count, results)))
}

/// POST /api/v1/titles/{title_id}/reviews
#[post("/api/v1/titles/{title_id}/reviews")]
async fn create_review(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<ReviewForm>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Create, Target::FeedbackCollection)?;
    form.validate()?;

    let author = client.require_user()?;
    let db = get_db_pool();
    let title = find_title(db, path.into_inner()).await?;

    let review = create_review_for(db, &title, author, &form.text, form.score).await?;

    Ok(HttpResponse::Created().json(review_response(
        review,
        &title,
        author.username.clone(),
    )))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}
#[get("/api/v1/titles/{title_id}/reviews/{review_id}")]
async fn retrieve_review(
    client: ClientCtx,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Retrieve, Target::FeedbackCollection)?;

    let (title_id, review_id) = path.into_inner();
    let db = get_db_pool();

    let title = find_title(db, title_id).await?;
    let review = find_review(db, title_id, review_id).await?;

    let names = author_names(db, vec![review.user_id]).await?;
    let author = names.get(&review.user_id).cloned().unwrap_or_default();

    Ok(HttpResponse::Ok().json(review_response(review, &title, author)))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}
#[patch("/api/v1/titles/{title_id}/reviews/{review_id}")]
async fn update_review(
    client: ClientCtx,
    path: web::Path<(i32, i32)>,
    form: web::Json<ReviewPatchForm>,
) -> Result<HttpResponse, ApiError> {
    let (title_id, review_id) = path.into_inner();
    let db = get_db_pool();

    let title = find_title(db, title_id).await?;
    let review = find_review(db, title_id, review_id).await?;

    client.enforce(
        Action::Update,
        Target::Feedback {
            author_id: review.user_id,
        },
    )?;
    form.validate()?;

    if let Some(score) = form.score {
        validate_score(score)?;
    }

    let author_id = review.user_id;
    let mut active: reviews::ActiveModel = review.into();
    if let Some(text) = &form.text {
        active.text = Set(text.clone());
    }
    if let Some(score) = form.score {
        active.score = Set(score);
    }
    let review = active.update(db).await?;

    let names = author_names(db, vec![author_id]).await?;
    let author = names.get(&author_id).cloned().unwrap_or_default();

    Ok(HttpResponse::Ok().json(review_response(review, &title, author)))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id} - the store
/// cascades the delete to the review's comments
#[delete("/api/v1/titles/{title_id}/reviews/{review_id}")]
async fn delete_review(
    client: ClientCtx,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, ApiError> {
    let (title_id, review_id) = path.into_inner();
    let db = get_db_pool();

    find_title(db, title_id).await?;
    let review = find_review(db, title_id, review_id).await?;

    client.enforce(
        Action::Delete,
        Target::Feedback {
            author_id: review.user_id,
        },
    )?;

    review.delete(db).await?;

    Ok(HttpResponse::NoContent().finish())
}
