//! Comment endpoints, nested under a title's review.

use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{comments, reviews, users};
use crate::pagination::{Page, PageQuery, COMMENT_PAGE_SIZE};
use crate::permission::{Action, Target};
use crate::web::error::ApiError;
use crate::web::reviews::find_review;
use crate::web::titles::find_title;
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_comments)
        .service(create_comment)
        .service(retrieve_comment)
        .service(update_comment)
        .service(delete_comment);
}

#[derive(Serialize)]
struct CommentResponse {
    id: i32,
    author: String,
    /// Text of the parent review.
    review: String,
    text: String,
    pub_date: chrono::NaiveDateTime,
}

#[derive(Deserialize, Validate)]
struct CommentForm {
    #[validate(length(min = 1, max = 200))]
    text: String,
}

#[derive(Deserialize, Validate)]
struct CommentPatchForm {
    #[validate(length(min = 1, max = 200))]
    text: Option<String>,
}

/// Look a comment up within a review or 404.
async fn find_comment(
    db: &DatabaseConnection,
    review_id: i32,
    comment_id: i32,
) -> Result<comments::Model, ApiError> {
    comments::Entity::find_by_id(comment_id)
        .filter(comments::Column::ReviewId.eq(review_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("comment {} not found", comment_id)))
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

fn comment_response(
    comment: comments::Model,
    review: &reviews::Model,
    author: String,
) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        author,
        review: review.text.clone(),
        text: comment.text,
        pub_date: comment.pub_date,
    }
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
///
/// Comment lists use the fixed configured page size; only the page
/// number is client-controlled.
#[get("/api/v1/titles/{title_id}/reviews/{review_id}/comments")]
async fn list_comments(
    client: ClientCtx,
    req: HttpRequest,
    path: web::Path<(i32, i32)>,
    pq: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::List, Target::FeedbackCollection)?;

    let (title_id, review_id) = path.into_inner();
    let db = get_db_pool();

    find_title(db, title_id).await?;
    let review = find_review(db, title_id, review_id).await?;

    let paginator = comments::Entity::find()
        .filter(comments::Column::ReviewId.eq(review.id))
        .order_by_desc(comments::Column::PubDate)
        .paginate(db, COMMENT_PAGE_SIZE);
    let count = paginator.num_items().await?;
    let rows = paginator.fetch_page(pq.page() - 1).await?;

    let names = author_names(db, rows.iter().map(|c| c.user_id).collect()).await?;
    let results: Vec<CommentResponse> = rows
        .into_iter()
        .map(|c| {
            let author = names.get(&c.user_id).cloned().unwrap_or_default();
            comment_response(c, &review, author)
        })
        .collect();

    Ok(HttpResponse::Ok().json(Page::new(
        req.path(),
        pq.page(),
        COMMENT_PAGE_SIZE,
        count,
        results,
    )))
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
#[post("/api/v1/titles/{title_id}/reviews/{review_id}/comments")]
async fn create_comment(
    client: ClientCtx,
    path: web::Path<(i32, i32)>,
    form: web::Json<CommentForm>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Create, Target::FeedbackCollection)?;
    form.validate()?;

    let author = client.require_user()?;
    let (title_id, review_id) = path.into_inner();
    let db = get_db_pool();

    find_title(db, title_id).await?;
    let review = find_review(db, title_id, review_id).await?;

    let comment = comments::ActiveModel {
        review_id: Set(review.id),
        user_id: Set(author.id),
        text: Set(form.text.clone()),
        pub_date: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(HttpResponse::Created().json(comment_response(
        comment,
        &review,
        author.username.clone(),
    )))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
#[get("/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
async fn retrieve_comment(
    client: ClientCtx,
    path: web::Path<(i32, i32, i32)>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Retrieve, Target::FeedbackCollection)?;

    let (title_id, review_id, comment_id) = path.into_inner();
    let db = get_db_pool();

    find_title(db, title_id).await?;
    let review = find_review(db, title_id, review_id).await?;
    let comment = find_comment(db, review.id, comment_id).await?;

    let names = author_names(db, vec![comment.user_id]).await?;
    let author = names.get(&comment.user_id).cloned().unwrap_or_default();

    Ok(HttpResponse::Ok().json(comment_response(comment, &review, author)))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
#[patch("/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
async fn update_comment(
    client: ClientCtx,
    path: web::Path<(i32, i32, i32)>,
    form: web::Json<CommentPatchForm>,
) -> Result<HttpResponse, ApiError> {
    let (title_id, review_id, comment_id) = path.into_inner();
    let db = get_db_pool();

    find_title(db, title_id).await?;
    let review = find_review(db, title_id, review_id).await?;
    let comment = find_comment(db, review.id, comment_id).await?;

    client.enforce(
        Action::Update,
        Target::Feedback {
            author_id: comment.user_id,
        },
    )?;
    form.validate()?;

    let author_id = comment.user_id;
    let mut active: comments::ActiveModel = comment.into();
    if let Some(text) = &form.text {
        active.text = Set(text.clone());
    }
    let comment = active.update(db).await?;

    let names = author_names(db, vec![author_id]).await?;
    let author = names.get(&author_id).cloned().unwrap_or_default();

    Ok(HttpResponse::Ok().json(comment_response(comment, &review, author)))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
#[delete("/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
async fn delete_comment(
    client: ClientCtx,
    path: web::Path<(i32, i32, i32)>,
) -> Result<HttpResponse, ApiError> {
    let (title_id, review_id, comment_id) = path.into_inner();
    let db = get_db_pool();

    find_title(db, title_id).await?;
    let review = find_review(db, title_id, review_id).await?;
    let comment = find_comment(db, review.id, comment_id).await?;

    client.enforce(
        Action::Delete,
        Target::Feedback {
            author_id: comment.user_id,
        },
    )?;

    comment.delete(db).await?;

    Ok(HttpResponse::NoContent().finish())
}
