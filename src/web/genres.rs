//! Genre endpoints. Same shape as categories.

use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::genres;
use crate::pagination::{Page, PageQuery};
use crate::permission::{Action, Target};
use crate::web::categories::validate_slug;
use crate::web::error::ApiError;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_genres)
        .service(create_genre)
        .service(delete_genre);
}

#[derive(Serialize)]
struct GenreResponse {
    name: String,
    slug: String,
}

impl From<genres::Model> for GenreResponse {
    fn from(genre: genres::Model) -> Self {
        GenreResponse {
            name: genre.name,
            slug: genre.slug,
        }
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Option<String>,
}

#[derive(Deserialize, Validate)]
struct GenreForm {
    #[validate(length(min = 1, max = 256))]
    name: String,
    #[validate(length(min = 1, max = 50), custom = "validate_slug")]
    slug: String,
}

/// GET /api/v1/genres - list genres, optional name search
#[get("/api/v1/genres")]
async fn list_genres(
    client: ClientCtx,
    req: HttpRequest,
    search: web::Query<SearchQuery>,
    pq: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::List, Target::Catalog)?;

    let db = get_db_pool();

    let mut find = genres::Entity::find().order_by_asc(genres::Column::Name);
    if let Some(term) = search.search.as_deref().filter(|s| !s.is_empty()) {
        find = find.filter(Expr::cust_with_values(
            "LOWER(name) LIKE ?",
            [format!("%{}%", term.to_lowercase())],
        ));
    }

    let paginator = find.paginate(db, pq.size());
    let count = paginator.num_items().await?;
    let rows = paginator.fetch_page(pq.page() - 1).await?;

    let results: Vec<GenreResponse> = rows.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(Page::new(req.path(), pq.page(), pq.size(), count, results)))
}

/// POST /api/v1/genres
#[post("/api/v1/genres")]
async fn create_genre(
    client: ClientCtx,
    form: web::Json<GenreForm>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Create, Target::Catalog)?;
    form.validate()?;

    let db = get_db_pool();

    let slug_taken = genres::Entity::find()
        .filter(genres::Column::Slug.eq(form.slug.as_str()))
        .one(db)
        .await?
        .is_some();
    if slug_taken {
        return Err(ApiError::Validation(format!(
            "genre slug \"{}\" already exists",
            form.slug
        )));
    }

    let genre = genres::ActiveModel {
        name: Set(form.name.clone()),
        slug: Set(form.slug.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(HttpResponse::Created().json(GenreResponse::from(genre)))
}

/// DELETE /api/v1/genres/{slug}
#[delete("/api/v1/genres/{slug}")]
async fn delete_genre(client: ClientCtx, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Delete, Target::Catalog)?;

    let slug = path.into_inner();
    let db = get_db_pool();

    let genre = genres::Entity::find()
        .filter(genres::Column::Slug.eq(slug.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("genre \"{}\" not found", slug)))?;

    genre.delete(db).await?;

    Ok(HttpResponse::NoContent().finish())
}
