//! Title endpoints: catalog CRUD with slug-resolved relations, list
//! filters and the per-read rating.

use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{categories, genres, title_genres, titles};
use crate::pagination::{Page, PageQuery};
use crate::permission::{Action, Target};
use crate::rating::title_rating;
use crate::web::error::ApiError;
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use chrono::{Datelike, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_titles)
        .service(create_title)
        .service(retrieve_title)
        .service(update_title)
        .service(delete_title);
}

#[derive(Serialize)]
struct CategoryRepr {
    name: String,
    slug: String,
}

#[derive(Serialize)]
struct GenreRepr {
    name: String,
    slug: String,
}

#[derive(Serialize)]
struct TitleResponse {
    id: i32,
    name: String,
    year: i16,
    /// Mean review score; null while the title has no reviews.
    rating: Option<f64>,
    description: Option<String>,
    genre: Vec<GenreRepr>,
    category: Option<CategoryRepr>,
}

/// Filters accepted by the title list.
#[derive(Deserialize)]
struct TitleFilterQuery {
    genre: Option<String>,
    category: Option<String>,
    year: Option<i16>,
    name: Option<String>,
}

#[derive(Deserialize, Validate)]
struct TitleForm {
    #[validate(length(min = 1, max = 256))]
    name: String,
    year: i16,
    #[validate(length(max = 256))]
    description: Option<String>,
    /// Category slug.
    category: Option<String>,
    /// Genre slugs.
    #[serde(default)]
    genre: Vec<String>,
}

#[derive(Deserialize, Validate)]
struct TitlePatchForm {
    #[validate(length(min = 1, max = 256))]
    name: Option<String>,
    year: Option<i16>,
    #[validate(length(max = 256))]
    description: Option<String>,
    category: Option<String>,
    genre: Option<Vec<String>>,
}

/// A release year may not lie in the future.
pub fn validate_year(year: i16) -> Result<(), ApiError> {
    let current = Utc::now().year() as i16;
    if year > current {
        return Err(ApiError::Validation(format!(
            "year {} is beyond the current year {}",
            year, current
        )));
    }
    Ok(())
}

/// Resolve a category slug or fail validation.
pub async fn resolve_category(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<categories::Model, ApiError> {
    categories::Entity::find()
        .filter(categories::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::Validation(format!("unknown category slug \"{}\"", slug)))
}

/// Resolve a list of genre slugs or fail validation on the first
/// unknown one.
pub async fn resolve_genres(
    db: &DatabaseConnection,
    slugs: &[String],
) -> Result<Vec<genres::Model>, ApiError> {
    let mut resolved = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let genre = genres::Entity::find()
            .filter(genres::Column::Slug.eq(slug.as_str()))
            .one(db)
            .await?
            .ok_or_else(|| ApiError::Validation(format!("unknown genre slug \"{}\"", slug)))?;
        resolved.push(genre);
    }
    Ok(resolved)
}

/// Look a title up by id or 404.
pub async fn find_title(db: &DatabaseConnection, title_id: i32) -> Result<titles::Model, ApiError> {
    titles::Entity::find_by_id(title_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("title {} not found", title_id)))
}

/// Assemble the full representation: nested category and genres plus
/// the freshly computed rating.
async fn title_response(
    db: &DatabaseConnection,
    title: titles::Model,
) -> Result<TitleResponse, ApiError> {
    let rating = title_rating(db, title.id).await?;

    let category = match title.category_id {
        Some(id) => categories::Entity::find_by_id(id).one(db).await?.map(|c| CategoryRepr {
            name: c.name,
            slug: c.slug,
        }),
        None => None,
    };

    let genre = title
        .find_related(genres::Entity)
        .order_by_asc(genres::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|g| GenreRepr {
            name: g.name,
            slug: g.slug,
        })
        .collect();

    Ok(TitleResponse {
        id: title.id,
        name: title.name,
        year: title.year,
        rating,
        description: title.description,
        genre,
        category,
    })
}

/// GET /api/v1/titles - list with genre/category/year/name filters
#[get("/api/v1/titles")]
async fn list_titles(
    client: ClientCtx,
    req: HttpRequest,
    filters: web::Query<TitleFilterQuery>,
    pq: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::List, Target::Catalog)?;

    let db = get_db_pool();

    let mut find = titles::Entity::find().order_by_desc(titles::Column::Id);

    if let Some(slug) = filters.genre.as_deref().filter(|s| !s.is_empty()) {
        // An unknown slug simply matches nothing.
        let title_ids: Vec<i32> = match genres::Entity::find()
            .filter(genres::Column::Slug.eq(slug))
            .one(db)
            .await?
        {
            Some(genre) => title_genres::Entity::find()
                .filter(title_genres::Column::GenreId.eq(genre.id))
                .all(db)
                .await?
                .into_iter()
                .map(|tg| tg.title_id)
                .collect(),
            None => Vec::new(),
        };
        find = find.filter(titles::Column::Id.is_in(title_ids));
    }

    if let Some(slug) = filters.category.as_deref().filter(|s| !s.is_empty()) {
        let category_ids: Vec<i32> = categories::Entity::find()
            .filter(categories::Column::Slug.eq(slug))
            .all(db)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        find = find.filter(titles::Column::CategoryId.is_in(category_ids));
    }

    if let Some(year) = filters.year {
        find = find.filter(titles::Column::Year.eq(year));
    }

    if let Some(name) = filters.name.as_deref().filter(|s| !s.is_empty()) {
        // Case-insensitive prefix match.
        find = find.filter(Expr::cust_with_values(
            "LOWER(name) LIKE ?",
            [format!("{}%", name.to_lowercase())],
        ));
    }

    let paginator = find.paginate(db, pq.size());
    let count = paginator.num_items().await?;
    let rows = paginator.fetch_page(pq.page() - 1).await?;

    let mut results = Vec::with_capacity(rows.len());
    for title in rows {
        results.push(title_response(db, title).await?);
    }

    Ok(HttpResponse::Ok().json(Page::new(req.path(), pq.page(), pq.size(), count, results)))
}

/// POST /api/v1/titles
#[post("/api/v1/titles")]
async fn create_title(
    client: ClientCtx,
    form: web::Json<TitleForm>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Create, Target::Catalog)?;
    form.validate()?;
    validate_year(form.year)?;

    let db = get_db_pool();

    let category = match form.category.as_deref() {
        Some(slug) => Some(resolve_category(db, slug).await?),
        None => None,
    };
    let genre_rows = resolve_genres(db, &form.genre).await?;

    // (name, category) is jointly unique.
    let duplicate = titles::Entity::find()
        .filter(titles::Column::Name.eq(form.name.as_str()))
        .filter(match &category {
            Some(c) => titles::Column::CategoryId.eq(c.id),
            None => titles::Column::CategoryId.is_null(),
        })
        .one(db)
        .await?
        .is_some();
    if duplicate {
        return Err(ApiError::Validation(format!(
            "title \"{}\" already exists in this category",
            form.name
        )));
    }

    let title = titles::ActiveModel {
        name: Set(form.name.clone()),
        year: Set(form.year),
        description: Set(form.description.clone()),
        category_id: Set(category.as_ref().map(|c| c.id)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for genre in &genre_rows {
        title_genres::ActiveModel {
            title_id: Set(title.id),
            genre_id: Set(genre.id),
        }
        .insert(db)
        .await?;
    }

    Ok(HttpResponse::Created().json(title_response(db, title).await?))
}

/// GET /api/v1/titles/{title_id}
#[get("/api/v1/titles/{title_id}")]
async fn retrieve_title(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Retrieve, Target::Catalog)?;

    let db = get_db_pool();
    let title = find_title(db, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(title_response(db, title).await?))
}

/// PATCH /api/v1/titles/{title_id}
#[patch("/api/v1/titles/{title_id}")]
async fn update_title(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<TitlePatchForm>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Update, Target::Catalog)?;
    form.validate()?;

    let db = get_db_pool();
    let title = find_title(db, path.into_inner()).await?;

    if let Some(year) = form.year {
        validate_year(year)?;
    }

    let category = match form.category.as_deref() {
        Some(slug) => Some(resolve_category(db, slug).await?),
        None => None,
    };
    let genre_rows = match &form.genre {
        Some(slugs) => Some(resolve_genres(db, slugs).await?),
        None => None,
    };

    let title_id = title.id;
    let mut active: titles::ActiveModel = title.into();

    if let Some(name) = &form.name {
        active.name = Set(name.clone());
    }
    if let Some(year) = form.year {
        active.year = Set(year);
    }
    if let Some(description) = &form.description {
        active.description = Set(Some(description.clone()));
    }
    if let Some(category) = &category {
        active.category_id = Set(Some(category.id));
    }

    let title = active.update(db).await?;

    // A supplied genre list replaces the existing set wholesale.
    if let Some(genre_rows) = genre_rows {
        title_genres::Entity::delete_many()
            .filter(title_genres::Column::TitleId.eq(title_id))
            .exec(db)
            .await?;
        for genre in &genre_rows {
            title_genres::ActiveModel {
                title_id: Set(title_id),
                genre_id: Set(genre.id),
            }
            .insert(db)
            .await?;
        }
    }

    Ok(HttpResponse::Ok().json(title_response(db, title).await?))
}

/// DELETE /api/v1/titles/{title_id} - the store cascades the delete to
/// reviews and their comments
#[delete("/api/v1/titles/{title_id}")]
async fn delete_title(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Delete, Target::Catalog)?;

    let db = get_db_pool();
    let title = find_title(db, path.into_inner()).await?;
    title.delete(db).await?;

    Ok(HttpResponse::NoContent().finish())
}
