//! Category endpoints.

use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::categories;
use crate::pagination::{Page, PageQuery};
use crate::permission::{Action, Target};
use crate::web::error::ApiError;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_categories)
        .service(create_category)
        .service(delete_category);
}

/// Slugs are restricted to URL-safe characters.
pub(crate) fn validate_slug(value: &str) -> Result<(), ValidationError> {
    if value.is_empty()
        || !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::new("slug"));
    }
    Ok(())
}

#[derive(Serialize)]
struct CategoryResponse {
    name: String,
    slug: String,
}

impl From<categories::Model> for CategoryResponse {
    fn from(category: categories::Model) -> Self {
        CategoryResponse {
            name: category.name,
            slug: category.slug,
        }
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Option<String>,
}

#[derive(Deserialize, Validate)]
struct CategoryForm {
    #[validate(length(min = 1, max = 256))]
    name: String,
    #[validate(length(min = 1, max = 50), custom = "validate_slug")]
    slug: String,
}

/// GET /api/v1/categories - list categories, optional name search
#[get("/api/v1/categories")]
async fn list_categories(
    client: ClientCtx,
    req: HttpRequest,
    search: web::Query<SearchQuery>,
    pq: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::List, Target::Catalog)?;

    let db = get_db_pool();

    let mut find = categories::Entity::find().order_by_asc(categories::Column::Name);
    if let Some(term) = search.search.as_deref().filter(|s| !s.is_empty()) {
        find = find.filter(Expr::cust_with_values(
            "LOWER(name) LIKE ?",
            [format!("%{}%", term.to_lowercase())],
        ));
    }

    let paginator = find.paginate(db, pq.size());
    let count = paginator.num_items().await?;
    let rows = paginator.fetch_page(pq.page() - 1).await?;

    let results: Vec<CategoryResponse> = rows.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(Page::new(req.path(), pq.page(), pq.size(), count, results)))
}

/// POST /api/v1/categories
#[post("/api/v1/categories")]
async fn create_category(
    client: ClientCtx,
    form: web::Json<CategoryForm>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Create, Target::Catalog)?;
    form.validate()?;

    let db = get_db_pool();

    let slug_taken = categories::Entity::find()
        .filter(categories::Column::Slug.eq(form.slug.as_str()))
        .one(db)
        .await?
        .is_some();
    if slug_taken {
        return Err(ApiError::Validation(format!(
            "category slug \"{}\" already exists",
            form.slug
        )));
    }

    let category = categories::ActiveModel {
        name: Set(form.name.clone()),
        slug: Set(form.slug.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

/// DELETE /api/v1/categories/{slug} - titles referencing the category
/// keep existing, with their category nulled by the store
#[delete("/api/v1/categories/{slug}")]
async fn delete_category(
    client: ClientCtx,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Delete, Target::Catalog)?;

    let slug = path.into_inner();
    let db = get_db_pool();

    let category = categories::Entity::find()
        .filter(categories::Column::Slug.eq(slug.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("category \"{}\" not found", slug)))?;

    category.delete(db).await?;

    Ok(HttpResponse::NoContent().finish())
}
