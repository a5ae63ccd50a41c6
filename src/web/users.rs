//! User management endpoints and the self-service profile.

use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::users::{self, Role};
use crate::pagination::{Page, PageQuery};
use crate::permission::{Action, Target};
use crate::web::error::ApiError;
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // The /users/me pair must resolve before /users/{username}.
    conf.service(retrieve_me)
        .service(update_me)
        .service(list_users)
        .service(create_user)
        .service(retrieve_user)
        .service(update_user)
        .service(delete_user);
}

#[derive(Serialize)]
struct UserResponse {
    username: String,
    first_name: Option<String>,
    last_name: Option<String>,
    email: String,
    role: Role,
    bio: Option<String>,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        UserResponse {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            bio: user.bio,
        }
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Option<String>,
}

#[derive(Deserialize, Validate)]
struct CreateUserForm {
    #[validate(length(min = 1, max = 120))]
    username: String,
    #[validate(email, length(max = 200))]
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    role: Option<Role>,
    bio: Option<String>,
}

#[derive(Deserialize, Validate)]
struct UserPatchForm {
    #[validate(length(min = 1, max = 120))]
    username: Option<String>,
    #[validate(email, length(max = 200))]
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    role: Option<Role>,
    bio: Option<String>,
}

/// GET /api/v1/users - list users, optional username search
#[get("/api/v1/users")]
async fn list_users(
    client: ClientCtx,
    req: HttpRequest,
    search: web::Query<SearchQuery>,
    pq: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::List, Target::UserDirectory)?;

    let db = get_db_pool();

    let mut find = users::Entity::find().order_by_asc(users::Column::Id);
    if let Some(term) = search.search.as_deref().filter(|s| !s.is_empty()) {
        find = find.filter(Expr::cust_with_values(
            "LOWER(username) LIKE ?",
            [format!("%{}%", term.to_lowercase())],
        ));
    }

    let paginator = find.paginate(db, pq.size());
    let count = paginator.num_items().await?;
    let rows = paginator.fetch_page(pq.page() - 1).await?;

    let results: Vec<UserResponse> = rows.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(Page::new(req.path(), pq.page(), pq.size(), count, results)))
}

/// POST /api/v1/users - create a user, role assignable
#[post("/api/v1/users")]
async fn create_user(
    client: ClientCtx,
    form: web::Json<CreateUserForm>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Create, Target::UserDirectory)?;
    form.validate()?;

    if form.username == "me" {
        return Err(ApiError::Validation(
            "username \"me\" is reserved".to_string(),
        ));
    }

    let db = get_db_pool();

    let username_taken = users::Entity::find()
        .filter(users::Column::Username.eq(form.username.as_str()))
        .one(db)
        .await?
        .is_some();
    if username_taken {
        return Err(ApiError::Validation(format!(
            "username \"{}\" is already taken",
            form.username
        )));
    }

    let email_taken = users::Entity::find()
        .filter(users::Column::Email.eq(form.email.as_str()))
        .one(db)
        .await?
        .is_some();
    if email_taken {
        return Err(ApiError::Validation(format!(
            "email \"{}\" is already registered",
            form.email
        )));
    }

    let user = users::ActiveModel {
        username: Set(form.username.clone()),
        email: Set(form.email.clone()),
        first_name: Set(form.first_name.clone()),
        last_name: Set(form.last_name.clone()),
        role: Set(form.role.unwrap_or(Role::User)),
        bio: Set(form.bio.clone()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("User created by admin: {}", user.username);

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// GET /api/v1/users/me - the requester's own profile
#[get("/api/v1/users/me")]
async fn retrieve_me(client: ClientCtx) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Retrieve, Target::OwnProfile)?;

    let user = client.require_user()?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user.clone())))
}

/// PATCH /api/v1/users/me - update own profile; role is read-only
/// unless the requester is an admin
#[patch("/api/v1/users/me")]
async fn update_me(
    client: ClientCtx,
    form: web::Json<UserPatchForm>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Update, Target::OwnProfile)?;
    form.validate()?;

    let user = client.require_user()?.clone();
    let allow_role = user.role == Role::Admin;

    let db = get_db_pool();
    let updated = apply_patch(db, user, &form, allow_role).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

/// GET /api/v1/users/{username}
#[get("/api/v1/users/{username}")]
async fn retrieve_user(
    client: ClientCtx,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Retrieve, Target::UserDirectory)?;

    let user = find_user(get_db_pool(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// PATCH /api/v1/users/{username}
#[patch("/api/v1/users/{username}")]
async fn update_user(
    client: ClientCtx,
    path: web::Path<String>,
    form: web::Json<UserPatchForm>,
) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Update, Target::UserDirectory)?;
    form.validate()?;

    let db = get_db_pool();
    let user = find_user(db, &path.into_inner()).await?;
    let updated = apply_patch(db, user, &form, true).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

/// DELETE /api/v1/users/{username}
#[delete("/api/v1/users/{username}")]
async fn delete_user(client: ClientCtx, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    client.enforce(Action::Delete, Target::UserDirectory)?;

    let db = get_db_pool();
    let user = find_user(db, &path.into_inner()).await?;
    user.delete(db).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Helper: look a user up by username or 404.
async fn find_user(db: &DatabaseConnection, username: &str) -> Result<users::Model, ApiError> {
    users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user \"{}\" not found", username)))
}

/// Helper: apply a partial update to a user row.
async fn apply_patch(
    db: &DatabaseConnection,
    user: users::Model,
    form: &UserPatchForm,
    allow_role: bool,
) -> Result<users::Model, ApiError> {
    if form.username.as_deref() == Some("me") {
        return Err(ApiError::Validation(
            "username \"me\" is reserved".to_string(),
        ));
    }

    let mut active: users::ActiveModel = user.into();

    if let Some(username) = &form.username {
        active.username = Set(username.clone());
    }
    if let Some(email) = &form.email {
        active.email = Set(email.clone());
    }
    if let Some(first_name) = &form.first_name {
        active.first_name = Set(Some(first_name.clone()));
    }
    if let Some(last_name) = &form.last_name {
        active.last_name = Set(Some(last_name.clone()));
    }
    if let Some(bio) = &form.bio {
        active.bio = Set(Some(bio.clone()));
    }
    if allow_role {
        if let Some(role) = form.role {
            active.role = Set(role);
        }
    }

    Ok(active.update(db).await?)
}
