//! Shared model builders for tests
#![allow(dead_code)]

use chrono::Utc;
use critique::orm::users::Role;
use critique::orm::{reviews, titles, users};

pub fn make_user(id: i32, username: &str, role: Role) -> users::Model {
    users::Model {
        id,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        first_name: None,
        last_name: None,
        role,
        bio: None,
        confirmation_code: None,
        created_at: Utc::now().naive_utc(),
    }
}

pub fn make_user_with_code(id: i32, username: &str, code: &str) -> users::Model {
    users::Model {
        confirmation_code: Some(code.to_string()),
        ..make_user(id, username, Role::User)
    }
}

pub fn make_title(id: i32, name: &str, year: i16) -> titles::Model {
    titles::Model {
        id,
        name: name.to_string(),
        year,
        description: None,
        category_id: None,
    }
}

pub fn make_review(id: i32, title_id: i32, user_id: i32, score: i16) -> reviews::Model {
    reviews::Model {
        id,
        title_id,
        user_id,
        text: "a review".to_string(),
        score,
        pub_date: Utc::now().naive_utc(),
    }
}
