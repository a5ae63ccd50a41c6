pub mod auth;
pub mod categories;
pub mod comments;
pub mod error;
pub mod genres;
pub mod reviews;
pub mod titles;
pub mod users;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    auth::configure(conf);
    users::configure(conf);
    categories::configure(conf);
    genres::configure(conf);
    titles::configure(conf);
    reviews::configure(conf);
    comments::configure(conf);
}
