//! Nestboard web crate
//!
//! The HTTP surface of the listing site: routing, session extraction,
//! form validation, and the server-rendered views.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod flash;
pub mod routes;
pub mod schema;
pub mod session;
pub mod state;
pub mod util;
pub mod views;

pub use error::PageError;
pub use session::{CurrentUser, MaybeUser};
pub use state::AppState;

/// Builds the full route table. `/` and `/listing` serve the same index;
/// unknown paths fall through to a rendered 404 page.
///
/// The method override has to rewrite the verb before routing happens, so
/// the routed table hangs off an outer router as its fallback service and
/// the middleware wraps that.
pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(routes::listings::index))
        .route(
            "/listing",
            get(routes::listings::index).post(routes::listings::create),
        )
        .route("/listing/new", get(routes::listings::new_form))
        .route("/listing/filter", post(routes::listings::filter))
        .route(
            "/listing/:id",
            get(routes::listings::show)
                .put(routes::listings::update)
                .delete(routes::listings::destroy),
        )
        .route("/listing/:id/edit", get(routes::listings::edit_form))
        .route(
            "/signup",
            get(routes::users::signup_form).post(routes::users::signup),
        )
        .route(
            "/login",
            get(routes::users::login_form).post(routes::users::login),
        )
        .route("/logout", post(routes::users::logout))
        .route("/profile", get(routes::users::profile))
        .fallback(routes::not_found)
        .with_state(state);

    Router::new()
        .fallback_service(routes)
        .layer(middleware::from_fn(util::method_override))
        .layer(TraceLayer::new_for_http())
}
