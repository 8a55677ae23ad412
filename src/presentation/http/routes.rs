//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use super::handlers;
use crate::presentation::middleware::{auth_middleware, rate_limit_login};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        .merge(public_api_routes(state.clone()))
        // Probes and metrics
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .route("/metrics", get(handlers::health::metrics_handler))
        .with_state(state)
}

/// Routes reachable without a session
fn public_api_routes(state: AppState) -> Router<AppState> {
    let login = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route_layer(middleware::from_fn_with_state(state, rate_limit_login));

    Router::new()
        .merge(login)
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/banners/active", get(handlers::banners::active_banners))
}

/// Protected API routes (require a session)
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/session", get(handlers::auth::session))
        .nest("/profile", profile_routes())
        .nest("/users", user_routes())
        .nest("/artists", artist_routes())
        .nest("/groups", group_routes())
        .nest("/tracks", track_routes())
        .nest("/releases", release_routes())
        .nest("/banners", banner_routes())
        .nest("/images", image_routes())
        .nest("/uploads", upload_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::profile::get_profile).patch(handlers::profile::update_profile),
        )
        .route("/password", post(handlers::profile::change_password))
}

/// User administration (admin)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/{id}", delete(handlers::users::delete_user))
        .route("/{id}/role", patch(handlers::users::update_role))
}

fn artist_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::artists::list_artists).post(handlers::artists::create_artist),
        )
        .route("/slug/{slug}", get(handlers::artists::get_artist_by_slug))
        .route(
            "/{id}",
            get(handlers::artists::get_artist)
                .patch(handlers::artists::update_artist)
                .delete(handlers::artists::delete_artist),
        )
}

fn group_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::groups::list_groups).post(handlers::groups::create_group),
        )
        .route("/slug/{slug}", get(handlers::groups::get_group_by_slug))
        .route(
            "/{id}",
            get(handlers::groups::get_group)
                .patch(handlers::groups::update_group)
                .delete(handlers::groups::delete_group),
        )
        .route("/{id}/members", put(handlers::groups::set_members))
}

fn track_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::tracks::list_tracks).post(handlers::tracks::create_track),
        )
        .route("/slug/{slug}", get(handlers::tracks::get_track_by_slug))
        .route(
            "/{id}",
            get(handlers::tracks::get_track)
                .patch(handlers::tracks::update_track)
                .delete(handlers::tracks::delete_track),
        )
        .route("/{id}/artists", put(handlers::tracks::set_artists))
        .route("/{id}/audio", post(handlers::tracks::register_audio))
}

fn release_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::releases::list_releases).post(handlers::releases::create_release),
        )
        .route("/slug/{slug}", get(handlers::releases::get_release_by_slug))
        .route(
            "/{id}",
            get(handlers::releases::get_release)
                .patch(handlers::releases::update_release)
                .delete(handlers::releases::delete_release),
        )
        .route("/{id}/tracks", put(handlers::releases::set_tracks))
        .route("/{id}/artists", put(handlers::releases::set_artists))
}

/// Banner management; `/api/banners/active` is public and lives elsewhere
fn banner_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::banners::list_banners).post(handlers::banners::create_banner),
        )
        .route(
            "/{id}",
            patch(handlers::banners::update_banner).delete(handlers::banners::delete_banner),
        )
}

fn image_routes() -> Router<AppState> {
    Router::new()
        // One parameter name per segment: here `{owner}` is the image ID
        .route("/{owner}", delete(handlers::images::delete_image))
        .route(
            "/{owner}/{owner_id}",
            get(handlers::images::list_images).post(handlers::images::register_image),
        )
        .route("/{owner}/{owner_id}/order", put(handlers::images::reorder_images))
}

fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/presign", post(handlers::uploads::presign_upload))
        .route("/tracks/analyze", post(handlers::uploads::analyze_bulk))
        .route("/tracks/commit", post(handlers::uploads::commit_bulk))
}
