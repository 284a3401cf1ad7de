use axum::{
    extract::Extension,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use mongodb::{bson::doc, options::ClientOptions, Client};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod controllers;
mod error;
pub mod models;
mod pagination;
mod utils;

use auth::middleware::{require_admin, require_staff, verify_token};
use config::AppConfig;
use controllers::{
    auth_controller, booking_controller::*, combo_controller::*, movie_controller::*,
    payment_controller, review_controller::*, room_controller::*, seat_controller::*,
    showtime_controller::*, theater_controller::*, user_controller::*,
};
use utils::db;

fn auth_routes() -> Router {
    Router::new()
        .route("/auth/register", post(auth_controller::register))
        .route("/auth/login/:portal", post(auth_controller::login))
        .route(
            "/auth/password/forgot",
            post(auth_controller::forgot_password),
        )
        .route(
            "/auth/password/reset",
            post(auth_controller::reset_password),
        )
        .route(
            "/auth/me",
            get(auth_controller::me).route_layer(middleware::from_fn(verify_token)),
        )
}

/// Unauthenticated browsing: the movie catalog, schedule and snack menu.
fn public_routes() -> Router {
    Router::new()
        .route("/movies", get(load_movies))
        .route("/movies/:id", get(load_movie_with_showtimes))
        .route("/movies/:id/reviews", get(load_movie_reviews))
        .route("/showtimes", get(load_showtimes_with_details))
        .route("/showtimes/:id", get(fetch_showtime_by_id))
        .route("/showtimes/:id/seats", get(load_showtime_seats))
        .route("/combos", get(load_combos))
}

/// Any authenticated account: bookings and reviews.
fn customer_routes() -> Router {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/my", get(load_my_bookings))
        .route("/bookings/:id", get(fetch_booking_by_id))
        .route("/bookings/:id/cancel", post(cancel_booking))
        .route("/reviews", post(add_review))
        .route("/reviews/:id", delete(delete_review))
        .route_layer(middleware::from_fn(verify_token))
}

/// Staff point-of-sale and back-office reads.
fn staff_routes() -> Router {
    Router::new()
        .route("/bookings/list", post(list_bookings))
        .route("/payments", post(payment_controller::take_payment))
        .route("/theaters", get(load_theaters))
        .route("/theaters/list", post(list_theaters))
        .route("/theaters/:id", get(load_theater_with_rooms))
        .route("/rooms/list", post(list_rooms))
        .route("/rooms/:id", get(load_room_with_seats))
        .route("/rooms/:id/seats", get(load_room_seats))
        .route("/seats/list", post(list_seats))
        .route("/movies/list", post(list_movies))
        .route("/showtimes/list", post(list_showtimes))
        .route("/combos/list", post(list_combos))
        .route_layer(middleware::from_fn(require_staff))
        .route_layer(middleware::from_fn(verify_token))
}

/// Admin back-office writes.
fn admin_routes() -> Router {
    Router::new()
        .route("/users/list", post(list_users))
        .route("/users", post(add_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id", patch(update_user))
        .route("/users/:id/status", patch(patch_user_status))
        .route("/users/:id", delete(delete_user))
        .route("/theaters", post(add_theater))
        .route("/theaters/:id", patch(update_theater))
        .route("/theaters/:id", delete(delete_theater))
        .route("/rooms", post(add_room))
        .route("/rooms/:id", patch(update_room))
        .route("/rooms/:id", delete(delete_room))
        .route("/seats", post(add_seat))
        .route("/seats/:id", patch(update_seat))
        .route("/seats/:id", delete(delete_seat))
        .route("/movies", post(add_movie))
        .route("/movies/:id", patch(update_movie))
        .route("/movies/:id", delete(delete_movie))
        .route("/showtimes", post(add_showtime))
        .route("/showtimes/:id", patch(update_showtime))
        .route("/showtimes/:id/status", patch(patch_showtime_status))
        .route("/showtimes/:id", delete(delete_showtime))
        .route("/combos", post(add_combo))
        .route("/combos/:id", patch(update_combo))
        .route("/combos/:id", delete(delete_combo))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn(verify_token))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;

    let client_options = ClientOptions::parse(&config.mongodb_uri).await?;
    let client = Client::with_options(client_options)?;

    // Fail fast if the cluster is unreachable.
    db(&client).run_command(doc! { "ping": 1 }, None).await?;
    tracing::info!("connected to MongoDB");

    let shared_client = Arc::new(client);
    let shared_config = Arc::new(config.clone());

    let app = Router::new()
        .merge(auth_routes())
        .merge(public_routes())
        .merge(customer_routes())
        .merge(staff_routes())
        .merge(admin_routes())
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_origin(config.app_url.parse::<HeaderValue>()?)
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(shared_client))
        .layer(Extension(shared_config));

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
