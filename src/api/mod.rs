//! HTTP API over [`HabitService`].
//!
//! Routes live under `/api` and answer with or without a trailing slash,
//! since the web client always sends one.

mod error;
mod handlers;

use axum::routing::{get, post, MethodRouter};
use axum::Router;
use habit_core::{Database, HabitService};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use handlers::{Health, ToggleResponse};

pub fn create_router(db: Database) -> Router {
    let service = HabitService::new(db);

    let api = Router::new();
    let api = route(api, "/habits", get(handlers::list_habits).post(handlers::create_habit));
    let api = route(
        api,
        "/habits/{id}",
        get(handlers::get_habit)
            .put(handlers::replace_habit)
            .patch(handlers::patch_habit)
            .delete(handlers::delete_habit),
    );
    let api = route(api, "/habits/{id}/checkin", post(handlers::checkin));
    let api = route(api, "/habits/{id}/add_note", post(handlers::add_note));
    let api = route(api, "/habits/{id}/stats", get(handlers::habit_stats));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .with_state(service)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

fn route(
    router: Router<HabitService>,
    path: &str,
    methods: MethodRouter<HabitService>,
) -> Router<HabitService> {
    router
        .route(path, methods.clone())
        .route(&format!("{path}/"), methods)
}
