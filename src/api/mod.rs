mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::store::Store;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub store: Store,
}

pub fn create_router(db: Database) -> Router {
    create_router_with_store(db, Store::new())
}

pub fn create_router_with_store(db: Database, store: Store) -> Router {
    let api = Router::new()
        // Search
        .route("/search", get(handlers::search))
        // Modules
        .route("/modules", get(handlers::list_modules))
        .route("/modules/tree", get(handlers::render_module_tree))
        .route("/modules/{id}", get(handlers::get_module))
        // Timeline
        .route("/timeline", get(handlers::list_timeline))
        .route("/timeline/{id}", get(handlers::get_timeline_event))
        // Dataset import/export
        .route(
            "/dataset",
            get(handlers::export_dataset).put(handlers::import_dataset),
        )
        // Agent store
        .route("/store", get(handlers::get_store_state))
        .route("/store/actions", post(handlers::dispatch_action))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(AppState { db, store })
}
