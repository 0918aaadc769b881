mod handlers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

pub fn create_router(db: Database) -> Router {
    let api = Router::new()
        // Recipes
        .route("/recipes", get(handlers::list_recipes))
        .route("/recipes", post(handlers::create_recipe))
        .route("/recipes/search", get(handlers::search_recipes))
        .route("/recipes/{id}", get(handlers::get_recipe))
        .route("/recipes/{id}", put(handlers::update_recipe))
        .route("/recipes/{id}", delete(handlers::delete_recipe))
        .route("/recipes/{id}/draft", get(handlers::get_recipe_draft))
        .route("/recipes/{id}/instructions", get(handlers::list_recipe_instructions))
        .route("/recipes/{id}/ingredients", get(handlers::list_recipe_ingredients))
        // Categories
        .route("/categories", get(handlers::list_categories))
        .route("/categories/{id}", get(handlers::get_category))
        .route("/categories/{id}", delete(handlers::delete_category))
        .route("/categories/{id}/recipes", get(handlers::list_category_recipes))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
