use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::{Database, StoreError};
use crate::models::*;

// ============================================================
// Error Handling
// ============================================================

/// Map a store error onto an HTTP response.
///
/// Validation failures are the caller's to fix and go back verbatim with a
/// BAD_REQUEST status. Everything else is logged server-side and collapsed
/// to a generic message so clients never see internal details.
fn store_error(e: StoreError) -> (StatusCode, String) {
    match e {
        StoreError::Validation { .. } => {
            tracing::warn!("Validation error: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        StoreError::Persistence(_) => {
            tracing::error!("Internal error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Recipes
// ============================================================

/// Query parameters for listing recipes.
#[derive(Debug, Deserialize)]
pub struct ListRecipesQuery {
    /// Maximum number of recipes to return.
    pub limit: Option<u32>,
    /// Number of recipes to skip from the start of the name-ordered list.
    pub offset: Option<u32>,
}

pub async fn list_recipes(
    State(db): State<Database>,
    Query(query): Query<ListRecipesQuery>,
) -> Result<Json<Vec<RecipeSummary>>, (StatusCode, String)> {
    let recipes = db.get_all_recipes().map_err(store_error)?;

    // Apply pagination
    let offset = query.offset.unwrap_or(0) as usize;
    let recipes: Vec<_> = recipes.into_iter().skip(offset).collect();
    let recipes: Vec<_> = match query.limit {
        Some(limit) => recipes.into_iter().take(limit as usize).collect(),
        None => recipes,
    };

    // Always return summaries only - use get_recipe for full details
    let summaries: Vec<RecipeSummary> = recipes.into_iter().map(Into::into).collect();
    Ok(Json(summaries))
}

/// Query parameters for searching recipes.
#[derive(Debug, Deserialize)]
pub struct SearchRecipesQuery {
    /// Search term to match against name, comments and source.
    pub q: String,
    /// Maximum number of results to return. Defaults to 10.
    pub limit: Option<u32>,
}

/// Search recipes by name, comments and source.
/// Returns summaries in name order.
pub async fn search_recipes(
    State(db): State<Database>,
    Query(query): Query<SearchRecipesQuery>,
) -> Result<Json<Vec<RecipeSummary>>, (StatusCode, String)> {
    let recipes = db
        .search_recipes(&query.q, query.limit)
        .map_err(store_error)?;

    let summaries: Vec<RecipeSummary> = recipes.into_iter().map(Into::into).collect();
    Ok(Json(summaries))
}

pub async fn get_recipe(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeDetail>, (StatusCode, String)> {
    db.get_recipe_detail(id)
        .map_err(store_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".to_string()))
}

/// The stored recipe in editable form, instruction and ingredient blocks
/// rendered back to text. What an editor loads before a save.
pub async fn get_recipe_draft(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeDraft>, (StatusCode, String)> {
    db.get_recipe_draft(id)
        .map_err(store_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".to_string()))
}

pub async fn create_recipe(
    State(db): State<Database>,
    Json(draft): Json<RecipeDraft>,
) -> Result<(StatusCode, Json<RecipeDetail>), (StatusCode, String)> {
    db.create_recipe(draft)
        .map(|r| (StatusCode::CREATED, Json(r)))
        .map_err(store_error)
}

pub async fn update_recipe(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(draft): Json<RecipeDraft>,
) -> Result<Json<RecipeDetail>, (StatusCode, String)> {
    db.update_recipe(id, draft)
        .map_err(store_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".to_string()))
}

pub async fn delete_recipe(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_recipe(id).map_err(store_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Recipe not found".to_string()))
    }
}

// ============================================================
// Instructions and Ingredients
// ============================================================

pub async fn list_recipe_instructions(
    State(db): State<Database>,
    Path(recipe_id): Path<Uuid>,
) -> Result<Json<Vec<Instruction>>, (StatusCode, String)> {
    // First verify recipe exists
    db.get_recipe(recipe_id)
        .map_err(store_error)?
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".to_string()))?;

    db.get_instructions(recipe_id)
        .map(Json)
        .map_err(store_error)
}

pub async fn list_recipe_ingredients(
    State(db): State<Database>,
    Path(recipe_id): Path<Uuid>,
) -> Result<Json<Vec<Ingredient>>, (StatusCode, String)> {
    // First verify recipe exists
    db.get_recipe(recipe_id)
        .map_err(store_error)?
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".to_string()))?;

    db.get_ingredients(recipe_id)
        .map(Json)
        .map_err(store_error)
}

// ============================================================
// Categories
// ============================================================

pub async fn list_categories(
    State(db): State<Database>,
) -> Result<Json<Vec<Category>>, (StatusCode, String)> {
    db.get_all_categories().map(Json).map_err(store_error)
}

pub async fn get_category(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, (StatusCode, String)> {
    db.get_category(id)
        .map_err(store_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Category not found".to_string()))
}

pub async fn delete_category(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_category(id).map_err(store_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Category not found".to_string()))
    }
}

pub async fn list_category_recipes(
    State(db): State<Database>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<Vec<RecipeSummary>>, (StatusCode, String)> {
    // First verify category exists
    db.get_category(category_id)
        .map_err(store_error)?
        .ok_or((StatusCode::NOT_FOUND, "Category not found".to_string()))?;

    let recipes = db
        .get_recipes_by_category(category_id)
        .map_err(store_error)?;

    let summaries: Vec<RecipeSummary> = recipes.into_iter().map(Into::into).collect();
    Ok(Json(summaries))
}
