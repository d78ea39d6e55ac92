use crate::api::{ApiError, ErrorResponse};
use crate::types::RecipeListItem;
use crate::AppState;
use axum::{extract::State, Json};

#[utoipa::path(
    get,
    path = "/recipes",
    tag = "recipes",
    responses(
        (status = 200, description = "All recipes, most viewed first; ties go to the shorter cooking time", body = Vec<RecipeListItem>),
        (status = 500, description = "Database failure", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    State(service): State<AppState>,
) -> Result<Json<Vec<RecipeListItem>>, ApiError> {
    let recipes = service.list_recipes().await?;
    Ok(Json(recipes))
}
