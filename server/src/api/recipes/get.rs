use crate::api::{ApiError, ErrorResponse};
use crate::types::RecipeDetail;
use crate::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};

#[utoipa::path(
    get,
    path = "/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details; the recipe's view count is incremented", body = RecipeDetail),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 422, description = "Recipe ID is not an integer", body = ErrorResponse),
        (status = 500, description = "Database failure", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(service): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<RecipeDetail>, ApiError> {
    let Path(id) = id?;
    let recipe = service.get_recipe_detail(id).await?;
    Ok(Json(recipe))
}
