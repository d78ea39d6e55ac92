use crate::api::recipes::PATH;
use crate::api::{ApiError, ErrorResponse};
use crate::types::{CreateRecipeRequest, RecipeDetail};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

#[utoipa::path(
    post,
    path = "/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created with zero views", body = RecipeDetail,
            headers(("Location" = String, description = "URL of the new recipe"))),
        (status = 422, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Database failure", body = ErrorResponse)
    )
)]
pub async fn create_recipe(
    State(service): State<AppState>,
    request: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = request?;
    let recipe = service.create_recipe(request).await?;

    let location = format!("{}/{}", PATH, recipe.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(recipe),
    ))
}
