//! Recipe operations: popularity listing, detail fetch with view counting, and
//! creation with input validation.

use crate::models::NewRecipe;
use crate::store::{RecipeStore, StoreError};
use crate::types::{CreateRecipeRequest, RecipeDetail, RecipeListItem};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub const MAX_NAME_LENGTH: usize = 255;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("recipe {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Checks a create request, collecting every failing field.
pub fn validate(request: &CreateRecipeRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    let name_length = request.name.chars().count();
    if name_length == 0 {
        errors.push(FieldError::new("name", "must not be empty"));
    } else if name_length > MAX_NAME_LENGTH {
        errors.push(FieldError::new(
            "name",
            format!("must be at most {MAX_NAME_LENGTH} characters"),
        ));
    }

    if request.cooking_time <= 0 {
        errors.push(FieldError::new("cooking_time", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub struct RecipeService {
    store: RecipeStore,
}

impl RecipeService {
    pub fn new(store: RecipeStore) -> Self {
        Self { store }
    }

    /// Every recipe, sorted by views descending, then cooking time ascending.
    pub async fn list_recipes(&self) -> Result<Vec<RecipeListItem>, ServiceError> {
        let recipes = self.store.find_all_by_popularity().await?;
        Ok(recipes.into_iter().map(RecipeListItem::from).collect())
    }

    /// Returns the recipe and records one more view of it.
    pub async fn get_recipe_detail(&self, id: i64) -> Result<RecipeDetail, ServiceError> {
        let recipe = self
            .store
            .increment_views(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;

        tracing::debug!(recipe_id = recipe.id, views = recipe.views, "recipe viewed");
        Ok(recipe.into())
    }

    pub async fn create_recipe(
        &self,
        request: CreateRecipeRequest,
    ) -> Result<RecipeDetail, ServiceError> {
        validate(&request).map_err(ServiceError::Validation)?;

        let recipe = self
            .store
            .insert(NewRecipe {
                name: request.name,
                views: 0,
                cooking_time: request.cooking_time,
                ingredients: request.ingredients,
                description: request.description,
            })
            .await?;

        tracing::info!(recipe_id = recipe.id, "recipe created");
        Ok(recipe.into())
    }
}
