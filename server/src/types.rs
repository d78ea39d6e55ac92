use crate::models::Recipe;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /recipes`. There is no `views` field: new recipes always start
/// at zero views, and unknown fields are ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    /// Recipe name, 1 to 255 characters
    #[schema(min_length = 1, max_length = 255, example = "Борщ")]
    pub name: String,
    /// Cooking time in minutes
    #[schema(minimum = 1, example = 90)]
    pub cooking_time: i64,
    /// Ingredients separated by commas
    #[schema(example = "свекла, капуста, мясо, картофель")]
    pub ingredients: String,
    /// Free-form description of the recipe
    pub description: String,
}

/// One row of the recipe table on the main screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeListItem {
    pub id: i64,
    pub name: String,
    /// How many times the detail view was opened
    pub views: i64,
    /// Cooking time in minutes
    pub cooking_time: i64,
}

/// Full recipe as shown on the detail screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeDetail {
    pub id: i64,
    pub name: String,
    /// Cooking time in minutes
    pub cooking_time: i64,
    /// Ingredients separated by commas
    pub ingredients: String,
    pub description: String,
}

impl From<Recipe> for RecipeListItem {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            views: recipe.views,
            cooking_time: recipe.cooking_time,
        }
    }
}

impl From<Recipe> for RecipeDetail {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            cooking_time: recipe.cooking_time,
            ingredients: recipe.ingredients,
            description: recipe.description,
        }
    }
}
