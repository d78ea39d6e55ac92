use diesel::prelude::*;

/// A stored recipe row.
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    /// Number of times the detail view was opened
    pub views: i64,
    /// Cooking time in minutes
    pub cooking_time: i64,
    /// Comma-separated by convention, stored as free text
    pub ingredients: String,
    pub description: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe {
    pub name: String,
    pub views: i64,
    pub cooking_time: i64,
    pub ingredients: String,
    pub description: String,
}
