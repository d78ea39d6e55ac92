//! Record store for recipe rows.
//!
//! Diesel's SQLite connection is synchronous, so every operation checks a
//! connection out of the pool on the blocking thread pool and returns it when
//! the closure finishes, whichever way it exits.

use crate::db::DbPool;
use crate::models::{NewRecipe, Recipe};
use crate::schema::recipes;
use crate::telemetry::DB_QUERY_SPAN;
use diesel::prelude::*;
use diesel::r2d2::PoolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection unavailable: {0}")]
    Pool(#[from] PoolError),

    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("database task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Clone)]
pub struct RecipeStore {
    pool: DbPool,
}

impl RecipeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Runs `query` with a pooled connection inside a [`DB_QUERY_SPAN`].
    ///
    /// The span is created on the calling task so per-request query counting
    /// sees it.
    async fn run<T, F>(&self, operation: &'static str, query: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut SqliteConnection) -> QueryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let span = tracing::info_span!(DB_QUERY_SPAN, db.operation = operation);

        tokio::task::spawn_blocking(move || -> Result<T, StoreError> {
            let _entered = span.enter();
            let mut conn = pool.get()?;
            Ok(query(&mut *conn)?)
        })
        .await?
    }

    /// Inserts a row and returns it with its assigned id.
    pub async fn insert(&self, new_recipe: NewRecipe) -> Result<Recipe, StoreError> {
        self.run("insert_recipe", move |conn| {
            diesel::insert_into(recipes::table)
                .values(&new_recipe)
                .returning(Recipe::as_returning())
                .get_result(conn)
        })
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Recipe>, StoreError> {
        self.run("find_recipe", move |conn| {
            recipes::table
                .find(id)
                .select(Recipe::as_select())
                .first(conn)
                .optional()
        })
        .await
    }

    /// All rows, most viewed first, then quickest to cook, then oldest.
    pub async fn find_all_by_popularity(&self) -> Result<Vec<Recipe>, StoreError> {
        self.run("list_recipes", |conn| {
            recipes::table
                .order((
                    recipes::views.desc(),
                    recipes::cooking_time.asc(),
                    recipes::id.asc(),
                ))
                .select(Recipe::as_select())
                .load(conn)
        })
        .await
    }

    /// Adds one view to the row and returns its updated state.
    ///
    /// A single `UPDATE ... RETURNING` statement, so concurrent increments on the
    /// same id never overwrite each other. `None` means no row matched and
    /// nothing was written.
    pub async fn increment_views(&self, id: i64) -> Result<Option<Recipe>, StoreError> {
        self.run("increment_recipe_views", move |conn| {
            diesel::update(recipes::table.find(id))
                .set(recipes::views.eq(recipes::views + 1_i64))
                .returning(Recipe::as_returning())
                .get_result(conn)
                .optional()
        })
        .await
    }
}
