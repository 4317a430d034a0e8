use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use super::{
    actions::{ingredients, recipes, relations, tags, users},
    error::ServiceError,
    filters::RecipeFilter,
    store::{CatalogStore, RecipeStore, RelationStore, UserStore},
};
use crate::{
    schema::{Id, Ingredient, IngredientLine, NewUser, Recipe, RecipeDraft, Relation, Tag, User},
    DatabaseSettings,
};

/// Store backed by the tables described in `sql/schema.sql`.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, ServiceError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.url)
            .await?;

        log::info!("Connected to database ({} connections)", settings.max_connections);

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn get_tag(&self, id: Id) -> Result<Option<Tag>, ServiceError> {
        tags::get_tag(id, &self.pool).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, ServiceError> {
        tags::list_tags(&self.pool).await
    }

    async fn create_tag(&self, name: &str, color: &str, slug: &str) -> Result<Tag, ServiceError> {
        tags::create_tag(name, color, slug, &self.pool).await
    }

    async fn get_ingredient(&self, id: Id) -> Result<Option<Ingredient>, ServiceError> {
        ingredients::get_ingredient(id, &self.pool).await
    }

    async fn search_ingredients(
        &self,
        prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, ServiceError> {
        ingredients::search_ingredients(prefix, &self.pool).await
    }

    async fn upsert_ingredient(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> Result<Ingredient, ServiceError> {
        ingredients::upsert_ingredient(name, measurement_unit, &self.pool).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn get_user(&self, id: Id) -> Result<Option<User>, ServiceError> {
        users::get_user_by_id(id, &self.pool).await
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, ServiceError> {
        users::get_user(username, &self.pool).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, ServiceError> {
        users::register_user(user, &self.pool).await
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn get_recipe(&self, id: Id) -> Result<Option<Recipe>, ServiceError> {
        recipes::get_recipe(id, &self.pool).await
    }

    async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Id>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Recipe>, i64), ServiceError> {
        recipes::fetch_recipes(filter, viewer, offset, limit, &self.pool).await
    }

    async fn recipe_tags(&self, recipe_id: Id) -> Result<Vec<Tag>, ServiceError> {
        tags::list_recipe_tags(recipe_id, &self.pool).await
    }

    async fn recipe_ingredients(&self, recipe_id: Id) -> Result<Vec<IngredientLine>, ServiceError> {
        ingredients::list_recipe_ingredients(recipe_id, &self.pool).await
    }

    async fn insert_recipe(
        &self,
        author_id: Id,
        draft: &RecipeDraft,
    ) -> Result<Recipe, ServiceError> {
        recipes::create_recipe(author_id, draft, &self.pool).await
    }

    async fn replace_recipe(
        &self,
        recipe_id: Id,
        draft: &RecipeDraft,
    ) -> Result<Recipe, ServiceError> {
        recipes::update_recipe(recipe_id, draft, &self.pool).await
    }

    async fn delete_recipe(&self, recipe_id: Id) -> Result<bool, ServiceError> {
        recipes::delete_recipe(recipe_id, &self.pool).await
    }

    async fn author_recipes(
        &self,
        author_id: Id,
        limit: Option<i64>,
    ) -> Result<Vec<Recipe>, ServiceError> {
        recipes::list_author_recipes(author_id, limit, &self.pool).await
    }

    async fn count_author_recipes(&self, author_id: Id) -> Result<i64, ServiceError> {
        recipes::count_author_recipes(author_id, &self.pool).await
    }

    async fn cart_lines(&self, user_id: Id) -> Result<Vec<IngredientLine>, ServiceError> {
        ingredients::list_cart_ingredients(user_id, &self.pool).await
    }
}

#[async_trait]
impl RelationStore for PgStore {
    async fn insert_relation(
        &self,
        relation: Relation,
        user_id: Id,
        target_id: Id,
    ) -> Result<bool, ServiceError> {
        relations::add_relation(relation, user_id, target_id, &self.pool).await
    }

    async fn delete_relation(
        &self,
        relation: Relation,
        user_id: Id,
        target_id: Id,
    ) -> Result<bool, ServiceError> {
        relations::remove_relation(relation, user_id, target_id, &self.pool).await
    }

    async fn relation_exists(
        &self,
        relation: Relation,
        user_id: Id,
        target_id: Id,
    ) -> Result<bool, ServiceError> {
        relations::is_related(relation, user_id, target_id, &self.pool).await
    }

    async fn relation_targets(
        &self,
        relation: Relation,
        user_id: Id,
    ) -> Result<Vec<Id>, ServiceError> {
        relations::list_related(relation, user_id, &self.pool).await
    }
}
