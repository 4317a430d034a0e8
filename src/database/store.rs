use async_trait::async_trait;

use super::{error::ServiceError, filters::RecipeFilter};
use crate::schema::{
    Id, Ingredient, IngredientLine, NewUser, Recipe, RecipeDraft, Relation, Tag, User,
};

/// Tag and ingredient reference data.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_tag(&self, id: Id) -> Result<Option<Tag>, ServiceError>;

    async fn list_tags(&self) -> Result<Vec<Tag>, ServiceError>;

    async fn create_tag(&self, name: &str, color: &str, slug: &str) -> Result<Tag, ServiceError>;

    async fn get_ingredient(&self, id: Id) -> Result<Option<Ingredient>, ServiceError>;

    /// Ingredients whose name starts with `prefix`, ordered by name.
    async fn search_ingredients(&self, prefix: Option<&str>)
        -> Result<Vec<Ingredient>, ServiceError>;

    /// Returns the existing row when the (name, unit) pair is already known.
    async fn upsert_ingredient(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> Result<Ingredient, ServiceError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: Id) -> Result<Option<User>, ServiceError>;

    async fn find_user(&self, username: &str) -> Result<Option<User>, ServiceError>;

    async fn create_user(&self, user: &NewUser) -> Result<User, ServiceError>;
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn get_recipe(&self, id: Id) -> Result<Option<Recipe>, ServiceError>;

    /// One page of recipes, newest first, plus the total number of matches.
    async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Id>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Recipe>, i64), ServiceError>;

    async fn recipe_tags(&self, recipe_id: Id) -> Result<Vec<Tag>, ServiceError>;

    async fn recipe_ingredients(&self, recipe_id: Id) -> Result<Vec<IngredientLine>, ServiceError>;

    /// Writes the recipe row, its tag set and its ingredient lines as one unit.
    async fn insert_recipe(&self, author_id: Id, draft: &RecipeDraft)
        -> Result<Recipe, ServiceError>;

    /// Overwrites the recipe row and discards every existing tag link and
    /// ingredient line before recreating them from `draft`, as one unit.
    async fn replace_recipe(&self, recipe_id: Id, draft: &RecipeDraft)
        -> Result<Recipe, ServiceError>;

    async fn delete_recipe(&self, recipe_id: Id) -> Result<bool, ServiceError>;

    async fn author_recipes(
        &self,
        author_id: Id,
        limit: Option<i64>,
    ) -> Result<Vec<Recipe>, ServiceError>;

    async fn count_author_recipes(&self, author_id: Id) -> Result<i64, ServiceError>;

    /// Every ingredient line of every recipe in the user's cart, in cart
    /// insertion order and then line order.
    async fn cart_lines(&self, user_id: Id) -> Result<Vec<IngredientLine>, ServiceError>;
}

#[async_trait]
pub trait RelationStore: Send + Sync {
    /// `false` when the pair already existed.
    async fn insert_relation(
        &self,
        relation: Relation,
        user_id: Id,
        target_id: Id,
    ) -> Result<bool, ServiceError>;

    /// `false` when the pair did not exist.
    async fn delete_relation(
        &self,
        relation: Relation,
        user_id: Id,
        target_id: Id,
    ) -> Result<bool, ServiceError>;

    async fn relation_exists(
        &self,
        relation: Relation,
        user_id: Id,
        target_id: Id,
    ) -> Result<bool, ServiceError>;

    /// Targets of the user's pairs, most recently added first.
    async fn relation_targets(
        &self,
        relation: Relation,
        user_id: Id,
    ) -> Result<Vec<Id>, ServiceError>;
}

pub trait Store: CatalogStore + UserStore + RecipeStore + RelationStore {}

impl<T> Store for T where T: CatalogStore + UserStore + RecipeStore + RelationStore {}
