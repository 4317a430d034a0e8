use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    error::ServiceError,
    filters::RecipeFilter,
    store::{CatalogStore, RecipeStore, RelationStore, UserStore},
};
use crate::schema::{
    Id, Ingredient, IngredientInRecipe, IngredientLine, NewUser, Recipe, RecipeDraft, Relation,
    Tag, User, UserRole,
};

#[derive(Debug, Clone)]
struct RelationRow {
    id: Id,
    relation: Relation,
    user_id: Id,
    target_id: Id,
}

/// Rows of every table. Ids come from one shared sequence.
#[derive(Debug, Default)]
struct Tables {
    sequence: Id,
    users: Vec<User>,
    tags: Vec<Tag>,
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
    recipe_tags: Vec<(Id, Id)>,
    ingredient_lines: Vec<IngredientInRecipe>,
    relations: Vec<RelationRow>,
}

impl Tables {
    fn next_id(&mut self) -> Id {
        self.sequence += 1;
        self.sequence
    }

    fn recipe(&self, id: Id) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    fn ingredient(&self, id: Id) -> Option<&Ingredient> {
        self.ingredients.iter().find(|i| i.id == id)
    }

    fn related(&self, relation: Relation, user_id: Id, target_id: Id) -> bool {
        self.relations
            .iter()
            .any(|r| r.relation == relation && r.user_id == user_id && r.target_id == target_id)
    }

    /// Foreign key and unique checks a recipe write must pass before any row
    /// is touched. `recipe_id` is the row being replaced, if any.
    fn check_recipe_write(
        &self,
        author_id: Id,
        recipe_id: Option<Id>,
        draft: &RecipeDraft,
    ) -> Result<(), ServiceError> {
        if !self.users.iter().any(|u| u.id == author_id) {
            return Err(ServiceError::not_found("Author does not exist"));
        }
        if let Some(id) = draft.tags.iter().find(|id| !self.tags.iter().any(|t| t.id == **id)) {
            return Err(ServiceError::NotFound(format!("Tag {id} does not exist")));
        }
        if let Some(line) = draft.ingredients.iter().find(|l| self.ingredient(l.id).is_none()) {
            return Err(ServiceError::NotFound(format!(
                "Ingredient {} does not exist",
                line.id
            )));
        }
        let duplicate = self.recipes.iter().any(|r| {
            r.author_id == author_id && r.name == draft.name && Some(r.id) != recipe_id
        });
        if duplicate {
            return Err(ServiceError::conflict("You already have a recipe with this name"));
        }

        Ok(())
    }

    fn write_associations(&mut self, recipe_id: Id, draft: &RecipeDraft) {
        self.recipe_tags.retain(|(r, _)| *r != recipe_id);
        self.ingredient_lines.retain(|l| l.recipe_id != recipe_id);

        for tag_id in &draft.tags {
            self.recipe_tags.push((recipe_id, *tag_id));
        }
        for line in &draft.ingredients {
            let id = self.next_id();
            self.ingredient_lines.push(IngredientInRecipe {
                id,
                recipe_id,
                ingredient_id: line.id,
                amount: line.amount,
            });
        }
    }

    fn lines_of(&self, recipe_id: Id) -> Vec<IngredientLine> {
        self.ingredient_lines
            .iter()
            .filter(|l| l.recipe_id == recipe_id)
            .filter_map(|l| {
                self.ingredient(l.ingredient_id).map(|i| IngredientLine {
                    id: l.id,
                    ingredient_id: i.id,
                    name: i.name.clone(),
                    measurement_unit: i.measurement_unit.clone(),
                    amount: l.amount,
                })
            })
            .collect()
    }

    fn matches(&self, recipe: &Recipe, filter: &RecipeFilter, viewer: Option<Id>) -> bool {
        if filter.author.is_some_and(|author| recipe.author_id != author) {
            return false;
        }
        if !filter.tags.is_empty() {
            let tagged = self.recipe_tags.iter().any(|(r, tag_id)| {
                *r == recipe.id
                    && self
                        .tags
                        .iter()
                        .any(|t| t.id == *tag_id && filter.tags.contains(&t.slug))
            });
            if !tagged {
                return false;
            }
        }
        if let Some(user_id) = filter.favorited_by(viewer) {
            if !self.related(Relation::Favorite, user_id, recipe.id) {
                return false;
            }
        }
        if let Some(user_id) = filter.in_cart_of(viewer) {
            if !self.related(Relation::ShoppingCart, user_id, recipe.id) {
                return false;
            }
        }

        true
    }
}

/// Store kept entirely in process memory. Every write validates all of its
/// constraints under the lock before mutating, so failed writes change nothing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user with a given role and an already hashed password.
    pub async fn insert_user(&self, user: &NewUser, role: UserRole) -> Result<User, ServiceError> {
        let mut tables = self.tables.lock().await;

        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(ServiceError::conflict("User with this username already exists"));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(ServiceError::conflict("User with this email already exists"));
        }

        let row = User {
            id: tables.next_id(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            password: user.password.clone(),
            role,
        };
        tables.users.push(row.clone());

        Ok(row)
    }

    /// Raw ingredient line rows of a recipe, exposing their row ids.
    pub async fn ingredient_rows(&self, recipe_id: Id) -> Vec<IngredientInRecipe> {
        let tables = self.tables.lock().await;

        tables
            .ingredient_lines
            .iter()
            .filter(|l| l.recipe_id == recipe_id)
            .cloned()
            .collect()
    }

    pub async fn relation_count(&self, relation: Relation) -> usize {
        let tables = self.tables.lock().await;

        tables
            .relations
            .iter()
            .filter(|r| r.relation == relation)
            .count()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn get_tag(&self, id: Id) -> Result<Option<Tag>, ServiceError> {
        let tables = self.tables.lock().await;

        Ok(tables.tags.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, ServiceError> {
        let tables = self.tables.lock().await;

        Ok(tables.tags.clone())
    }

    async fn create_tag(&self, name: &str, color: &str, slug: &str) -> Result<Tag, ServiceError> {
        let mut tables = self.tables.lock().await;

        if tables.tags.iter().any(|t| t.slug == slug) {
            return Err(ServiceError::conflict("Tag with this slug already exists"));
        }

        let tag = Tag {
            id: tables.next_id(),
            name: name.to_string(),
            color: color.to_string(),
            slug: slug.to_string(),
        };
        tables.tags.push(tag.clone());

        Ok(tag)
    }

    async fn get_ingredient(&self, id: Id) -> Result<Option<Ingredient>, ServiceError> {
        let tables = self.tables.lock().await;

        Ok(tables.ingredient(id).cloned())
    }

    async fn search_ingredients(
        &self,
        prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, ServiceError> {
        let tables = self.tables.lock().await;

        let mut rows: Vec<Ingredient> = tables
            .ingredients
            .iter()
            .filter(|i| prefix.map_or(true, |p| i.name.starts_with(p)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(rows)
    }

    async fn upsert_ingredient(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> Result<Ingredient, ServiceError> {
        let mut tables = self.tables.lock().await;

        let existing = tables
            .ingredients
            .iter()
            .find(|i| i.name == name && i.measurement_unit == measurement_unit);
        if let Some(existing) = existing {
            return Ok(existing.clone());
        }

        let ingredient = Ingredient {
            id: tables.next_id(),
            name: name.to_string(),
            measurement_unit: measurement_unit.to_string(),
        };
        tables.ingredients.push(ingredient.clone());

        Ok(ingredient)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: Id) -> Result<Option<User>, ServiceError> {
        let tables = self.tables.lock().await;

        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, ServiceError> {
        let tables = self.tables.lock().await;

        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, ServiceError> {
        self.insert_user(user, UserRole::User).await
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn get_recipe(&self, id: Id) -> Result<Option<Recipe>, ServiceError> {
        let tables = self.tables.lock().await;

        Ok(tables.recipe(id).cloned())
    }

    async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Id>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Recipe>, i64), ServiceError> {
        let tables = self.tables.lock().await;

        let mut rows: Vec<Recipe> = tables
            .recipes
            .iter()
            .filter(|r| tables.matches(r, filter, viewer))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));

        let total = rows.len() as i64;
        let rows = rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok((rows, total))
    }

    async fn recipe_tags(&self, recipe_id: Id) -> Result<Vec<Tag>, ServiceError> {
        let tables = self.tables.lock().await;

        let mut tags: Vec<Tag> = tables
            .tags
            .iter()
            .filter(|t| tables.recipe_tags.contains(&(recipe_id, t.id)))
            .cloned()
            .collect();
        tags.sort_by_key(|t| t.id);

        Ok(tags)
    }

    async fn recipe_ingredients(&self, recipe_id: Id) -> Result<Vec<IngredientLine>, ServiceError> {
        let tables = self.tables.lock().await;

        Ok(tables.lines_of(recipe_id))
    }

    async fn insert_recipe(
        &self,
        author_id: Id,
        draft: &RecipeDraft,
    ) -> Result<Recipe, ServiceError> {
        let mut tables = self.tables.lock().await;

        tables.check_recipe_write(author_id, None, draft)?;

        let recipe = Recipe {
            id: tables.next_id(),
            author_id,
            name: draft.name.clone(),
            image: draft.image.clone(),
            text: draft.text.clone(),
            cooking_time: draft.cooking_time,
        };
        tables.recipes.push(recipe.clone());
        tables.write_associations(recipe.id, draft);

        log::trace!("> Inserted recipe {} in memory", recipe.id);

        Ok(recipe)
    }

    async fn replace_recipe(
        &self,
        recipe_id: Id,
        draft: &RecipeDraft,
    ) -> Result<Recipe, ServiceError> {
        let mut tables = self.tables.lock().await;

        let author_id = match tables.recipe(recipe_id) {
            Some(recipe) => recipe.author_id,
            None => return Err(ServiceError::not_found("No recipe exists with specified id")),
        };
        tables.check_recipe_write(author_id, Some(recipe_id), draft)?;

        let recipe = Recipe {
            id: recipe_id,
            author_id,
            name: draft.name.clone(),
            image: draft.image.clone(),
            text: draft.text.clone(),
            cooking_time: draft.cooking_time,
        };
        if let Some(row) = tables.recipes.iter_mut().find(|r| r.id == recipe_id) {
            *row = recipe.clone();
        }
        tables.write_associations(recipe_id, draft);

        log::trace!("> Replaced recipe {recipe_id} in memory");

        Ok(recipe)
    }

    async fn delete_recipe(&self, recipe_id: Id) -> Result<bool, ServiceError> {
        let mut tables = self.tables.lock().await;

        let before = tables.recipes.len();
        tables.recipes.retain(|r| r.id != recipe_id);
        if tables.recipes.len() == before {
            return Ok(false);
        }

        tables.recipe_tags.retain(|(r, _)| *r != recipe_id);
        tables.ingredient_lines.retain(|l| l.recipe_id != recipe_id);
        tables.relations.retain(|r| {
            r.relation == Relation::Subscription || r.target_id != recipe_id
        });

        Ok(true)
    }

    async fn author_recipes(
        &self,
        author_id: Id,
        limit: Option<i64>,
    ) -> Result<Vec<Recipe>, ServiceError> {
        let tables = self.tables.lock().await;

        let mut rows: Vec<Recipe> = tables
            .recipes
            .iter()
            .filter(|r| r.author_id == author_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        if let Some(limit) = limit {
            rows.truncate(limit.max(0) as usize);
        }

        Ok(rows)
    }

    async fn count_author_recipes(&self, author_id: Id) -> Result<i64, ServiceError> {
        let tables = self.tables.lock().await;

        Ok(tables.recipes.iter().filter(|r| r.author_id == author_id).count() as i64)
    }

    async fn cart_lines(&self, user_id: Id) -> Result<Vec<IngredientLine>, ServiceError> {
        let tables = self.tables.lock().await;

        Ok(tables
            .relations
            .iter()
            .filter(|r| r.relation == Relation::ShoppingCart && r.user_id == user_id)
            .flat_map(|r| tables.lines_of(r.target_id))
            .collect())
    }
}

#[async_trait]
impl RelationStore for MemoryStore {
    async fn insert_relation(
        &self,
        relation: Relation,
        user_id: Id,
        target_id: Id,
    ) -> Result<bool, ServiceError> {
        let mut tables = self.tables.lock().await;

        let target_exists = match relation {
            Relation::Favorite | Relation::ShoppingCart => tables.recipe(target_id).is_some(),
            Relation::Subscription => tables.users.iter().any(|u| u.id == target_id),
        };
        if !target_exists || !tables.users.iter().any(|u| u.id == user_id) {
            return Err(ServiceError::not_found("Referenced row does not exist"));
        }
        if tables.related(relation, user_id, target_id) {
            return Ok(false);
        }

        let id = tables.next_id();
        tables.relations.push(RelationRow {
            id,
            relation,
            user_id,
            target_id,
        });

        Ok(true)
    }

    async fn delete_relation(
        &self,
        relation: Relation,
        user_id: Id,
        target_id: Id,
    ) -> Result<bool, ServiceError> {
        let mut tables = self.tables.lock().await;

        let before = tables.relations.len();
        tables.relations.retain(|r| {
            !(r.relation == relation && r.user_id == user_id && r.target_id == target_id)
        });

        Ok(tables.relations.len() < before)
    }

    async fn relation_exists(
        &self,
        relation: Relation,
        user_id: Id,
        target_id: Id,
    ) -> Result<bool, ServiceError> {
        let tables = self.tables.lock().await;

        Ok(tables.related(relation, user_id, target_id))
    }

    async fn relation_targets(
        &self,
        relation: Relation,
        user_id: Id,
    ) -> Result<Vec<Id>, ServiceError> {
        let tables = self.tables.lock().await;

        let mut rows: Vec<&RelationRow> = tables
            .relations
            .iter()
            .filter(|r| r.relation == relation && r.user_id == user_id)
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(rows.into_iter().map(|r| r.target_id).collect())
    }
}
