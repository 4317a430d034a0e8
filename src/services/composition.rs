//! Create, update and delete of the recipe aggregate.
//!
//! Every write validates the draft, resolves each referenced tag and
//! ingredient, and only then hands the whole draft to the store, which applies
//! the recipe row, tag set and ingredient lines as one unit.

use std::collections::HashSet;

use crate::{
    error::ServiceError,
    permissions::can_manage_recipe,
    schema::{Id, Recipe, RecipeDraft},
    session::SessionData,
    store::{CatalogStore, RecipeStore, UserStore},
    MIN_COOKING_TIME, MIN_INGREDIENT_AMOUNT, RECIPE_NAME_MAX_LENGTH,
};

/// Checks that need no store access. Runs before anything is looked up.
pub fn validate_draft(draft: &RecipeDraft) -> Result<(), ServiceError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(ServiceError::invalid("name", "Recipe name can't be blank"));
    }
    if name.chars().count() > RECIPE_NAME_MAX_LENGTH {
        return Err(ServiceError::Validation {
            field: "name",
            message: format!("Recipe name must be at most {RECIPE_NAME_MAX_LENGTH} characters"),
        });
    }
    if draft.cooking_time < MIN_COOKING_TIME {
        return Err(ServiceError::Validation {
            field: "cooking_time",
            message: format!("Cooking time must be at least {MIN_COOKING_TIME}"),
        });
    }

    if draft.tags.is_empty() {
        return Err(ServiceError::invalid("tags", "Choose at least one tag"));
    }
    let mut tags = HashSet::new();
    if !draft.tags.iter().all(|id| tags.insert(*id)) {
        return Err(ServiceError::invalid("tags", "Tags must be unique"));
    }

    if draft.ingredients.is_empty() {
        return Err(ServiceError::invalid(
            "ingredients",
            "Add at least one ingredient",
        ));
    }
    let mut ingredients = HashSet::new();
    for line in &draft.ingredients {
        if !ingredients.insert(line.id) {
            return Err(ServiceError::invalid(
                "ingredients",
                "Ingredients must not repeat",
            ));
        }
        if line.amount < MIN_INGREDIENT_AMOUNT {
            return Err(ServiceError::Validation {
                field: "amount",
                message: format!("Ingredient amount must be at least {MIN_INGREDIENT_AMOUNT}"),
            });
        }
    }

    Ok(())
}

/// Fails with NotFound on the first tag or ingredient id that doesn't exist.
async fn resolve_references<S>(draft: &RecipeDraft, store: &S) -> Result<(), ServiceError>
where
    S: CatalogStore + ?Sized,
{
    for id in &draft.tags {
        if store.get_tag(*id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Tag {id} does not exist")));
        }
    }
    for line in &draft.ingredients {
        if store.get_ingredient(line.id).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Ingredient {} does not exist",
                line.id
            )));
        }
    }

    Ok(())
}

fn normalized(draft: &RecipeDraft) -> RecipeDraft {
    RecipeDraft {
        name: draft.name.trim().to_string(),
        ..draft.clone()
    }
}

pub async fn create_recipe<S>(
    author_id: Id,
    draft: &RecipeDraft,
    store: &S,
) -> Result<Recipe, ServiceError>
where
    S: CatalogStore + UserStore + RecipeStore + ?Sized,
{
    validate_draft(draft)?;

    if store.get_user(author_id).await?.is_none() {
        return Err(ServiceError::not_found("Author does not exist"));
    }
    resolve_references(draft, store).await?;

    let recipe = store
        .insert_recipe(author_id, &normalized(draft))
        .await
        .inspect_err(|e| log::warn!("Rejected recipe from user {author_id}: {e}"))?;

    log::info!(
        "Created recipe {} ({} tags, {} ingredients) for user {author_id}",
        recipe.id,
        draft.tags.len(),
        draft.ingredients.len()
    );

    Ok(recipe)
}

/// Replaces the recipe's fields, tag set and ingredient lines wholesale.
/// Existing ingredient lines are always dropped and recreated.
pub async fn update_recipe<S>(
    recipe_id: Id,
    draft: &RecipeDraft,
    store: &S,
) -> Result<Recipe, ServiceError>
where
    S: CatalogStore + RecipeStore + ?Sized,
{
    validate_draft(draft)?;

    if store.get_recipe(recipe_id).await?.is_none() {
        return Err(ServiceError::not_found("No recipe exists with specified id"));
    }
    resolve_references(draft, store).await?;

    let recipe = store
        .replace_recipe(recipe_id, &normalized(draft))
        .await
        .inspect_err(|e| log::warn!("Rejected update of recipe {recipe_id}: {e}"))?;

    log::info!("Updated recipe {recipe_id}");

    Ok(recipe)
}

pub async fn delete_recipe<S>(recipe_id: Id, store: &S) -> Result<(), ServiceError>
where
    S: RecipeStore + ?Sized,
{
    if !store.delete_recipe(recipe_id).await? {
        return Err(ServiceError::not_found("No recipe exists with specified id"));
    }

    log::info!("Deleted recipe {recipe_id}");

    Ok(())
}

/// Loads a recipe the session is allowed to modify.
pub async fn get_recipe_mut<S>(
    recipe_id: Id,
    session: &SessionData,
    store: &S,
) -> Result<Recipe, ServiceError>
where
    S: RecipeStore + ?Sized,
{
    match store.get_recipe(recipe_id).await? {
        Some(recipe) if can_manage_recipe(session, &recipe) => Ok(recipe),
        Some(_) => Err(ServiceError::PermissionDenied),
        None => Err(ServiceError::not_found("No recipe exists with specified id")),
    }
}
