//! Read-side shapes handed back to the boundary layer.
//!
//! Writes take tags and ingredients by id; every read expands them into full
//! objects and adds the viewer-relative flags.

use serde::Serialize;

use crate::{
    error::ServiceError,
    filters::RecipeFilter,
    pagination::PageContext,
    relations::relation_exists,
    schema::{Id, IngredientLine, Recipe, Relation, Tag, User},
    store::{RecipeStore, RelationStore, UserStore},
    RECIPE_COUNT_PER_PAGE, SUBSCRIPTION_COUNT_PER_PAGE,
};

#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngredientLineView {
    pub id: Id,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<IngredientLine> for IngredientLineView {
    fn from(line: IngredientLine) -> Self {
        Self {
            id: line.ingredient_id,
            name: line.name,
            measurement_unit: line.measurement_unit,
            amount: line.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeView {
    pub id: Id,
    pub tags: Vec<Tag>,
    pub author: AuthorView,
    pub ingredients: Vec<IngredientLineView>,
    pub is_favorited: bool,
    #[serde(rename = "is_in_shoppingcarts")]
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Compact recipe used inside subscriptions and after favorite/cart adds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeShortView {
    pub id: Id,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<Recipe> for RecipeShortView {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub author: AuthorView,
    pub recipes_count: i64,
    pub recipes: Vec<RecipeShortView>,
}

pub async fn render_author<S>(
    author: &User,
    viewer: Option<Id>,
    store: &S,
) -> Result<AuthorView, ServiceError>
where
    S: RelationStore + ?Sized,
{
    Ok(AuthorView {
        id: author.id,
        username: author.username.to_owned(),
        email: author.email.to_owned(),
        first_name: author.first_name.to_owned(),
        last_name: author.last_name.to_owned(),
        is_subscribed: relation_exists(Relation::Subscription, viewer, author.id, store).await?,
    })
}

pub async fn render_recipe<S>(
    recipe: Recipe,
    viewer: Option<Id>,
    store: &S,
) -> Result<RecipeView, ServiceError>
where
    S: RecipeStore + UserStore + RelationStore + ?Sized,
{
    let author = match store.get_user(recipe.author_id).await? {
        Some(author) => author,
        None => {
            log::error!("> Recipe {} references missing author {}", recipe.id, recipe.author_id);
            return Err(ServiceError::not_found("Recipe author does not exist"));
        }
    };

    let tags = store.recipe_tags(recipe.id).await?;
    let ingredients = store
        .recipe_ingredients(recipe.id)
        .await?
        .into_iter()
        .map(IngredientLineView::from)
        .collect();

    Ok(RecipeView {
        id: recipe.id,
        tags,
        author: render_author(&author, viewer, store).await?,
        ingredients,
        is_favorited: relation_exists(Relation::Favorite, viewer, recipe.id, store).await?,
        is_in_shopping_cart: relation_exists(Relation::ShoppingCart, viewer, recipe.id, store)
            .await?,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

pub fn render_short_recipe(recipe: Recipe) -> RecipeShortView {
    RecipeShortView::from(recipe)
}

/// Short view of the recipe just added to favorites or the cart.
pub async fn render_relation_target<S>(
    recipe_id: Id,
    store: &S,
) -> Result<RecipeShortView, ServiceError>
where
    S: RecipeStore + ?Sized,
{
    match store.get_recipe(recipe_id).await? {
        Some(recipe) => Ok(render_short_recipe(recipe)),
        None => Err(ServiceError::not_found("No recipe exists with specified id")),
    }
}

pub async fn get_recipe<S>(
    recipe_id: Id,
    viewer: Option<Id>,
    store: &S,
) -> Result<RecipeView, ServiceError>
where
    S: RecipeStore + UserStore + RelationStore + ?Sized,
{
    match store.get_recipe(recipe_id).await? {
        Some(recipe) => render_recipe(recipe, viewer, store).await,
        None => Err(ServiceError::not_found("No recipe exists with specified id")),
    }
}

pub async fn list_recipes<S>(
    filter: &RecipeFilter,
    viewer: Option<Id>,
    offset: i64,
    store: &S,
) -> Result<PageContext<RecipeView>, ServiceError>
where
    S: RecipeStore + UserStore + RelationStore + ?Sized,
{
    let (recipes, total) = store
        .list_recipes(filter, viewer, offset, RECIPE_COUNT_PER_PAGE)
        .await?;

    let mut rows = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        rows.push(render_recipe(recipe, viewer, store).await?);
    }

    Ok(PageContext::from_rows(
        rows,
        total,
        RECIPE_COUNT_PER_PAGE,
        offset,
    ))
}

/// Authors the user follows, newest subscription first, each with a recipe
/// count and up to `recipes_limit` of their newest recipes.
pub async fn list_subscriptions<S>(
    user_id: Id,
    recipes_limit: Option<i64>,
    offset: i64,
    store: &S,
) -> Result<PageContext<SubscriptionView>, ServiceError>
where
    S: RecipeStore + UserStore + RelationStore + ?Sized,
{
    if recipes_limit.is_some_and(|limit| limit < 0) {
        return Err(ServiceError::invalid(
            "recipes_limit",
            "Ensure this value is greater than or equal to 0",
        ));
    }

    let authors = store
        .relation_targets(Relation::Subscription, user_id)
        .await?;
    let total = authors.len() as i64;

    let mut rows = vec![];
    for author_id in authors
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(SUBSCRIPTION_COUNT_PER_PAGE as usize)
    {
        let Some(author) = store.get_user(author_id).await? else {
            continue;
        };

        let recipes = store
            .author_recipes(author_id, recipes_limit)
            .await?
            .into_iter()
            .map(render_short_recipe)
            .collect();

        rows.push(SubscriptionView {
            author: render_author(&author, Some(user_id), store).await?,
            recipes_count: store.count_author_recipes(author_id).await?,
            recipes,
        });
    }

    Ok(PageContext::from_rows(
        rows,
        total,
        SUBSCRIPTION_COUNT_PER_PAGE,
        offset,
    ))
}
