use crate::{
    error::ServiceError,
    filters::RecipeFilter,
    schema::{Id, Recipe, RecipeDraft, RecipeRow},
};

use super::{ingredients::set_recipe_ingredients, tags::set_recipe_tags};

use sqlx::{Pool, Postgres, QueryBuilder};

fn push_filters(
    query_builder: &mut QueryBuilder<'_, Postgres>,
    filter: &RecipeFilter,
    viewer: Option<Id>,
) {
    if let Some(author) = filter.author {
        query_builder.push(" AND r.author_id = ").push_bind(author);
    }

    if !filter.tags.is_empty() {
        query_builder
            .push(
                " AND r.id IN (SELECT rt.recipe_id FROM recipe_tags rt \
                 INNER JOIN tags t ON t.id = rt.tag_id WHERE t.slug = ANY(",
            )
            .push_bind(filter.tags.clone())
            .push("))");
    }

    if let Some(user_id) = filter.favorited_by(viewer) {
        query_builder
            .push(" AND r.id IN (SELECT recipe_id FROM favorites WHERE user_id = ")
            .push_bind(user_id)
            .push(")");
    }

    if let Some(user_id) = filter.in_cart_of(viewer) {
        query_builder
            .push(" AND r.id IN (SELECT recipe_id FROM shopping_cart WHERE user_id = ")
            .push_bind(user_id)
            .push(")");
    }
}

async fn count_recipes(
    filter: &RecipeFilter,
    viewer: Option<Id>,
    pool: &Pool<Postgres>,
) -> Result<i64, ServiceError> {
    let mut query_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM recipes r WHERE TRUE");
    push_filters(&mut query_builder, filter, viewer);

    let count: (i64,) = query_builder.build_query_as().fetch_one(pool).await?;

    Ok(count.0)
}

pub async fn fetch_recipes(
    filter: &RecipeFilter,
    viewer: Option<Id>,
    offset: i64,
    limit: i64,
    pool: &Pool<Postgres>,
) -> Result<(Vec<Recipe>, i64), ServiceError> {
    let mut query_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT r.*, COUNT(*) OVER() AS count FROM recipes r WHERE TRUE");
    push_filters(&mut query_builder, filter, viewer);

    query_builder
        .push(" ORDER BY r.id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let rows: Vec<RecipeRow> = query_builder.build_query_as::<RecipeRow>().fetch_all(pool).await?;

    // The window count is absent when the offset runs past the last row
    let total_count = match rows.first() {
        Some(row) => row.count,
        None if offset > 0 => count_recipes(filter, viewer, pool).await?,
        None => 0,
    };
    let rows = rows.into_iter().map(Recipe::from).collect();

    Ok((rows, total_count))
}

pub async fn get_recipe(id: Id, pool: &Pool<Postgres>) -> Result<Option<Recipe>, ServiceError> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn list_author_recipes(
    author_id: Id,
    limit: Option<i64>,
    pool: &Pool<Postgres>,
) -> Result<Vec<Recipe>, ServiceError> {
    // LIMIT NULL means no limit
    let rows: Vec<Recipe> =
        sqlx::query_as("SELECT * FROM recipes WHERE author_id = $1 ORDER BY id DESC LIMIT $2")
            .bind(author_id)
            .bind(limit)
            .fetch_all(pool)
            .await?;

    Ok(rows)
}

pub async fn count_author_recipes(author_id: Id, pool: &Pool<Postgres>) -> Result<i64, ServiceError> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(pool)
        .await?;

    Ok(count.0)
}

/// Recipe row, tag links and ingredient lines in one transaction.
pub async fn create_recipe(
    author_id: Id,
    draft: &RecipeDraft,
    pool: &Pool<Postgres>,
) -> Result<Recipe, ServiceError> {
    let mut tx = pool.begin().await?;

    let recipe: Recipe = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, image, text, cooking_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
    ",
    )
    .bind(author_id)
    .bind(&draft.name)
    .bind(&draft.image)
    .bind(&draft.text)
    .bind(draft.cooking_time)
    .fetch_one(&mut *tx)
    .await?;

    set_recipe_tags(recipe.id, &draft.tags, &mut *tx).await?;
    set_recipe_ingredients(recipe.id, &draft.ingredients, &mut *tx).await?;

    tx.commit().await?;

    Ok(recipe)
}

/// Clear-then-recreate update in one transaction. A failure rolls back to the
/// previous recipe state when `tx` is dropped.
pub async fn update_recipe(
    id: Id,
    draft: &RecipeDraft,
    pool: &Pool<Postgres>,
) -> Result<Recipe, ServiceError> {
    let mut tx = pool.begin().await?;

    let recipe: Option<Recipe> = sqlx::query_as(
        "
        UPDATE recipes SET name = $1, image = $2, text = $3, cooking_time = $4
        WHERE id = $5
        RETURNING *
    ",
    )
    .bind(&draft.name)
    .bind(&draft.image)
    .bind(&draft.text)
    .bind(draft.cooking_time)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let recipe = match recipe {
        Some(recipe) => recipe,
        None => return Err(ServiceError::not_found("No recipe exists with specified id")),
    };

    set_recipe_tags(recipe.id, &draft.tags, &mut *tx).await?;
    set_recipe_ingredients(recipe.id, &draft.ingredients, &mut *tx).await?;

    tx.commit().await?;

    Ok(recipe)
}

/// Tag links, ingredient lines and relations cascade on the foreign keys.
pub async fn delete_recipe(id: Id, pool: &Pool<Postgres>) -> Result<bool, ServiceError> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
