use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use crate::{
    error::ServiceError,
    schema::{Id, Ingredient, IngredientAmount, IngredientLine},
};

pub async fn get_ingredient(
    id: Id,
    pool: &Pool<Postgres>,
) -> Result<Option<Ingredient>, ServiceError> {
    let row: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn search_ingredients(
    prefix: Option<&str>,
    pool: &Pool<Postgres>,
) -> Result<Vec<Ingredient>, ServiceError> {
    let rows: Vec<Ingredient> = match prefix {
        Some(prefix) => {
            // LIKE wildcards in user input are matched literally
            let pattern = format!(
                "{}%",
                prefix
                    .replace('\\', "\\\\")
                    .replace('%', "\\%")
                    .replace('_', "\\_")
            );
            sqlx::query_as("SELECT * FROM ingredients WHERE name LIKE $1 ORDER BY name")
                .bind(pattern)
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query_as("SELECT * FROM ingredients ORDER BY name")
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows)
}

pub async fn upsert_ingredient(
    name: &str,
    measurement_unit: &str,
    pool: &Pool<Postgres>,
) -> Result<Ingredient, ServiceError> {
    // DO UPDATE with a no-op so RETURNING also yields the existing row
    let row: Ingredient = sqlx::query_as(
        "
        INSERT INTO ingredients (name, measurement_unit)
        VALUES ($1, $2)
        ON CONFLICT (name, measurement_unit) DO UPDATE
        SET name = EXCLUDED.name
        RETURNING *;
    ",
    )
    .bind(name)
    .bind(measurement_unit)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn list_recipe_ingredients(
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<Vec<IngredientLine>, ServiceError> {
    let rows: Vec<IngredientLine> = sqlx::query_as(
        "
        SELECT ir.id AS id, i.id AS ingredient_id, i.name AS name,
            i.measurement_unit AS measurement_unit, ir.amount AS amount
        FROM ingredient_in_recipe ir
        INNER JOIN ingredients i ON i.id = ir.ingredient_id
        WHERE ir.recipe_id = $1
        ORDER BY ir.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn list_cart_ingredients(
    user_id: Id,
    pool: &Pool<Postgres>,
) -> Result<Vec<IngredientLine>, ServiceError> {
    let rows: Vec<IngredientLine> = sqlx::query_as(
        "
        SELECT ir.id AS id, i.id AS ingredient_id, i.name AS name,
            i.measurement_unit AS measurement_unit, ir.amount AS amount
        FROM shopping_cart c
        INNER JOIN ingredient_in_recipe ir ON ir.recipe_id = c.recipe_id
        INNER JOIN ingredients i ON i.id = ir.ingredient_id
        WHERE c.user_id = $1
        ORDER BY c.id, ir.id
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Drops every ingredient line of a recipe and recreates them from `lines`.
/// Runs on the caller's transaction.
pub async fn set_recipe_ingredients(
    recipe_id: Id,
    lines: &[IngredientAmount],
    conn: &mut PgConnection,
) -> Result<(), ServiceError> {
    let removed = sqlx::query("DELETE FROM ingredient_in_recipe WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    log::trace!(
        "> Cleared {} ingredient lines of recipe {recipe_id}",
        removed.rows_affected()
    );

    if lines.is_empty() {
        return Ok(());
    }

    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO ingredient_in_recipe (recipe_id, ingredient_id, amount) ",
    );

    query_builder.push_values(lines.iter(), |mut b, line| {
        b.push_bind(recipe_id)
            .push_bind(line.id)
            .push_bind(line.amount);
    });

    query_builder.build().execute(&mut *conn).await?;

    Ok(())
}
