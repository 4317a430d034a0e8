use crate::{
    error::ServiceError,
    schema::{Id, Tag},
};

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

pub async fn create_tag(
    name: &str,
    color: &str,
    slug: &str,
    pool: &Pool<Postgres>,
) -> Result<Tag, ServiceError> {
    let tag: Tag = sqlx::query_as(
        "INSERT INTO tags (name, color, slug) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(name)
    .bind(color)
    .bind(slug)
    .fetch_one(pool)
    .await?;

    Ok(tag)
}

pub async fn get_tag(id: Id, pool: &Pool<Postgres>) -> Result<Option<Tag>, ServiceError> {
    let tag: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(tag)
}

pub async fn list_tags(pool: &Pool<Postgres>) -> Result<Vec<Tag>, ServiceError> {
    let list: Vec<Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(list)
}

pub async fn list_recipe_tags(
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<Vec<Tag>, ServiceError> {
    let list: Vec<Tag> = sqlx::query_as(
        "
        SELECT t.* FROM recipe_tags rt
        INNER JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id = $1
        ORDER BY t.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(list)
}

/// Replaces the whole tag set of a recipe. Runs on the caller's transaction.
pub async fn set_recipe_tags(
    recipe_id: Id,
    tag_ids: &[Id],
    conn: &mut PgConnection,
) -> Result<(), ServiceError> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    let mut query_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");

    query_builder.push_values(tag_ids.iter(), |mut b, tag_id| {
        b.push_bind(recipe_id).push_bind(*tag_id);
    });

    query_builder.build().execute(&mut *conn).await?;

    Ok(())
}
