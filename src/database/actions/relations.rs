use sqlx::{Pool, Postgres};

use crate::{
    error::ServiceError,
    schema::{Id, Relation},
};

// Table and column names come from `Relation`, never from input.

pub async fn add_relation(
    relation: Relation,
    user_id: Id,
    target_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, ServiceError> {
    let result = sqlx::query(&format!(
        "INSERT INTO {} (user_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        relation.table(),
        relation.target_column()
    ))
    .bind(user_id)
    .bind(target_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn remove_relation(
    relation: Relation,
    user_id: Id,
    target_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, ServiceError> {
    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = $1 AND {} = $2",
        relation.table(),
        relation.target_column()
    ))
    .bind(user_id)
    .bind(target_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_related(
    relation: Relation,
    user_id: Id,
    target_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, ServiceError> {
    let result: Option<(Id,)> = sqlx::query_as(&format!(
        "SELECT id FROM {} WHERE user_id = $1 AND {} = $2",
        relation.table(),
        relation.target_column()
    ))
    .bind(user_id)
    .bind(target_id)
    .fetch_optional(pool)
    .await?;

    Ok(result.is_some())
}

pub async fn list_related(
    relation: Relation,
    user_id: Id,
    pool: &Pool<Postgres>,
) -> Result<Vec<Id>, ServiceError> {
    let rows: Vec<(Id,)> = sqlx::query_as(&format!(
        "SELECT {} FROM {} WHERE user_id = $1 ORDER BY id DESC",
        relation.target_column(),
        relation.table()
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.0).collect())
}
