use crate::{
    error::ServiceError,
    schema::{Id, NewUser, User},
};

use sqlx::{Pool, Postgres};

pub async fn get_user(username: &str, pool: &Pool<Postgres>) -> Result<Option<User>, ServiceError> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_user_by_id(user_id: Id, pool: &Pool<Postgres>) -> Result<Option<User>, ServiceError> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Creates a user; `user.password` must already be hashed.
pub async fn register_user(user: &NewUser, pool: &Pool<Postgres>) -> Result<User, ServiceError> {
    let row: User = sqlx::query_as(
        "
        INSERT INTO users (username, email, first_name, last_name, password)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *;
    ",
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
