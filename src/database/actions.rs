//! Postgres queries, one module per table group. `PgStore` routes the store
//! traits through these.

pub mod ingredients;
pub mod recipes;
pub mod relations;
pub mod tags;
pub mod users;
