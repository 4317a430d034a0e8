pub const RECIPE_COUNT_PER_PAGE: i64 = 6;
pub const SUBSCRIPTION_COUNT_PER_PAGE: i64 = 6;

pub const MIN_INGREDIENT_AMOUNT: i32 = 1;
pub const MIN_COOKING_TIME: i32 = 1;

pub const RECIPE_NAME_MAX_LENGTH: usize = 200;

/// Usernames that collide with routes of the user endpoints.
pub const RESERVED_USERNAMES: &[&str] = &["me"];

pub const SESSION_COOKIE: &str = "session";
