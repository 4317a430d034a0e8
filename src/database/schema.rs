use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeError;

pub type Id = i32;

#[derive(
    Clone, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Eq, Ord, Hash, Deserialize,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Admin,
}

impl TryFrom<Value> for UserRole {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value.as_str() {
            Some(value) => match value {
                "user" => Ok(Self::User),
                "admin" => Ok(Self::Admin),
                _ => Err(TypeError::new("Invalid variant")),
            },
            None => Err(TypeError::new("Failed to parse value as string")),
        }
    }
}

/// Which pair table a user-to-target relation lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// user -> recipe
    Favorite,
    /// user -> recipe
    ShoppingCart,
    /// subscriber -> author
    Subscription,
}

impl Relation {
    pub fn table(&self) -> &'static str {
        match self {
            Relation::Favorite => "favorites",
            Relation::ShoppingCart => "shopping_cart",
            Relation::Subscription => "subscriptions",
        }
    }

    pub fn target_column(&self) -> &'static str {
        match self {
            Relation::Favorite | Relation::ShoppingCart => "recipe_id",
            Relation::Subscription => "author_id",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Relation::Favorite => "favorites",
            Relation::ShoppingCart => "shopping cart",
            Relation::Subscription => "subscriptions",
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: UserRole,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Registration payload. `password` is already hashed once it reaches a store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: Id,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub id: Id,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientInRecipe {
    pub id: Id,
    pub recipe_id: Id,
    pub ingredient_id: Id,
    pub amount: i32,
}

/// An ingredient line with the ingredient's name and unit joined in.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientLine {
    pub id: Id,
    pub ingredient_id: Id,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipe {
    pub id: Id,
    pub author_id: Id,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct RecipeRow {
    pub id: Id,
    pub author_id: Id,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,

    pub count: i64,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            name: row.name,
            image: row.image,
            text: row.text,
            cooking_time: row.cooking_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    pub id: Id,
    pub amount: i32,
}

/// Write-side shape of a recipe: tags and ingredients by reference id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub tags: Vec<Id>,
    pub ingredients: Vec<IngredientAmount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}
