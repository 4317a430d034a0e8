use std::collections::HashMap;

use serde::Serialize;

use super::error::ServiceError;
use crate::schema::Id;

/// Narrowing applied to recipe listings. Empty `tags` means any tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecipeFilter {
    pub author: Option<Id>,
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ServiceError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" | "" => Ok(false),
        _ => Err(ServiceError::invalid(key, "Expected a boolean flag")),
    }
}

impl RecipeFilter {
    /// `pairs` is the raw query string, so repeated `tags` keys are kept.
    pub fn from_query(pairs: &[(String, String)]) -> Result<Self, ServiceError> {
        let mut filter = Self::default();

        for (key, value) in pairs {
            match key.as_str() {
                "author" => {
                    filter.author = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_e| ServiceError::invalid("author", "Invalid author id"))?,
                    )
                }
                "tags" => {
                    let slug = value.trim();
                    if !slug.is_empty() && !filter.tags.iter().any(|t| t == slug) {
                        filter.tags.push(slug.to_string());
                    }
                }
                "is_favorited" => filter.is_favorited = parse_flag("is_favorited", value)?,
                "is_in_shopping_cart" | "is_in_shoppingcarts" => {
                    filter.is_in_shopping_cart = parse_flag("is_in_shopping_cart", value)?
                }
                _ => {}
            }
        }

        Ok(filter)
    }

    /// Favorite and cart narrowing only applies to an authenticated viewer.
    pub fn favorited_by(&self, viewer: Option<Id>) -> Option<Id> {
        viewer.filter(|_| self.is_favorited)
    }

    pub fn in_cart_of(&self, viewer: Option<Id>) -> Option<Id> {
        viewer.filter(|_| self.is_in_shopping_cart)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngredientFilter {
    pub name: Option<String>,
}

impl IngredientFilter {
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        Self {
            name: query
                .get("name")
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
