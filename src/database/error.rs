use std::fmt::{self, Display};

use potion::HtmlError;
use thiserror::Error;

/// Failure of a single SDK operation. Nothing is persisted when one is returned.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("You can't subscribe to yourself")]
    SelfSubscription,
    #[error("You don't have permission to perform this action")]
    PermissionDenied,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn invalid(field: &'static str, message: &str) -> Self {
        Self::Validation {
            field,
            message: message.to_string(),
        }
    }

    pub fn not_found(info: &str) -> Self {
        Self::NotFound(info.to_string())
    }

    pub fn conflict(info: &str) -> Self {
        Self::Conflict(info.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Self-subscription is reported as a conflict on the subscription pair.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::SelfSubscription)
    }

    /// Field the message is keyed by, for validation failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

fn describe_constraint(constraint: Option<&str>) -> String {
    match constraint {
        Some("unique_recipe_author") => "You already have a recipe with this name".to_string(),
        Some("unique_ingredient") => "Ingredient with this unit already exists".to_string(),
        Some("tags_slug_key") => "Tag with this slug already exists".to_string(),
        Some("users_username_key") => "User with this username already exists".to_string(),
        Some("users_email_key") => "User with this email already exists".to_string(),
        Some("unique_favorite") => "Recipe is already in favorites".to_string(),
        Some("unique_shopping_cart") => "Recipe is already in shopping cart".to_string(),
        Some("unique_subscription") => "You are already subscribed to this author".to_string(),
        Some(other) => format!("Constraint {other} violated"),
        None => "Unique constraint violated".to_string(),
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Database(e) if e.is_unique_violation() => {
                Self::Conflict(describe_constraint(e.constraint()))
            }
            sqlx::Error::Database(e) if e.is_foreign_key_violation() => {
                Self::NotFound(format!("Referenced row does not exist ({e})"))
            }
            sqlx::Error::RowNotFound => Self::NotFound(String::from("Row not found")),
            sqlx::Error::PoolTimedOut => Self::Internal(String::from("Pool timed out")),
            sqlx::Error::PoolClosed => Self::Internal(String::from("Pool closed")),
            e => {
                log::error!("> Query failed: {e}");
                Self::Internal(format!("{e}"))
            }
        }
    }
}

impl From<TypeError> for ServiceError {
    fn from(value: TypeError) -> Self {
        Self::Validation {
            field: "non_field_errors",
            message: value.info,
        }
    }
}

impl From<ServiceError> for potion::Error {
    fn from(value: ServiceError) -> Self {
        let code = match &value {
            ServiceError::Validation { .. } => {
                return HtmlError::InvalidRequest.new(&value.to_string())
            }
            ServiceError::PermissionDenied => 403,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) | ServiceError::SelfSubscription => 409,
            ServiceError::Internal(_) => 500,
        };

        potion::Error {
            code,
            info: Some(value.to_string()),
            redirect: None,
        }
    }
}

#[derive(Debug)]
pub struct TypeError {
    info: String,
}

impl TypeError {
    pub fn new(info: &str) -> Self {
        Self {
            info: info.to_string(),
        }
    }
}

impl Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.info)
    }
}

impl std::error::Error for TypeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_keyed_by_field() {
        let err = ServiceError::invalid("ingredients", "Add at least one ingredient");
        assert_eq!(err.field(), Some("ingredients"));
        assert_eq!(err.to_string(), "ingredients: Add at least one ingredient");
    }

    #[test]
    fn self_subscription_counts_as_conflict() {
        assert!(ServiceError::SelfSubscription.is_conflict());
        assert!(ServiceError::conflict("dup").is_conflict());
        assert!(!ServiceError::not_found("missing").is_conflict());
    }

    #[test]
    fn constraint_names_map_to_readable_messages() {
        assert_eq!(
            describe_constraint(Some("unique_favorite")),
            "Recipe is already in favorites"
        );
        assert_eq!(
            describe_constraint(Some("something_else")),
            "Constraint something_else violated"
        );
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        assert!(ServiceError::from(sqlx::Error::RowNotFound).is_not_found());
    }

    #[test]
    fn service_errors_carry_http_codes() {
        let err: potion::Error = ServiceError::not_found("Recipe not found").into();
        assert_eq!(err.code, 404);
        let err: potion::Error = ServiceError::SelfSubscription.into();
        assert_eq!(err.code, 409);
        let err: potion::Error = ServiceError::PermissionDenied.into();
        assert_eq!(err.code, 403);
    }
}
