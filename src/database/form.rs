use std::{collections::HashMap, str::FromStr};

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ServiceError;
use crate::schema::{IngredientAmount, NewUser, RecipeDraft};

const REQUIRED: &str = "This field is required";

pub struct Form {
    inner: HashMap<String, Value>,
}

impl Form {
    pub fn from_json(value: Value) -> Result<Self, ServiceError> {
        match value {
            Value::Object(map) => Ok(Self {
                inner: map.into_iter().collect(),
            }),
            _ => Err(ServiceError::invalid(
                "non_field_errors",
                "Expected a JSON object",
            )),
        }
    }

    pub fn get_value<T>(&self, key: &'static str) -> Result<T, ServiceError>
    where
        T: TryFrom<Value>,
    {
        match self.inner.get(key) {
            Some(value) => value
                .to_owned()
                .try_into()
                .map_err(|_e| ServiceError::invalid(key, "Invalid value")),
            None => Err(ServiceError::invalid(key, REQUIRED)),
        }
    }

    /// Accepts both JSON numbers and numeric strings.
    pub fn get_number<T>(&self, key: &'static str) -> Result<T, ServiceError>
    where
        T: FromStr,
    {
        match self.inner.get(key) {
            Some(Value::Number(n)) => n
                .to_string()
                .parse()
                .map_err(|_e| ServiceError::invalid(key, "A valid integer is required")),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_e| ServiceError::invalid(key, "A valid integer is required")),
            Some(_) => Err(ServiceError::invalid(key, "A valid integer is required")),
            None => Err(ServiceError::invalid(key, REQUIRED)),
        }
    }

    pub fn get_str(&self, key: &'static str) -> Result<String, ServiceError> {
        match self.inner.get(key) {
            Some(value) => match value.as_str() {
                Some(v) => Ok(v.to_string()),
                None => Err(ServiceError::invalid(key, "Not a valid string")),
            },
            None => Err(ServiceError::invalid(key, REQUIRED)),
        }
    }

    pub fn get_optional_str(&self, key: &'static str) -> Result<String, ServiceError> {
        match self.inner.get(key) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(_) => self.get_str(key),
        }
    }

    pub fn get_list<T>(&self, key: &'static str) -> Result<Vec<T>, ServiceError>
    where
        T: DeserializeOwned,
    {
        match self.inner.get(key) {
            Some(value @ Value::Array(_)) => serde_json::from_value(value.to_owned())
                .map_err(|e| ServiceError::invalid(key, &format!("Invalid list item ({e})"))),
            Some(_) => Err(ServiceError::invalid(key, "Expected a list of items")),
            None => Err(ServiceError::invalid(key, REQUIRED)),
        }
    }
}

impl TryFrom<Form> for RecipeDraft {
    type Error = ServiceError;

    fn try_from(form: Form) -> Result<Self, Self::Error> {
        Ok(Self {
            name: form.get_str("name")?,
            image: form.get_str("image")?,
            text: form.get_str("text")?,
            cooking_time: form.get_number("cooking_time")?,
            tags: form.get_list("tags")?,
            ingredients: form.get_list::<IngredientAmount>("ingredients")?,
        })
    }
}

impl TryFrom<Form> for NewUser {
    type Error = ServiceError;

    fn try_from(form: Form) -> Result<Self, Self::Error> {
        Ok(Self {
            username: form.get_str("username")?,
            email: form.get_str("email")?,
            first_name: form.get_optional_str("first_name")?,
            last_name: form.get_optional_str("last_name")?,
            password: form.get_str("password")?,
        })
    }
}
