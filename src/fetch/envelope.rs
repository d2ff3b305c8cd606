//! Envelope normalization
//!
//! Tagged-union decode of nested (`{"data": ...}`) and flat response shapes.

use crate::error::{Error, Result};
use crate::types::PageResult;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Paginated payload as the backend sends it
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct PageBody<T> {
    products: Vec<T>,
    #[serde(default)]
    has_more: Option<bool>,
    #[serde(default)]
    total_products: Option<u64>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    current_page: Option<u32>,
    #[serde(default)]
    last_page: Option<u32>,
    #[serde(default)]
    next_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged, bound(deserialize = "T: DeserializeOwned"))]
enum Envelope<T> {
    Nested { data: T },
    Flat(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Nested { data } | Self::Flat(data) => data,
        }
    }
}

impl<T> PageBody<T> {
    fn into_page(self) -> PageResult<T> {
        let has_more = self
            .has_more
            .or_else(|| self.next_page.map(|_| true))
            .or_else(|| match (self.current_page, self.last_page) {
                (Some(current), Some(last)) => Some(current < last),
                _ => None,
            })
            .unwrap_or(false);

        PageResult {
            items: self.products,
            has_more,
            total: self.total_products.or(self.total),
            current_page: self.current_page,
            last_page: self.last_page,
            next_page: self.next_page,
        }
    }
}

/// Normalize a paginated response body
///
/// `hint` is the user-facing hint attached to the validation error.
pub fn decode_page<T: DeserializeOwned>(body: &Value, hint: &str) -> Result<PageResult<T>> {
    if !body.is_object() {
        return Err(Error::validation_with_hint(
            format!("expected a JSON object, got {}", json_type(body)),
            hint,
        ));
    }

    serde_json::from_value::<Envelope<PageBody<T>>>(body.clone())
        .map(|envelope| envelope.into_inner().into_page())
        .map_err(|e| match products_list(body) {
            Some(list) => {
                let detail = serde_json::from_value::<Vec<T>>(list.clone())
                    .err()
                    .map_or_else(|| e.to_string(), |item_err| item_err.to_string());
                Error::validation_with_hint(format!("malformed products list: {detail}"), hint)
            }
            None => {
                Error::validation_with_hint(format!("response carries no products list: {e}"), hint)
            }
        })
}

/// The `products` array of either envelope shape, nested first
fn products_list(body: &Value) -> Option<&Value> {
    [&body["data"]["products"], &body["products"]]
        .into_iter()
        .find(|list| list.is_array())
}

/// Normalize a single-resource response body
pub fn decode_item<T: DeserializeOwned>(body: &Value, hint: &str) -> Result<T> {
    if body.is_null() {
        return Err(Error::validation_with_hint("response has no data", hint));
    }

    serde_json::from_value::<Envelope<T>>(body.clone())
        .map(Envelope::into_inner)
        .map_err(|e| Error::validation_with_hint(format!("unexpected response shape: {e}"), hint))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "nothing",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
