//! Declared response shapes.
//!
//! A [`Schema`] turns a [`Decoded`] body into a typed value or a
//! [`SchemaIssue`]. Shapes are checked with serde; rules (lengths, slugs,
//! ranges) with `validator`.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use super::decoder::Decoded;
use super::error::SchemaIssue;

/// A declared response shape.
pub trait Schema {
    type Output;

    fn parse(&self, body: &Decoded) -> Result<Self::Output, SchemaIssue>;
}

static NULL: Value = Value::Null;

fn json_of(body: &Decoded) -> Result<&Value, SchemaIssue> {
    match body {
        Decoded::Empty => Ok(&NULL),
        Decoded::Json(value) => Ok(value),
        other => Err(SchemaIssue::NotJson(other.kind())),
    }
}

fn deserialize<T: DeserializeOwned>(value: &Value) -> Result<T, SchemaIssue> {
    Ok(T::deserialize(value)?)
}

/// Shape check only.
pub struct Typed<T>(PhantomData<fn() -> T>);

impl<T: DeserializeOwned> Schema for Typed<T> {
    type Output = T;

    fn parse(&self, body: &Decoded) -> Result<T, SchemaIssue> {
        deserialize(json_of(body)?)
    }
}

/// Shape check followed by the type's validation rules.
pub struct Validated<T>(PhantomData<fn() -> T>);

impl<T: DeserializeOwned + Validate> Schema for Validated<T> {
    type Output = T;

    fn parse(&self, body: &Decoded) -> Result<T, SchemaIssue> {
        let value: T = deserialize(json_of(body)?)?;
        value.validate()?;
        Ok(value)
    }
}

/// A JSON array whose every item passes its validation rules.
pub struct ValidatedList<T>(PhantomData<fn() -> T>);

impl<T: DeserializeOwned + Validate> Schema for ValidatedList<T> {
    type Output = Vec<T>;

    fn parse(&self, body: &Decoded) -> Result<Vec<T>, SchemaIssue> {
        let items: Vec<T> = deserialize(json_of(body)?)?;
        for item in &items {
            item.validate()?;
        }
        Ok(items)
    }
}

/// Unwraps the `data` field of a success envelope, then applies `inner`.
pub struct Data<S>(S);

impl<S: Schema> Schema for Data<S> {
    type Output = S::Output;

    fn parse(&self, body: &Decoded) -> Result<S::Output, SchemaIssue> {
        let data = json_of(body)?
            .get("data")
            .ok_or(SchemaIssue::MissingData)?;
        // Envelopes of empty results carry `"data": null`.
        let inner = match data {
            Value::Null => Decoded::Empty,
            other => Decoded::Json(other.clone()),
        };
        self.0.parse(&inner)
    }
}

pub fn typed<T: DeserializeOwned>() -> Typed<T> {
    Typed(PhantomData)
}

pub fn validated<T: DeserializeOwned + Validate>() -> Validated<T> {
    Validated(PhantomData)
}

pub fn validated_list<T: DeserializeOwned + Validate>() -> ValidatedList<T> {
    ValidatedList(PhantomData)
}

pub fn data<S: Schema>(inner: S) -> Data<S> {
    Data(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::domain::Category;
    use serde_json::json;

    fn category_json(name: &str) -> Value {
        json!({
            "id": 1, "name": name, "slug": "tech", "description": null,
            "sortOrder": 0, "isVisible": true,
            "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_data_unwraps_envelope_list() {
        let body = Decoded::Json(json!({ "data": [category_json("Tech")], "requestId": "r" }));
        let list = data(validated_list::<Category>()).parse(&body).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "Tech");
    }

    #[test]
    fn test_rules_violation_is_reported() {
        let body = Decoded::Json(json!({ "data": category_json("") }));
        let err = data(validated::<Category>()).parse(&body).unwrap_err();
        assert!(matches!(err, SchemaIssue::Rules(_)));
    }

    #[test]
    fn test_shape_mismatch_is_reported() {
        let body = Decoded::Json(json!({ "data": { "id": "not-a-number" } }));
        let err = data(typed::<Category>()).parse(&body).unwrap_err();
        assert!(matches!(err, SchemaIssue::Shape(_)));
    }

    #[test]
    fn test_missing_data_and_non_json() {
        let err = data(typed::<Value>()).parse(&Decoded::Json(json!({ "items": [] }))).unwrap_err();
        assert!(matches!(err, SchemaIssue::MissingData));

        let err = typed::<Value>().parse(&Decoded::Text("oops".to_string())).unwrap_err();
        assert!(matches!(err, SchemaIssue::NotJson("text")));
    }

    #[test]
    fn test_empty_reads_as_null() {
        assert!(typed::<()>().parse(&Decoded::Empty).is_ok());
        let none: Option<Category> = data(typed::<Option<Category>>())
            .parse(&Decoded::Json(json!({ "data": null })))
            .unwrap();
        assert!(none.is_none());
    }
}
