//! Structural validation and typed decoding of untrusted JSON values.
//!
//! A [`Shape`] describes the expected structure of a value and validates it
//! applicatively: every declared property is checked and every failure is
//! collected into one [`DecodeError`] tree. [`ObjectSchema`] pairs that
//! validation with serde typing, so a handler receives a strongly-typed value
//! while callers receive a complete field-path error rendering on bad input.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;

/// Decodes an untrusted JSON value into a typed output or a structured error.
pub trait Decoder {
    /// The typed value produced on success.
    type Output;

    /// Validate and decode `input`.
    fn decode(&self, input: &Value) -> Result<Self::Output, DecodeError>;
}

/// Structural description of an expected JSON shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Any JSON string.
    String,
    /// Any JSON number.
    Number,
    /// A JSON boolean.
    Boolean,
    /// JSON null.
    Null,
    /// Any value; always valid.
    Any,
    /// An array whose elements all match the inner shape.
    Array(Box<Shape>),
    /// An object with the given required properties.
    Object(Vec<(String, Shape)>),
    /// A property that may be absent; validated when present.
    Optional(Box<Shape>),
    /// A value that may be null; validated otherwise.
    Nullable(Box<Shape>),
}

impl Shape {
    /// Human description used in `should be ...` renderings.
    pub fn expected(&self) -> String {
        match self {
            Shape::String => "string".to_string(),
            Shape::Number => "number".to_string(),
            Shape::Boolean => "boolean".to_string(),
            Shape::Null => "null".to_string(),
            Shape::Any => "any value".to_string(),
            Shape::Array(inner) => format!("an array of {}", inner.expected()),
            Shape::Object(_) => "an object".to_string(),
            Shape::Optional(inner) => inner.expected(),
            Shape::Nullable(inner) => format!("{} or null", inner.expected()),
        }
    }

    /// Validate `input` against this shape.
    ///
    /// Object and array failures are collected across all properties and
    /// elements before reporting, so a render reflects every failing path.
    pub fn validate(&self, input: &Value) -> Result<(), DecodeError> {
        match self {
            Shape::Any => Ok(()),
            Shape::String => match input {
                Value::String(_) => Ok(()),
                other => Err(DecodeError::value(other, self.expected())),
            },
            Shape::Number => match input {
                Value::Number(_) => Ok(()),
                other => Err(DecodeError::value(other, self.expected())),
            },
            Shape::Boolean => match input {
                Value::Bool(_) => Ok(()),
                other => Err(DecodeError::value(other, self.expected())),
            },
            Shape::Null => match input {
                Value::Null => Ok(()),
                other => Err(DecodeError::value(other, self.expected())),
            },
            Shape::Optional(inner) => inner.validate(input),
            Shape::Nullable(inner) => match input {
                Value::Null => Ok(()),
                other => inner
                    .validate(other)
                    .map_err(|_| DecodeError::value(other, self.expected())),
            },
            Shape::Array(inner) => match input {
                Value::Array(items) => {
                    let errors: Vec<DecodeError> = items
                        .iter()
                        .enumerate()
                        .filter_map(|(i, item)| {
                            inner.validate(item).err().map(|e| DecodeError::index(i, e))
                        })
                        .collect();
                    if errors.is_empty() {
                        Ok(())
                    } else {
                        Err(DecodeError::aggregate(errors))
                    }
                }
                other => Err(DecodeError::value(other, self.expected())),
            },
            Shape::Object(props) => match input {
                Value::Object(fields) => {
                    let mut errors = Vec::new();
                    for (key, shape) in props {
                        match fields.get(key) {
                            None => {
                                if !matches!(shape, Shape::Optional(_)) {
                                    errors.push(DecodeError::key(
                                        key,
                                        DecodeError::missing(shape.expected()),
                                    ));
                                }
                            }
                            Some(value) => {
                                if let Err(e) = shape.validate(value) {
                                    errors.push(DecodeError::key(key, e));
                                }
                            }
                        }
                    }
                    if errors.is_empty() {
                        Ok(())
                    } else {
                        Err(DecodeError::aggregate(errors))
                    }
                }
                other => Err(DecodeError::value(other, self.expected())),
            },
        }
    }
}

/// Object decoder combining [`Shape`] validation with serde typing.
///
/// Validation runs first and produces the field-path error tree; only a value
/// that passes validation is handed to `serde_json::from_value`, so serde
/// errors surface only for declarations that disagree with the target type.
///
/// # Example
///
/// ```
/// use lambda_frame_schema::{Decoder, ObjectSchema, Shape};
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct Payload {
///     foo: String,
///     bar: f64,
/// }
///
/// let schema = ObjectSchema::<Payload>::new()
///     .prop("foo", Shape::String)
///     .prop("bar", Shape::Number);
///
/// let decoded = schema.decode(&json!({"foo": "foo", "bar": 3})).unwrap();
/// assert_eq!(decoded.foo, "foo");
/// ```
#[derive(Debug, Clone)]
pub struct ObjectSchema<T> {
    props: Vec<(String, Shape)>,
    _output: PhantomData<fn() -> T>,
}

impl<T> ObjectSchema<T> {
    /// Empty object schema; add properties with [`ObjectSchema::prop`].
    pub fn new() -> Self {
        Self {
            props: Vec::new(),
            _output: PhantomData,
        }
    }

    /// Declare a required property.
    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.props.push((name.into(), shape));
        self
    }

    /// Declare a property that may be absent.
    #[must_use]
    pub fn optional_prop(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.props
            .push((name.into(), Shape::Optional(Box::new(shape))));
        self
    }
}

impl<T> Default for ObjectSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Decoder for ObjectSchema<T> {
    type Output = T;

    fn decode(&self, input: &Value) -> Result<T, DecodeError> {
        Shape::Object(self.props.clone()).validate(input)?;
        serde_json::from_value(input.clone())
            .map_err(|e| DecodeError::value(input, format!("deserializable into the target type ({e})")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Payload {
        foo: String,
        bar: f64,
    }

    fn payload_schema() -> ObjectSchema<Payload> {
        ObjectSchema::new()
            .prop("foo", Shape::String)
            .prop("bar", Shape::Number)
    }

    #[test]
    fn decodes_valid_payload() {
        let decoded = payload_schema()
            .decode(&json!({"foo": "foo", "bar": 3}))
            .unwrap();
        assert_eq!(
            decoded,
            Payload {
                foo: "foo".to_string(),
                bar: 3.0
            }
        );
    }

    #[test]
    fn reports_missing_required_property() {
        let error = payload_schema()
            .decode(&json!({"foo": "foo"}))
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "required property \"bar\"\n\u{2514}\u{2500} cannot decode undefined, should be number"
        );
    }

    #[test]
    fn collects_all_failing_properties() {
        let error = payload_schema().decode(&json!({})).unwrap_err();
        let drawn = error.to_string();
        assert!(drawn.contains("required property \"foo\""));
        assert!(drawn.contains("required property \"bar\""));
    }

    #[test]
    fn reports_wrong_type_under_key() {
        let error = payload_schema()
            .decode(&json!({"foo": "foo", "bar": "three"}))
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "required property \"bar\"\n\u{2514}\u{2500} cannot decode \"three\", should be number"
        );
    }

    #[test]
    fn rejects_non_object_input() {
        let error = payload_schema().decode(&json!(null)).unwrap_err();
        assert_eq!(error.to_string(), "cannot decode null, should be an object");
    }

    #[test]
    fn optional_prop_may_be_absent() {
        #[derive(Debug, Deserialize)]
        struct Sparse {
            foo: String,
            #[serde(default)]
            count: Option<f64>,
        }

        let schema = ObjectSchema::<Sparse>::new()
            .prop("foo", Shape::String)
            .optional_prop("count", Shape::Number);

        let decoded = schema.decode(&json!({"foo": "x"})).unwrap();
        assert_eq!(decoded.foo, "x");
        assert_eq!(decoded.count, None);

        let error = schema.decode(&json!({"foo": "x", "count": "nope"})).unwrap_err();
        assert!(error.to_string().contains("required property \"count\""));
    }

    #[test]
    fn validates_array_elements() {
        let shape = Shape::Array(Box::new(Shape::Number));
        assert!(shape.validate(&json!([1, 2, 3])).is_ok());

        let error = shape.validate(&json!([1, "two", 3])).unwrap_err();
        assert_eq!(
            error.to_string(),
            "required index 1\n\u{2514}\u{2500} cannot decode \"two\", should be number"
        );
    }

    #[test]
    fn nullable_accepts_null_and_inner() {
        let shape = Shape::Nullable(Box::new(Shape::String));
        assert!(shape.validate(&json!(null)).is_ok());
        assert!(shape.validate(&json!("ok")).is_ok());
        let error = shape.validate(&json!(7)).unwrap_err();
        assert_eq!(error.to_string(), "cannot decode 7, should be string or null");
    }
}
