use std::fmt;

use serde_json::Value;

/// Recursive decode failure: either a leaf pairing the offending value with
/// the expected shape, or a branch nesting failures under an object key or
/// array index. Multiple independent failures aggregate into [`DecodeError::Many`]
/// so that a single render reports every failing field, not just the first.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// A value did not match the expected shape.
    Value {
        /// JSON rendering of the value that was found.
        actual: String,
        /// Human description of what was expected.
        expected: String,
    },
    /// Failure nested under a required object property.
    Key {
        /// Property name.
        key: String,
        /// The failure for that property's value.
        error: Box<DecodeError>,
    },
    /// Failure nested under an array index.
    Index {
        /// Zero-based index.
        index: usize,
        /// The failure for that element.
        error: Box<DecodeError>,
    },
    /// Several independent failures collected applicatively.
    Many(Vec<DecodeError>),
}

impl DecodeError {
    /// Leaf error for a value that was present but had the wrong shape.
    pub fn value(actual: &Value, expected: impl Into<String>) -> Self {
        DecodeError::Value {
            actual: render_value(actual),
            expected: expected.into(),
        }
    }

    /// Leaf error for a raw string input that failed a field codec.
    pub fn string_value(actual: &str, expected: impl Into<String>) -> Self {
        DecodeError::Value {
            actual: format!("{actual:?}"),
            expected: expected.into(),
        }
    }

    /// Leaf error for an absent value.
    pub fn missing(expected: impl Into<String>) -> Self {
        DecodeError::Value {
            actual: "undefined".to_string(),
            expected: expected.into(),
        }
    }

    /// Nest an error under an object key.
    pub fn key(key: impl Into<String>, error: DecodeError) -> Self {
        DecodeError::Key {
            key: key.into(),
            error: Box::new(error),
        }
    }

    /// Nest an error under an array index.
    pub fn index(index: usize, error: DecodeError) -> Self {
        DecodeError::Index {
            index,
            error: Box::new(error),
        }
    }

    /// Collapse a non-empty list of failures into a single error.
    ///
    /// A single-element list unwraps to the element itself so that renders of
    /// lone failures carry no aggregation noise.
    pub fn aggregate(mut errors: Vec<DecodeError>) -> Self {
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            DecodeError::Many(errors)
        }
    }

    fn draw(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        match self {
            DecodeError::Value { actual, expected } => {
                write!(f, "cannot decode {actual}, should be {expected}")
            }
            DecodeError::Key { key, error } => {
                writeln!(f, "required property {key:?}")?;
                write!(f, "{prefix}\u{2514}\u{2500} ")?;
                error.draw(f, &format!("{prefix}   "))
            }
            DecodeError::Index { index, error } => {
                writeln!(f, "required index {index}")?;
                write!(f, "{prefix}\u{2514}\u{2500} ")?;
                error.draw(f, &format!("{prefix}   "))
            }
            DecodeError::Many(errors) => {
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                        write!(f, "{prefix}")?;
                    }
                    error.draw(f, prefix)?;
                }
                Ok(())
            }
        }
    }
}

/// Human-readable tree rendering, e.g.
///
/// ```text
/// required property "bar"
/// └─ cannot decode undefined, should be number
/// ```
impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.draw(f, "")
    }
}

impl std::error::Error for DecodeError {}

fn render_value(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn draws_missing_property_as_two_line_tree() {
        let error = DecodeError::key("bar", DecodeError::missing("number"));
        assert_eq!(
            error.to_string(),
            "required property \"bar\"\n\u{2514}\u{2500} cannot decode undefined, should be number"
        );
    }

    #[test]
    fn draws_invalid_string_field_with_quoted_actual() {
        let error = DecodeError::key(
            "RANDOM_ENV_VAR_2",
            DecodeError::string_value("foo", "parsable into a number"),
        );
        assert_eq!(
            error.to_string(),
            "required property \"RANDOM_ENV_VAR_2\"\n\u{2514}\u{2500} cannot decode \"foo\", should be parsable into a number"
        );
    }

    #[test]
    fn draws_nested_keys_with_indentation() {
        let error = DecodeError::key(
            "a",
            DecodeError::key("b", DecodeError::missing("string")),
        );
        assert_eq!(
            error.to_string(),
            "required property \"a\"\n\u{2514}\u{2500} required property \"b\"\n   \u{2514}\u{2500} cannot decode undefined, should be string"
        );
    }

    #[test]
    fn draws_aggregated_failures_on_separate_lines() {
        let error = DecodeError::aggregate(vec![
            DecodeError::key("foo", DecodeError::missing("string")),
            DecodeError::key("bar", DecodeError::missing("number")),
        ]);
        let drawn = error.to_string();
        assert!(drawn.contains("required property \"foo\""));
        assert!(drawn.contains("required property \"bar\""));
    }

    #[test]
    fn aggregate_of_one_unwraps() {
        let error = DecodeError::aggregate(vec![DecodeError::value(&json!(3), "string")]);
        assert_eq!(error.to_string(), "cannot decode 3, should be string");
    }

    #[test]
    fn value_leaf_renders_json_actual() {
        let error = DecodeError::value(&json!({"foo": 1}), "string");
        assert_eq!(
            error.to_string(),
            "cannot decode {\"foo\":1}, should be string"
        );
    }
}
