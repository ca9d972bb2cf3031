//! Schema decoding glue for the `lambda-frame` wrapper pipeline.
//!
//! This crate provides the small decoding surface the framework needs:
//!
//! - [`DecodeError`]: a recursive field-path error tree with a human-readable
//!   `Display` rendering
//! - [`Decoder`]: the capability consumed by the pipeline ("an untrusted JSON
//!   value decodes into a typed value or a structured error")
//! - [`ObjectSchema`] and [`Shape`]: structural validation paired with serde
//!   typing for event payloads, HTTP bodies, and resolver arguments
//! - [`FieldSchema`] and [`SchemaRecord`]: codecs for flat string-keyed
//!   records (environment variables, headers, query parameters)
//!
//! Validation is applicative: all declared properties of a shape and all keys
//! of a record are checked, and every failure is collected into a single
//! error tree, so one rendering reports the complete set of problems.

#![deny(warnings)]

mod decode;
mod error;
mod field;

pub use decode::{Decoder, ObjectSchema, Shape};
pub use error::DecodeError;
pub use field::{decode_timestamp, schema_record, FieldSchema, SchemaRecord};
