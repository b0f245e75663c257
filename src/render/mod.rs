//! Rendering module for writing output records.

mod json;

pub use json::{to_json, write_json};
