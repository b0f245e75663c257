//! JSON rendering of output records.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Serialise records as pretty-printed JSON with two-space indentation.
/// Non-ASCII text is kept as is.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Serialise records and write them to `path` in one go.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = to_json(value)?;
    fs::write(path, json)?;
    Ok(())
}
