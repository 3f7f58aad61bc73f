//! JSON Schema of the configuration file.

use crate::config::WingmanConfig;

/// Canonical location of the published schema.
const SCHEMA_ID: &str = "https://raw.githubusercontent.com/wingman-wm/wingman/main/wingman.schema.json";

/// Generates a JSON Schema for the Wingman configuration.
///
/// The schema includes all configuration options with their types,
/// descriptions, and default values.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(WingmanConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert("$id".to_string(), serde_json::json!(SCHEMA_ID));
    }

    schema
}

/// Pretty-printed JSON Schema, ready to be written to a file or stdout.
#[must_use]
pub fn print_schema() -> String {
    let schema = generate_schema();
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
