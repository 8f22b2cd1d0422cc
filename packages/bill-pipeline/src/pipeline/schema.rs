//! Response schema descriptions generated from the stage record types.
//!
//! The schema is embedded in each instruction so the delegate sees the exact
//! field names, types, and which fields may be omitted.

use schemars::{schema_for, JsonSchema};

/// Pretty-printed JSON schema for `T`, without the `$schema` header.
pub fn response_schema<T: JsonSchema>() -> String {
    let schema = schema_for!(T);
    let mut value = serde_json::to_value(schema).unwrap_or_default();

    if let serde_json::Value::Object(map) = &mut value {
        map.remove("$schema");
    }

    serde_json::to_string_pretty(&value).unwrap_or_default()
}
