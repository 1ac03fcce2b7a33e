use serde_json::Value;

/// Remove every in-band `$schema` marker, recursively. The marker is
/// advisory and must never surface as a schema violation of its own.
pub fn strip_schema_refs(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.shift_remove("$schema");
            for nested in map.values_mut() {
                strip_schema_refs(nested);
            }
        }
        Value::Array(items) => {
            for nested in items {
                strip_schema_refs(nested);
            }
        }
        _ => {}
    }
}

/// Compile the metadata schema once per run.
///
/// # Errors
///
/// Returns the compiler's message when the document is not a valid
/// schema; callers surface it per file as `Schema validation error: …`.
pub fn compile(schema: &Value) -> Result<jsonschema::Validator, String> {
    jsonschema::options()
        .build(schema)
        .map_err(|e| e.to_string())
}

/// Evaluate an adapted definition against the compiled schema, one
/// formatted diagnostic per violation: `[<path>] <message>`, or the bare
/// message when the violation is at the document root.
pub fn evaluate(validator: &jsonschema::Validator, instance: &Value) -> Vec<String> {
    validator
        .iter_errors(instance)
        .map(|error| {
            let path = error.instance_path().to_string();
            if path.is_empty() {
                error.to_string()
            } else {
                format!("[{path}] {error}")
            }
        })
        .collect()
}
