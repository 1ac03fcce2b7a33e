use std::path::Path;

use serde_json::{Map, Value};

/// Borrow-based view over a decoded component definition.
///
/// Definitions arrive as free-form mappings from the YAML decoder; this
/// wrapper centralizes the field access so the rules never poke at raw
/// keys themselves.
pub struct ComponentDefinition<'a> {
    value: &'a Value,
}

impl<'a> ComponentDefinition<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// Identifier used in diagnostics: an explicit `machineName`, then
    /// `id`, then the name of the directory containing the file, then the
    /// literal `unknown`.
    pub fn machine_name(&self, source_path: &Path) -> String {
        if let Some(name) = self.value.get("machineName").and_then(Value::as_str) {
            return name.to_string();
        }
        if let Some(name) = self.value.get("id").and_then(Value::as_str) {
            return name.to_string();
        }
        source_path
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string()
    }

    pub fn props(&self) -> Option<&'a Value> {
        self.value.get("props")
    }

    /// The `props.properties` mapping, when declared as a mapping.
    pub fn properties(&self) -> Option<&'a Map<String, Value>> {
        self.props()?.get("properties")?.as_object()
    }

    /// The `slots` mapping, when declared as a mapping.
    pub fn slots(&self) -> Option<&'a Map<String, Value>> {
        self.value.get("slots")?.as_object()
    }

    /// Declared property names in encounter order.
    pub fn prop_names(&self) -> Vec<&'a str> {
        self.properties()
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Declared slot names in encounter order.
    pub fn slot_names(&self) -> Vec<&'a str> {
        self.slots()
            .map(|slots| slots.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether the definition carries any schema information: `props`
    /// present, non-null, and not an empty mapping.
    pub fn has_schema(&self) -> bool {
        match self.props() {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(_) => true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn machine_name_prefers_explicit_field() {
        let value = json!({"machineName": "button", "id": "other"});
        let def = ComponentDefinition::new(&value);
        assert_eq!(
            def.machine_name(Path::new("/c/button/button.component.yml")),
            "button"
        );
    }

    #[test]
    fn machine_name_falls_back_to_id() {
        let value = json!({"id": "card"});
        let def = ComponentDefinition::new(&value);
        assert_eq!(def.machine_name(Path::new("/c/x/x.component.yml")), "card");
    }

    #[test]
    fn machine_name_falls_back_to_directory() {
        let value = json!({"name": "Button"});
        let def = ComponentDefinition::new(&value);
        assert_eq!(
            def.machine_name(Path::new("/components/button/button.component.yml")),
            "button"
        );
    }

    #[test]
    fn machine_name_unknown_when_no_parent() {
        let value = json!({});
        let def = ComponentDefinition::new(&value);
        assert_eq!(def.machine_name(Path::new("x.component.yml")), "unknown");
    }

    #[test]
    fn prop_and_slot_names_in_encounter_order() {
        let value = json!({
            "props": {"type": "object", "properties": {"b": {}, "a": {}}},
            "slots": {"footer": {}, "header": {}}
        });
        let def = ComponentDefinition::new(&value);
        assert_eq!(def.prop_names(), vec!["b", "a"]);
        assert_eq!(def.slot_names(), vec!["footer", "header"]);
    }

    #[test]
    fn has_schema_rejects_missing_null_and_empty() {
        for value in [json!({}), json!({"props": null}), json!({"props": {}})] {
            assert!(!ComponentDefinition::new(&value).has_schema());
        }
        let present = json!({"props": {"type": "object", "properties": {}}});
        assert!(ComponentDefinition::new(&present).has_schema());
    }
}
