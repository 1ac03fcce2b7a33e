use std::collections::BTreeSet;

use crate::classify;
use crate::component::ComponentDefinition;

/// Whether components must declare a props schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Schema information is optional; definitions without it are valid.
    #[default]
    Lenient,
    /// Every definition must provide schema information (`--enforce-schemas`).
    Strict,
}

/// Outcome of the structural pass.
pub struct StructuralOutcome {
    pub diagnostics: Vec<String>,
    /// Whether schema-dependent checks (classification, adaptation,
    /// schema evaluation, existence) should run for this definition.
    /// False when the definition carries no schema information.
    pub schema_checks: bool,
}

/// Run the structural rules against one definition, in order: name
/// collisions, schema presence, non-string types.
pub fn check(
    definition: &ComponentDefinition<'_>,
    id: &str,
    mode: ValidationMode,
) -> StructuralOutcome {
    let mut diagnostics = Vec::new();

    let slot_names: BTreeSet<&str> = definition.slot_names().into_iter().collect();
    let collisions: Vec<&str> = definition
        .prop_names()
        .into_iter()
        .filter(|name| slot_names.contains(name))
        .collect();
    if !collisions.is_empty() {
        diagnostics.push(format!(
            "The component \"{id}\" declared [{}] both as a prop and as a slot. \
             Make sure to use different names.",
            collisions.join(", ")
        ));
    }

    if !definition.has_schema() {
        if mode == ValidationMode::Strict {
            diagnostics.push(format!(
                "The component \"{id}\" does not provide schema information. \
                 Schema definitions are mandatory for components declared in modules. \
                 For components declared in themes, schema definitions are only mandatory \
                 if the \"enforce_prop_schemas\" key is set to \"true\" in the theme info file."
            ));
        }
        return StructuralOutcome {
            diagnostics,
            schema_checks: false,
        };
    }

    // Non-string type rule. Props also declared as slots are owned by the
    // collision rule and skipped here. A non-textual element anywhere in
    // the type list flags the whole property.
    let mut non_string: Vec<&str> = Vec::new();
    if let Some(properties) = definition.properties() {
        for (name, prop) in properties {
            if slot_names.contains(name.as_str()) {
                continue;
            }
            let Some(declaration) = prop.get("type") else {
                continue;
            };
            if classify::type_list(declaration)
                .iter()
                .any(|item| !item.is_string())
            {
                non_string.push(name.as_str());
            }
        }
    }
    if !non_string.is_empty() {
        diagnostics.push(format!(
            "The component \"{id}\" uses non-string types for properties: {}.",
            non_string.join(", ")
        ));
    }

    StructuralOutcome {
        diagnostics,
        schema_checks: true,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn run(value: &Value, mode: ValidationMode) -> StructuralOutcome {
        check(&ComponentDefinition::new(value), "test", mode)
    }

    #[test]
    fn collision_lists_names_once_in_encounter_order() {
        let value = json!({
            "props": {"type": "object", "properties": {
                "variant": {"type": "string"},
                "size": {"type": "string"},
                "header": {"type": "string"}
            }},
            "slots": {"header": {}, "variant": {}}
        });
        let outcome = run(&value, ValidationMode::Lenient);
        assert_eq!(
            outcome.diagnostics,
            vec![
                "The component \"test\" declared [variant, header] both as a prop and as a slot. \
                 Make sure to use different names."
            ]
        );
    }

    #[test]
    fn no_collision_no_diagnostic() {
        let value = json!({
            "props": {"type": "object", "properties": {"size": {"type": "string"}}},
            "slots": {"header": {}}
        });
        let outcome = run(&value, ValidationMode::Lenient);
        assert!(outcome.diagnostics.is_empty());
        assert!(outcome.schema_checks);
    }

    #[test]
    fn missing_props_is_valid_in_lenient_mode() {
        let outcome = run(&json!({"name": "Button"}), ValidationMode::Lenient);
        assert!(outcome.diagnostics.is_empty());
        assert!(!outcome.schema_checks);
    }

    #[test]
    fn missing_props_is_one_diagnostic_in_strict_mode() {
        let outcome = run(&json!({"name": "Button"}), ValidationMode::Strict);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(
            outcome.diagnostics[0]
                .starts_with("The component \"test\" does not provide schema information.")
        );
        assert!(outcome.diagnostics[0].contains("\"enforce_prop_schemas\""));
        assert!(!outcome.schema_checks);
    }

    #[test]
    fn empty_props_mapping_counts_as_missing() {
        let outcome = run(&json!({"props": {}}), ValidationMode::Strict);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(!outcome.schema_checks);
    }

    #[test]
    fn numeric_type_flags_the_property() {
        let value = json!({
            "props": {"type": "object", "properties": {"count": {"type": 42}}}
        });
        let outcome = run(&value, ValidationMode::Lenient);
        assert_eq!(
            outcome.diagnostics,
            vec!["The component \"test\" uses non-string types for properties: count."]
        );
    }

    #[test]
    fn mixed_list_with_non_string_flags_whole_property() {
        let value = json!({
            "props": {"type": "object", "properties": {
                "flag": {"type": ["string", true]},
                "ok": {"type": ["string", "null"]}
            }}
        });
        let outcome = run(&value, ValidationMode::Lenient);
        assert_eq!(
            outcome.diagnostics,
            vec!["The component \"test\" uses non-string types for properties: flag."]
        );
    }

    #[test]
    fn colliding_prop_is_skipped_by_non_string_rule() {
        let value = json!({
            "props": {"type": "object", "properties": {"header": {"type": 1}}},
            "slots": {"header": {}}
        });
        let outcome = run(&value, ValidationMode::Lenient);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].contains("both as a prop and as a slot"));
    }

    #[test]
    fn collision_reported_before_presence_in_strict_mode() {
        // Slots collide with nothing when props are absent; exercise the
        // ordering with an empty-but-declared props mapping instead.
        let value = json!({"props": {}, "slots": {"header": {}}});
        let outcome = run(&value, ValidationMode::Strict);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].contains("does not provide schema information"));
    }
}
