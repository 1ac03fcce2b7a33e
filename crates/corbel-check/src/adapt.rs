use serde_json::Value;

use crate::classify;

/// Produce a schema-validator-safe copy of a `props` fragment.
///
/// For every property listed in `foreign_by_prop`, the `type` declaration
/// is replaced by its standard-type remainder; when nothing remains the
/// single type `"null"` is substituted. A generic JSON-Schema evaluator
/// has no notion of class types and would reject them as invalid `type`
/// values, while the existence check still sees the originals.
///
/// All other properties pass through unchanged, and an explicitly empty
/// `properties: {}` stays an empty mapping.
pub fn neutralize(props: &Value, foreign_by_prop: &[(String, Vec<String>)]) -> Value {
    let mut adapted = props.clone();
    let Some(properties) = adapted
        .get_mut("properties")
        .and_then(Value::as_object_mut)
    else {
        return adapted;
    };

    for (name, _classes) in foreign_by_prop {
        let Some(prop) = properties.get_mut(name).and_then(Value::as_object_mut) else {
            continue;
        };
        let Some(declaration) = prop.get("type") else {
            continue;
        };
        let remaining: Vec<Value> = classify::type_list(declaration)
            .into_iter()
            .filter_map(Value::as_str)
            .filter(|name| classify::is_standard_type(name))
            .map(|name| Value::String(name.to_string()))
            .collect();
        let neutralized = if remaining.is_empty() {
            Value::String("null".to_string())
        } else {
            Value::Array(remaining)
        };
        prop.insert("type".to_string(), neutralized);
    }
    adapted
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn foreign(entries: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
        entries
            .iter()
            .map(|(name, classes)| {
                (
                    (*name).to_string(),
                    classes.iter().map(|c| (*c).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn strips_foreign_names_keeping_standard_remainder() {
        let props = json!({
            "type": "object",
            "properties": {"attrs": {"type": ["string", "Attribute"]}}
        });
        let adapted = neutralize(&props, &foreign(&[("attrs", &["Attribute"])]));
        assert_eq!(
            adapted["properties"]["attrs"]["type"],
            json!(["string"])
        );
    }

    #[test]
    fn empty_remainder_becomes_null_type() {
        let props = json!({
            "type": "object",
            "properties": {"widget": {"type": "Widget"}}
        });
        let adapted = neutralize(&props, &foreign(&[("widget", &["Widget"])]));
        assert_eq!(adapted["properties"]["widget"]["type"], json!("null"));
    }

    #[test]
    fn untouched_properties_pass_through() {
        let props = json!({
            "type": "object",
            "properties": {
                "size": {"type": "string", "enum": ["s", "m"]},
                "attrs": {"type": ["Attribute"]}
            }
        });
        let adapted = neutralize(&props, &foreign(&[("attrs", &["Attribute"])]));
        assert_eq!(adapted["properties"]["size"], props["properties"]["size"]);
    }

    #[test]
    fn empty_properties_stays_an_empty_mapping() {
        let props = json!({"type": "object", "properties": {}});
        let adapted = neutralize(&props, &[]);
        assert!(adapted["properties"].as_object().unwrap().is_empty());
        assert_eq!(
            serde_json::to_string(&adapted).unwrap(),
            r#"{"type":"object","properties":{}}"#
        );
    }
}
