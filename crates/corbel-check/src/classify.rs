use std::collections::BTreeSet;

use serde_json::{Map, Value};

/// Type names a generic JSON-Schema validator understands without lookup.
pub const STANDARD_TYPES: [&str; 7] = [
    "array", "boolean", "integer", "null", "number", "object", "string",
];

pub fn is_standard_type(name: &str) -> bool {
    STANDARD_TYPES.contains(&name)
}

/// A property's declared types split into schema primitives and foreign
/// class/interface names.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub standard: Vec<String>,
    pub foreign: Vec<String>,
}

/// Normalize a `type` declaration to list form: a lone value becomes a
/// one-element list.
pub fn type_list(declaration: &Value) -> Vec<&Value> {
    match declaration {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Partition a `type` declaration into standard and foreign names.
///
/// Non-textual elements are ignored here; the non-string-type structural
/// rule owns those. Duplicates keep their first occurrence only.
pub fn classify(declaration: &Value) -> Classification {
    let mut out = Classification::default();
    let mut seen = BTreeSet::new();
    for item in type_list(declaration) {
        let Some(name) = item.as_str() else {
            continue;
        };
        if !seen.insert(name) {
            continue;
        }
        if is_standard_type(name) {
            out.standard.push(name.to_string());
        } else {
            out.foreign.push(name.to_string());
        }
    }
    out
}

/// Foreign type names per property, in property encounter order.
/// Properties without foreign types are omitted.
pub fn foreign_types_by_prop(properties: &Map<String, Value>) -> Vec<(String, Vec<String>)> {
    properties
        .iter()
        .filter_map(|(name, prop)| {
            let declaration = prop.get("type")?;
            let foreign = classify(declaration).foreign;
            if foreign.is_empty() {
                None
            } else {
                Some((name.clone(), foreign))
            }
        })
        .collect()
}

/// Capability for answering whether a class or interface of a given name
/// exists in the host environment. Queried once per distinct foreign type
/// name; the engine only ever sees this trait.
pub trait TypeRegistry {
    fn type_exists(&self, name: &str) -> bool;
}

/// Registry that treats every foreign type as known. Used when no
/// allow-list is configured, since no live type system is available to ask.
pub struct AllowAll;

impl TypeRegistry for AllowAll {
    fn type_exists(&self, _name: &str) -> bool {
        true
    }
}

/// Registry backed by an explicit set of known type names.
pub struct AllowList(BTreeSet<String>);

impl AllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }
}

impl TypeRegistry for AllowList {
    fn type_exists(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}
