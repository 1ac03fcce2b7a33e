use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use serde_json::Value;

use corbel_schema_cache::{SchemaProvider, SchemaSource};

use crate::adapt;
use crate::classify::{self, TypeRegistry};
use crate::component::ComponentDefinition;
use crate::discover;
use crate::evaluate;
use crate::parser;
use crate::rules::{self, ValidationMode};

pub struct ValidateArgs {
    /// Component files or directories to scan
    pub paths: Vec<String>,

    /// Exclude files matching these globs (repeatable)
    pub exclude: Vec<String>,

    /// Lenient (schema optional) or strict (`--enforce-schemas`)
    pub mode: ValidationMode,
}

/// Diagnostics for one checked component file.
pub struct FileReport {
    pub path: String,
    /// Where the schema came from; `None` when schema validation was skipped.
    pub schema_source: Option<SchemaSource>,
    pub diagnostics: Vec<String>,
}

impl FileReport {
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Result of a validation run.
pub struct ValidateResult {
    pub reports: Vec<FileReport>,
}

impl ValidateResult {
    pub fn has_errors(&self) -> bool {
        self.reports.iter().any(|r| !r.is_valid())
    }

    pub fn files_checked(&self) -> usize {
        self.reports.len()
    }

    pub fn files_with_errors(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_valid()).count()
    }
}

// ---------------------------------------------------------------------------
// Schema state
// ---------------------------------------------------------------------------

/// Outcome of resolving and compiling the metadata schema, shared by every
/// file in the run.
enum SchemaState {
    /// Resolution failed; schema evaluation is skipped for the whole run.
    Absent,
    Ready(jsonschema::Validator),
    /// The resolved document is not a valid schema; each file reports it.
    Broken(String),
}

async fn resolve_schema(provider: &SchemaProvider) -> (SchemaState, Option<SchemaSource>) {
    match provider.resolve().await {
        Some((value, source)) => match evaluate::compile(&value) {
            Ok(validator) => (SchemaState::Ready(validator), Some(source)),
            Err(message) => (SchemaState::Broken(message), Some(source)),
        },
        None => {
            eprintln!(
                "warning: could not resolve the component metadata schema; \
                 schema validation skipped"
            );
            (SchemaState::Absent, None)
        }
    }
}

// ---------------------------------------------------------------------------
// File collection
// ---------------------------------------------------------------------------

/// Collect input files from paths, walking directories and applying
/// exclude filters. Order is deterministic within a run.
fn collect_files(paths: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for raw in paths {
        let path = Path::new(raw);
        if path.is_dir() {
            files.extend(discover::discover_files(path, exclude)?);
        } else if path.is_file() {
            if !discover::is_excluded(path, exclude) {
                files.push(path.to_path_buf());
            }
        } else {
            bail!("no such file or directory: {raw}");
        }
    }
    Ok(files)
}

// ---------------------------------------------------------------------------
// Per-definition validation
// ---------------------------------------------------------------------------

/// Validate one decoded definition, returning diagnostics in the fixed
/// order: collisions, schema presence, non-string types, schema
/// evaluation, missing classes.
fn validate_definition(
    raw: &Value,
    path: &Path,
    mode: ValidationMode,
    schema: &SchemaState,
    registry: &dyn TypeRegistry,
) -> Vec<String> {
    let mut definition = raw.clone();
    evaluate::strip_schema_refs(&mut definition);

    let component = ComponentDefinition::new(&definition);
    let id = component.machine_name(path);

    let outcome = rules::check(&component, &id, mode);
    let mut diagnostics = outcome.diagnostics;
    if !outcome.schema_checks {
        return diagnostics;
    }

    let foreign = component
        .properties()
        .map(classify::foreign_types_by_prop)
        .unwrap_or_default();

    match schema {
        SchemaState::Ready(validator) => {
            let adapted = adapt_definition(&definition, &foreign);
            diagnostics.extend(evaluate::evaluate(validator, &adapted));
        }
        SchemaState::Broken(message) => {
            diagnostics.push(format!("Schema validation error: {message}"));
        }
        SchemaState::Absent => {}
    }

    for (prop, classes) in &foreign {
        for class in classes {
            if !registry.type_exists(class) {
                diagnostics.push(format!(
                    "Unable to find class/interface \"{class}\" specified in the prop \
                     \"{prop}\" for the component \"{id}\"."
                ));
            }
        }
    }

    diagnostics
}

/// Clone the definition with its `props` fragment neutralized for the
/// generic schema evaluator.
fn adapt_definition(definition: &Value, foreign: &[(String, Vec<String>)]) -> Value {
    let mut adapted = definition.clone();
    if let Some(obj) = adapted.as_object_mut()
        && let Some(props) = definition.get("props")
    {
        obj.insert("props".to_string(), adapt::neutralize(props, foreign));
    }
    adapted
}

fn check_file(
    path: &Path,
    mode: ValidationMode,
    schema: &SchemaState,
    registry: &dyn TypeRegistry,
) -> Vec<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return vec![format!("failed to read: {e}")],
    };
    match parser::decode(&content) {
        Ok(value) => validate_definition(&value, path, mode, schema, registry),
        Err(e) => vec![e.to_string()],
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub async fn run(
    args: &ValidateArgs,
    provider: &SchemaProvider,
    registry: &dyn TypeRegistry,
) -> Result<ValidateResult> {
    run_with(args, provider, registry, |_| {}).await
}

/// Like [`run`], but calls `on_check` each time a file is checked,
/// allowing callers to stream progress (e.g. verbose output).
///
/// Files are processed one at a time in discovery order; no failure in
/// one file affects another. The schema is resolved at most once, and
/// only when at least one file was discovered.
///
/// # Errors
///
/// Returns an error only for failures of the run itself (a positional
/// path that does not exist, an unreadable directory walk), never for
/// per-file validation outcomes.
pub async fn run_with(
    args: &ValidateArgs,
    provider: &SchemaProvider,
    registry: &dyn TypeRegistry,
    mut on_check: impl FnMut(&FileReport),
) -> Result<ValidateResult> {
    let files = collect_files(&args.paths, &args.exclude)?;
    tracing::debug!(count = files.len(), "collected component files");
    if files.is_empty() {
        return Ok(ValidateResult {
            reports: Vec::new(),
        });
    }

    let (schema, source) = resolve_schema(provider).await;

    let mut reports = Vec::with_capacity(files.len());
    for path in &files {
        let diagnostics = check_file(path, args.mode, &schema, registry);
        let report = FileReport {
            path: path.display().to_string(),
            schema_source: source,
            diagnostics,
        };
        on_check(&report);
        reports.push(report);
    }

    Ok(ValidateResult { reports })
}
