use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use bpaf::Bpaf;

use corbel_check::classify::{AllowAll, AllowList, TypeRegistry};
use corbel_check::rules::ValidationMode;
use corbel_check::schema_cache::{ReqwestTransport, SchemaProvider, SchemaSource};
use corbel_check::validate::{self, FileReport};

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
#[allow(clippy::struct_excessive_bools)]
/// Validate component metadata files against the canonical component schema
struct Cli {
    /// Require every component to declare a props schema
    #[bpaf(long("enforce-schemas"), switch)]
    enforce_schemas: bool,

    /// Exclude files matching this glob (repeatable)
    #[bpaf(long("exclude"), argument("PATTERN"))]
    exclude: Vec<String>,

    /// Directory for the schema cache file
    #[bpaf(long("cache-dir"), argument("DIR"))]
    cache_dir: Option<String>,

    /// Disable the schema cache (the schema is still fetched)
    #[bpaf(long("no-cache"), switch)]
    no_cache: bool,

    /// Treat NAME as an existing class/interface (repeatable); with no
    /// occurrences, every foreign type name is accepted
    #[bpaf(long("known-type"), argument("NAME"))]
    known_types: Vec<String>,

    /// Print each checked file and the schema source
    #[bpaf(short('v'), long("verbose"), switch, fallback(false))]
    verbose: bool,

    /// Component files or directories to validate
    #[bpaf(positional("PATH"))]
    paths: Vec<String>,
}

impl Cli {
    fn mode(&self) -> ValidationMode {
        if self.enforce_schemas {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        }
    }
}

fn build_provider(cli: &Cli) -> SchemaProvider {
    let provider = SchemaProvider::new(
        Arc::new(ReqwestTransport::new()),
        Arc::new(ReqwestTransport::no_proxy()),
    );
    if cli.no_cache {
        provider.without_cache()
    } else if let Some(dir) = &cli.cache_dir {
        provider.with_cache_path(Path::new(dir).join("metadata.schema.json"))
    } else {
        provider
    }
}

fn build_registry(cli: &Cli) -> Box<dyn TypeRegistry> {
    if cli.known_types.is_empty() {
        Box::new(AllowAll)
    } else {
        Box::new(AllowList::new(cli.known_types.iter().cloned()))
    }
}

/// Verbose line for a checked file, tagged with the schema source.
fn format_checked_verbose(report: &FileReport) -> String {
    match report.schema_source {
        Some(SchemaSource::Local) => format!("  {} [local schema]", report.path),
        Some(SchemaSource::Cache) => format!("  {} [cached schema]", report.path),
        Some(SchemaSource::Remote) => format!("  {} [fetched schema]", report.path),
        None => format!("  {} [structural only]", report.path),
    }
}

/// Run the validation batch: one line per diagnostic, then a summary
/// banner with timing.
async fn run(cli: &Cli) -> anyhow::Result<bool> {
    let provider = build_provider(cli);
    let registry = build_registry(cli);
    let args = validate::ValidateArgs {
        paths: cli.paths.clone(),
        exclude: cli.exclude.clone(),
        mode: cli.mode(),
    };

    let verbose = cli.verbose;
    let start = Instant::now();
    let result = validate::run_with(&args, &provider, registry.as_ref(), |report| {
        if verbose {
            eprintln!("{}", format_checked_verbose(report));
        }
    })
    .await?;

    for report in &result.reports {
        for message in &report.diagnostics {
            eprintln!("error: {}: {message}", report.path);
        }
    }

    let ms = start.elapsed().as_millis();
    let n = result.files_checked();
    let failed = result.files_with_errors();
    if failed > 0 {
        eprintln!("Checked {n} files in {ms}ms. {failed} file(s) with errors.");
    } else {
        eprintln!("Checked {n} files in {ms}ms. No errors.");
    }

    Ok(result.has_errors())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = cli().run();

    if cli.paths.is_empty() {
        eprintln!("usage: corbel [--enforce-schemas] <PATH>...");
        eprintln!("run `corbel --help` for the full option list");
        return ExitCode::from(1);
    }

    match run(&cli).await {
        Ok(had_errors) => {
            if had_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
