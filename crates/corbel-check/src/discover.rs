use std::path::{Path, PathBuf};

/// Whether a path follows the component metadata naming convention.
pub fn is_component_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| {
            name.ends_with(".component.yml") || name.ends_with(".component.yaml")
        })
}

/// Walk `root` respecting `.gitignore`, returning component metadata files.
///
/// Applies `excludes` glob patterns to filter results.
pub fn discover_files(root: &Path, excludes: &[String]) -> Result<Vec<PathBuf>, anyhow::Error> {
    let walker = ignore::WalkBuilder::new(root)
        .hidden(false) // component dirs inside hidden trees still count
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if !is_component_file(path) {
            continue;
        }
        if is_excluded(path, excludes) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

pub fn is_excluded(path: &Path, excludes: &[String]) -> bool {
    let path_str = match path.to_str() {
        Some(s) => s.strip_prefix("./").unwrap_or(s),
        None => return false,
    };
    excludes
        .iter()
        .any(|pattern| glob_match::glob_match(pattern, path_str))
}
