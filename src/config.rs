use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::SqlrefsError;
use crate::mode::{Mode, OutputFormat};

/// Load sqlrefs configuration for the given inputs.
/// Searches parent directories for sqlrefs.toml or pyproject.toml if no
/// config path is given.
pub fn load_config(inputs: &[PathBuf], config_path: Option<&Path>) -> Result<Mode, SqlrefsError> {
    let mut mode = Mode::default();

    let config_file = match config_path {
        Some(path) => {
            if path.exists() {
                Some(path.to_path_buf())
            } else {
                return Err(SqlrefsError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        }
        None => find_config_file(inputs),
    };

    if let Some(path) = config_file {
        log::debug!("using config {}", path.display());
        let raw = load_config_from_path(&path)?;
        apply_config(&mut mode, &raw)?;
    }

    Ok(mode)
}

/// Search the inputs' parent directories for a config file, nearest first.
/// Reading from stdin searches from the working directory.
fn find_config_file(inputs: &[PathBuf]) -> Option<PathBuf> {
    let cwd = [PathBuf::from(".")];
    let roots = if inputs.iter().all(|p| p.as_os_str() == "-") {
        &cwd[..]
    } else {
        inputs
    };

    for parent in get_common_parents(roots) {
        let config = parent.join("sqlrefs.toml");
        if config.exists() {
            return Some(config);
        }
        let config = parent.join("pyproject.toml");
        if config.exists() {
            return Some(config);
        }
    }
    None
}

/// Parent directories of the given paths, ordered from most specific to
/// least specific.
fn get_common_parents(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut parents = Vec::new();

    for path in paths {
        let start = if path.is_dir() {
            path.clone()
        } else {
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        };
        let start = start.canonicalize().unwrap_or(start);

        let mut current = Some(start.as_path());
        while let Some(dir) = current {
            let dir_buf = dir.to_path_buf();
            if !parents.contains(&dir_buf) {
                parents.push(dir_buf);
            }
            current = dir.parent();
        }
    }

    parents
}

/// Load and parse a TOML config file.
fn load_config_from_path(path: &Path) -> Result<HashMap<String, toml::Value>, SqlrefsError> {
    let content = std::fs::read_to_string(path)?;
    let parsed: toml::Value = content
        .parse()
        .map_err(|e| SqlrefsError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    // [tool.sqlrefs] in pyproject.toml, top-level keys in sqlrefs.toml
    let section = parsed
        .get("tool")
        .and_then(|t| t.get("sqlrefs"))
        .or_else(|| {
            if path
                .file_name()
                .map(|n| n == "sqlrefs.toml")
                .unwrap_or(false)
            {
                Some(&parsed)
            } else {
                None
            }
        });

    match section {
        Some(toml::Value::Table(table)) => Ok(table
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.clone()))
            .collect()),
        _ => Ok(HashMap::new()),
    }
}

/// Apply configuration values to a Mode.
fn apply_config(
    mode: &mut Mode,
    config: &HashMap<String, toml::Value>,
) -> Result<(), SqlrefsError> {
    if let Some(toml::Value::String(name)) = config.get("format") {
        mode.format = OutputFormat::from_name(name)?;
    }

    if let Some(toml::Value::Boolean(b)) = config.get("strict") {
        mode.strict = *b;
    }

    if let Some(toml::Value::Boolean(b)) = config.get("quiet") {
        mode.quiet = *b;
    }

    if let Some(toml::Value::Array(arr)) = config.get("exclude") {
        mode.exclude = arr
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();
    }

    if let Some(toml::Value::Integer(n)) = config.get("threads") {
        mode.threads = usize::try_from(*n)
            .map_err(|_| SqlrefsError::Config(format!("Invalid thread count: {}", n)))?;
    }

    // Validate no unknown keys
    let known_keys = ["format", "strict", "quiet", "exclude", "threads"];
    for key in config.keys() {
        if !known_keys.contains(&key.as_str()) {
            return Err(SqlrefsError::Config(format!(
                "Unknown config option: {}",
                key
            )));
        }
    }

    Ok(())
}
