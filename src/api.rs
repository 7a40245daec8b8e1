use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use termcolor::WriteColor;

use crate::mode::Mode;
use crate::report::{write_statement, InputResult, Report, StatementResult};

/// Read statements from `reader`, one per line, skipping blank lines.
pub fn read_statements<R: BufRead>(reader: R) -> io::Result<Vec<StatementResult>> {
    let mut statements = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        statements.push(StatementResult::new(idx + 1, line));
    }
    Ok(statements)
}

/// Process `reader` line by line, writing each result as soon as its
/// statement is scanned. Used for stdin, where input may be interactive.
pub fn stream<R: BufRead, W: WriteColor>(
    reader: R,
    out: &mut W,
    input: &str,
    mode: &Mode,
) -> io::Result<InputResult> {
    let mut result = InputResult::new(input);
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let statement = StatementResult::new(idx + 1, line);
        write_statement(out, input, &statement, mode)?;
        out.flush()?;
        result.statements.push(statement);
    }
    Ok(result)
}

/// Extract references from every statement in the given files and
/// directories.
pub fn run(inputs: &[PathBuf], mode: &Mode) -> Report {
    let mut paths = get_matching_paths(inputs, mode);
    // Named files that are missing still get reported.
    for input in inputs {
        if !input.exists() && !paths.contains(input) {
            paths.push(input.clone());
        }
    }
    let mut report = Report::new();

    if mode.single_process || paths.len() <= 1 {
        for path in &paths {
            report.add(process_file(path));
        }
    } else {
        use rayon::prelude::*;

        let results: Vec<InputResult> = match rayon::ThreadPoolBuilder::new()
            .num_threads(mode.threads)
            .build()
        {
            Ok(pool) => pool.install(|| paths.par_iter().map(|p| process_file(p)).collect()),
            Err(e) => {
                log::warn!("falling back to a single thread: {}", e);
                paths.iter().map(|p| process_file(p)).collect()
            }
        };
        for result in results {
            report.add(result);
        }
    }

    report
}

/// Process a single file.
fn process_file(path: &Path) -> InputResult {
    let mut result = InputResult::new(path.display().to_string());
    let statements = File::open(path).and_then(|file| read_statements(BufReader::new(file)));
    match statements {
        Ok(statements) => {
            log::debug!("{}: {} statement(s)", path.display(), statements.len());
            result.statements = statements;
        }
        Err(e) => result.error = Some(format!("Read error: {}", e)),
    }
    result
}

/// Get all SQL file paths that match the given inputs.
pub fn get_matching_paths(paths: &[PathBuf], mode: &Mode) -> Vec<PathBuf> {
    let extensions = mode.sql_extensions();
    let mut result = HashSet::new();

    for path in paths {
        if path.is_file() {
            // Explicitly named files are taken whatever their extension.
            result.insert(path.clone());
        } else if path.is_dir() {
            collect_sql_files(path, extensions, &mode.exclude, &mut result);
        }
    }

    let mut sorted: Vec<PathBuf> = result.into_iter().collect();
    sorted.sort();
    sorted
}

/// Check if a file has a SQL extension.
fn is_sql_file(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Recursively collect SQL files from a directory.
fn collect_sql_files(
    dir: &Path,
    extensions: &[&str],
    exclude: &[String],
    result: &mut HashSet<PathBuf>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            log::warn!("cannot read {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Skip hidden directories and excluded patterns
        if name.starts_with('.') {
            continue;
        }
        if exclude.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| p.matches(&name))
                .unwrap_or(false)
        }) {
            continue;
        }

        if path.is_dir() {
            collect_sql_files(&path, extensions, exclude, result);
        } else if is_sql_file(&path, extensions) {
            result.insert(path);
        }
    }
}
