use std::io::{self, Write};

use serde::Serialize;
use termcolor::{ColorSpec, WriteColor};

use crate::extractor::{extract, Extraction};
use crate::mode::{Mode, OutputFormat};
use crate::references::References;

/// Extraction result for one input line.
#[derive(Debug, Clone)]
pub struct StatementResult {
    /// 1-based line number within its input.
    pub line: usize,
    pub statement: String,
    pub extraction: Extraction,
}

impl StatementResult {
    pub fn new(line: usize, statement: String) -> Self {
        let extraction = extract(&statement);
        Self {
            line,
            statement,
            extraction,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.extraction.is_complete()
    }
}

/// All statements read from one input (a file or stdin).
#[derive(Debug, Clone)]
pub struct InputResult {
    pub input: String,
    pub statements: Vec<StatementResult>,
    /// Set when the input could not be read.
    pub error: Option<String>,
}

impl InputResult {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            statements: Vec::new(),
            error: None,
        }
    }
}

/// Aggregated results of a run.
#[derive(Debug, Default)]
pub struct Report {
    pub results: Vec<InputResult>,
}

impl Report {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
        }
    }

    pub fn add(&mut self, result: InputResult) {
        self.results.push(result);
    }

    pub fn statements(&self) -> usize {
        self.results.iter().map(|r| r.statements.len()).sum()
    }

    /// Statements whose scan stopped early.
    pub fn aborted(&self) -> usize {
        self.results
            .iter()
            .flat_map(|r| &r.statements)
            .filter(|s| !s.is_complete())
            .count()
    }

    pub fn errors(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }

    pub fn has_aborts(&self) -> bool {
        self.aborted() > 0
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }

    /// Generate a summary string.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("{} statement(s) processed", self.statements()));
        if self.aborted() > 0 {
            parts.push(format!("{} stopped early", self.aborted()));
        }
        if self.errors() > 0 {
            parts.push(format!("{} unreadable input(s)", self.errors()));
        }
        parts.join(", ")
    }

    /// Write every statement in input order.
    pub fn write<W: WriteColor>(&self, out: &mut W, mode: &Mode) -> io::Result<()> {
        for input in &self.results {
            for statement in &input.statements {
                write_statement(out, &input.input, statement, mode)?;
            }
        }
        Ok(())
    }

    /// Print input read errors.
    pub fn print_errors(&self) {
        for result in &self.results {
            if let Some(ref error) = result.error {
                eprintln!("error: {}: {}", result.input, error);
            }
        }
    }
}

/// Write one statement's result in the configured format.
pub fn write_statement<W: WriteColor>(
    out: &mut W,
    input: &str,
    result: &StatementResult,
    mode: &Mode,
) -> io::Result<()> {
    match mode.format {
        OutputFormat::Text => write_text(out, result, mode)?,
        OutputFormat::Json => write_json(out, input, result)?,
    }
    if mode.verbose {
        print_abort(input, result);
    }
    Ok(())
}

/// Abort reasons go to stderr, never into the result stream.
fn print_abort(input: &str, result: &StatementResult) {
    if let Some(ref err) = result.extraction.error {
        eprintln!("{}: Stopped early at line {}: {}", input, result.line, err);
    }
}

fn write_text<W: WriteColor>(out: &mut W, result: &StatementResult, mode: &Mode) -> io::Result<()> {
    let refs = &result.extraction.references;

    if !mode.quiet {
        out.set_color(ColorSpec::new().set_bold(true))?;
        write!(out, "Parsing query:")?;
        out.reset()?;
        writeln!(out, " {}\n", result.statement)?;
    }

    write!(out, "Table name list: ")?;
    write_bracketed(out, refs.tables())?;
    write!(out, "Table_name with col_name: ")?;
    write_bracketed(out, refs.table_columns())?;
    writeln!(out)
}

fn write_bracketed<'a, W: Write>(
    out: &mut W,
    items: impl Iterator<Item = &'a str>,
) -> io::Result<()> {
    for item in items {
        write!(out, "[{}] ", item)?;
    }
    writeln!(out)
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    input: &'a str,
    line: usize,
    statement: &'a str,
    #[serde(flatten)]
    references: &'a References,
    complete: bool,
    error: Option<JsonError>,
}

#[derive(Serialize)]
struct JsonError {
    kind: &'static str,
    position: usize,
    message: String,
}

fn write_json<W: Write>(out: &mut W, input: &str, result: &StatementResult) -> io::Result<()> {
    let record = JsonRecord {
        input,
        line: result.line,
        statement: &result.statement,
        references: &result.extraction.references,
        complete: result.is_complete(),
        error: result.extraction.error.as_ref().map(|err| JsonError {
            kind: err.kind(),
            position: err.position(),
            message: err.to_string(),
        }),
    };
    serde_json::to_writer(&mut *out, &record)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;

    fn render(result: &StatementResult, mode: &Mode) -> String {
        let mut buf = Buffer::no_color();
        write_statement(&mut buf, "-", result, mode).unwrap();
        String::from_utf8(buf.into_inner()).unwrap()
    }

    #[test]
    fn test_text_output() {
        let result = StatementResult::new(1, "select * from t1,t2 where t1.x>t2.y".to_string());
        let text = render(&result, &Mode::default());
        assert_eq!(
            text,
            "Parsing query: select * from t1,t2 where t1.x>t2.y\n\n\
             Table name list: [t1] [t2] \n\
             Table_name with col_name: [t1.x] [t2.y] \n\n"
        );
    }

    #[test]
    fn test_quiet_text_output() {
        let result = StatementResult::new(1, "select a from emp where emp.id = 1".to_string());
        let mode = Mode {
            quiet: true,
            ..Mode::default()
        };
        assert_eq!(
            render(&result, &mode),
            "Table name list: [emp] \nTable_name with col_name: [emp.id] \n\n"
        );
    }

    #[test]
    fn test_verbose_abort_stays_out_of_results() {
        let result = StatementResult::new(3, "select * from emp as where x = 1".to_string());
        let mode = Mode {
            verbose: true,
            quiet: true,
            ..Mode::default()
        };
        assert_eq!(
            render(&result, &mode),
            "Table name list: \nTable_name with col_name: \n\n"
        );
    }

    #[test]
    fn test_json_output() {
        let result = StatementResult::new(2, "select * from emp where emp.id = 1".to_string());
        let mode = Mode {
            format: OutputFormat::Json,
            ..Mode::default()
        };
        let line = render(&result, &mode);
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["line"], 2);
        assert_eq!(value["tables"], serde_json::json!(["emp"]));
        assert_eq!(value["table_columns"], serde_json::json!(["emp.id"]));
        assert_eq!(value["complete"], true);
        assert!(value["error"].is_null());
    }

    #[test]
    fn test_json_output_with_error() {
        let result = StatementResult::new(1, "select * from t where t. = 1".to_string());
        let mode = Mode {
            format: OutputFormat::Json,
            ..Mode::default()
        };
        let value: serde_json::Value = serde_json::from_str(render(&result, &mode).trim()).unwrap();
        assert_eq!(value["complete"], false);
        assert_eq!(value["error"]["kind"], "malformed_composite");
    }

    #[test]
    fn test_report_summary() {
        let mut input = InputResult::new("queries.sql");
        input
            .statements
            .push(StatementResult::new(1, "select * from t where t.a = 1".to_string()));
        input
            .statements
            .push(StatementResult::new(2, "select * from t as where".to_string()));
        let mut unreadable = InputResult::new("missing.sql");
        unreadable.error = Some("not found".to_string());

        let mut report = Report::new();
        report.add(input);
        report.add(unreadable);

        assert_eq!(report.statements(), 2);
        assert_eq!(report.aborted(), 1);
        assert!(report.has_aborts());
        assert!(report.has_errors());
        assert_eq!(
            report.summary(),
            "2 statement(s) processed, 1 stopped early, 1 unreadable input(s)"
        );
    }
}
