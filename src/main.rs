use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use termcolor::{ColorChoice, StandardStream};

use sqlrefs::mode::{Mode, OutputFormat};
use sqlrefs::report::Report;

/// sqlrefs - list the tables and table.column pairs a SQL statement touches.
/// Each non-blank input line is treated as one statement.
#[derive(Parser, Debug)]
#[command(name = "sqlrefs", version, about)]
struct Cli {
    /// Files or directories to read. Reads stdin when empty or "-".
    files: Vec<PathBuf>,

    /// Output format.
    #[arg(short = 'f', long, value_enum)]
    format: Option<OutputFormat>,

    /// Exit with status 1 if any statement could not be fully scanned.
    #[arg(long)]
    strict: bool,

    /// Glob patterns to exclude.
    #[arg(long)]
    exclude: Vec<String>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Do not echo statements, print results only.
    #[arg(short, long)]
    quiet: bool,

    /// Force color output.
    #[arg(long)]
    force_color: bool,

    /// Disable color output.
    #[arg(long)]
    no_color: bool,

    /// Number of threads for parallel processing (0 = all cores).
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Disable multi-threaded processing.
    #[arg(long)]
    single_process: bool,

    /// Path to config file (sqlrefs.toml or pyproject.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let is_stdin =
        cli.files.is_empty() || (cli.files.len() == 1 && cli.files[0].as_os_str() == "-");

    let base_mode = match sqlrefs::load_config(&cli.files, cli.config.as_deref()) {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    let mode = Mode {
        format: cli.format.unwrap_or(base_mode.format),
        strict: cli.strict || base_mode.strict,
        exclude: if cli.exclude.is_empty() {
            base_mode.exclude
        } else {
            cli.exclude
        },
        verbose: cli.verbose,
        quiet: cli.quiet || base_mode.quiet,
        no_color: cli.no_color,
        force_color: cli.force_color,
        threads: cli.threads.unwrap_or(base_mode.threads),
        single_process: cli.single_process,
    };

    // termcolor's Auto does not look at whether stdout is a terminal.
    let choice = if mode.force_color {
        ColorChoice::Always
    } else if !mode.color() || !io::stdout().is_terminal() {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let mut out = StandardStream::stdout(choice);

    let report = if is_stdin {
        match sqlrefs::api::stream(io::stdin().lock(), &mut out, "-", &mode) {
            Ok(result) => {
                let mut report = Report::new();
                report.add(result);
                report
            }
            Err(e) => {
                eprintln!("Error reading stdin: {}", e);
                std::process::exit(2);
            }
        }
    } else {
        let report = sqlrefs::run(&cli.files, &mode);
        if let Err(e) = report.write(&mut out, &mode) {
            eprintln!("Error writing output: {}", e);
            std::process::exit(2);
        }
        report
    };

    if mode.verbose {
        eprintln!("{}", report.summary());
    }
    report.print_errors();

    if report.has_errors() {
        std::process::exit(2);
    } else if mode.strict && report.has_aborts() {
        std::process::exit(1);
    }
}
