use anyhow::Context;
use bruijn_core::syn::{parse_syntax, print_syntax_to_string};
use bruijn_info::{InfoData, InfoManager};
use bruijn_support::LinePosition;
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Application configuration.
#[derive(clap::Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// The main command to run.
    #[command(subcommand)]
    subcommand: Subcommand,

    /// The global options.
    #[clap(flatten)]
    global: GlobalArgs,
}

/// Global configuration options.
#[derive(clap::Args, Debug)]
struct GlobalArgs {
    /// Log progress.
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    /// Log every evaluation step.
    #[arg(long = "debug", global = true)]
    debug: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Subcommand {
    Norm(NormArgs),
    Info(InfoArgs),
}

/// Normalize every expression in the given files, one per line.
#[derive(clap::Args, Debug)]
struct NormArgs {
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

/// Show the annotations recorded for one line of a file.
#[derive(clap::Args, Debug)]
struct InfoArgs {
    #[arg()]
    file: PathBuf,

    /// The 1-based line to display.
    #[arg(long = "line")]
    line: usize,
}

fn init_logging(global: &GlobalArgs) -> anyhow::Result<()> {
    let level = if global.debug {
        Level::TRACE
    } else if global.verbose {
        Level::INFO
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = init_logging(&args.global) {
        eprintln!("warning: logging disabled: {err}");
    }
    let result = match &args.subcommand {
        Subcommand::Norm(norm_args) => cmd_norm(norm_args),
        Subcommand::Info(info_args) => cmd_info(info_args),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_norm(args: &NormArgs) -> anyhow::Result<bool> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut ok = true;
    for file in &args.files {
        info!(file = %file.display(), "normalizing");
        let contents = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let failures = norm_source(&contents, &mut out)?;
        if failures > 0 {
            warn!(file = %file.display(), failures, "some lines failed");
            ok = false;
        }
    }
    Ok(ok)
}

fn cmd_info(args: &InfoArgs) -> anyhow::Result<bool> {
    let contents = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let manager = collect_info(&contents);
    info!(records = manager.len(), "collected info");
    let stdout = io::stdout();
    manager.display(args.line, &mut stdout.lock())?;
    Ok(true)
}

/// The lines of `contents` that hold an expression, numbered from 1. Blank
/// lines and `//` comment lines are skipped.
fn source_lines(contents: &str) -> impl Iterator<Item = (usize, &str)> {
    contents
        .lines()
        .enumerate()
        .map(|(i, text)| (i + 1, text))
        .filter(|(_, text)| {
            let text = text.trim();
            !text.is_empty() && !text.starts_with("//")
        })
}

/// Parse and normalize one expression, returning its printed normal form.
fn normalize_text(text: &str) -> anyhow::Result<String> {
    let term = parse_syntax(text).context("parse error")?;
    let normal = bruijn_core::normalize(&term).context("normalization failed")?;
    Ok(print_syntax_to_string(&normal))
}

/// Normalize each expression in `contents`, writing `line: result` to
/// `out`. Returns the number of lines that failed.
fn norm_source<W: Write>(contents: &str, out: &mut W) -> io::Result<usize> {
    let mut failures = 0;
    for (line, text) in source_lines(contents) {
        match normalize_text(text) {
            Ok(normal) => writeln!(out, "{line}: {normal}")?,
            Err(err) => {
                failures += 1;
                writeln!(out, "{line}: error: {err:#}")?;
            }
        }
    }
    Ok(failures)
}

/// Normalize every line of `contents` on its own thread, recording the
/// normal form of each as a type annotation at its first non-blank column.
/// A line that parses but fails to normalize is recorded as written, as a
/// synthesized annotation. Lines that do not parse record nothing.
fn collect_info(contents: &str) -> InfoManager {
    let manager = InfoManager::new();
    thread::scope(|s| {
        for (line, text) in source_lines(contents) {
            let manager = &manager;
            s.spawn(move || {
                let position = LinePosition::first_non_blank(line, text);
                let term = match parse_syntax(text) {
                    Ok(term) => term,
                    Err(err) => {
                        warn!(line, %err, "skipping line");
                        return;
                    }
                };
                let info = match bruijn_core::normalize(&term) {
                    Ok(normal) => InfoData::type_info(position, &normal),
                    Err(err) => {
                        warn!(line, %err, "normalization failed");
                        InfoData::synth_info(position, &term)
                    }
                };
                manager.add(info);
            });
        }
    });
    manager
}
