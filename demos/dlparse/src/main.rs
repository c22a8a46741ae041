use std::{
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
};

use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use clap::Parser;
use dlcore::prelude::*;
use dlformal::prelude::*;
use log::info;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Turn dependency-parsed sentences (one JSON record per line) into logical forms.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON-lines file of sentences; reads stdin when omitted
    input: Option<PathBuf>,

    /// Directory holding the type, rule and priority files (defaults to the bundled copies)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Reify links between entities as events
    #[arg(short, long, default_value_t = false)]
    expand_events: bool,

    /// Type comparator: flexible or strict
    #[arg(long, default_value_t = ComparatorChoice::Flexible)]
    comparator: ComparatorChoice,

    /// Color the output
    #[arg(short, long, default_value_t = false)]
    color: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let builder = SemanticResources::builder().comparator(args.comparator);
    let loaded = match &args.data_dir {
        Some(dir) => builder.load_from_dir(dir),
        None => builder.bundled(),
    };
    let resources = match loaded {
        Ok(resources) => resources,
        Err(error) => {
            report_configuration_error(&error);
            std::process::exit(2);
        }
    };
    let pipeline = match Pipeline::new(&resources, args.expand_events) {
        Ok(pipeline) => pipeline,
        Err(error) => {
            report_configuration_error(&error);
            std::process::exit(2);
        }
    };

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => match std::fs::File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(error) => {
                eprintln!("Cannot open '{}': {}", path.display(), error);
                std::process::exit(1);
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };
    let label = args
        .input
        .as_ref()
        .map_or_else(|| "<stdin>".to_string(), |path| path.display().to_string());

    let choice = if args.color {
        ColorChoice::Always
    } else {
        ColorChoice::Never
    };
    let stdout = StandardStream::stdout(choice);
    let mut stdout = stdout.lock();

    let (mut processed, mut failed) = (0usize, 0usize);
    for (number, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                eprintln!("Cannot read '{label}': {error}");
                std::process::exit(1);
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let result = Sentence::from_json(&line).and_then(|sentence| pipeline.process(&sentence));
        let written = match result {
            Ok(semantics) => {
                processed += 1;
                write_semantics(&mut stdout, &semantics)
            }
            Err(DlError::Json(error)) => {
                failed += 1;
                report_json_error(&label, number + 1, &line, &error);
                Ok(())
            }
            Err(error) => {
                failed += 1;
                write_failure(&mut stdout, number + 1, &error)
            }
        };
        if let Err(error) = written {
            eprintln!("Cannot write output: {error}");
            std::process::exit(1);
        }
    }

    info!("Processed {processed} sentence(s), {failed} failed");
    if failed > 0 && processed == 0 {
        std::process::exit(1);
    }
}

fn write_semantics<W: WriteColor + Write>(
    out: &mut W,
    semantics: &SentenceSemantics,
) -> io::Result<()> {
    let mut heading = ColorSpec::new();
    heading.set_bold(true);
    let mut dim = ColorSpec::new();
    dim.set_fg(Some(Color::Cyan));

    out.set_color(&heading)?;
    writeln!(out, "{}", semantics.text)?;
    out.set_color(&dim)?;
    writeln!(out, "  tree: {}", semantics.tree)?;
    writeln!(out, "  plan: {}", semantics.plan)?;
    out.reset()?;
    for expression in &semantics.composition.expressions {
        write!(out, "  ")?;
        expression.pretty_render_to(out)?;
        writeln!(out)?;
    }
    writeln!(out)
}

fn write_failure<W: WriteColor + Write>(
    out: &mut W,
    line: usize,
    error: &DlError,
) -> io::Result<()> {
    let mut color = ColorSpec::new();
    color.set_fg(Some(Color::Red)).set_intense(true);
    out.set_color(&color)?;
    writeln!(out, "line {line}: {error}")?;
    out.reset()?;
    writeln!(out)
}

/// Point at the offending column of a sentence record.
fn report_json_error(label: &str, line: usize, record: &str, error: &serde_json::Error) {
    let offset = record
        .lines()
        .take(error.line().saturating_sub(1))
        .map(|previous| previous.len() + 1)
        .sum::<usize>()
        + error.column().saturating_sub(1);
    let offset = offset.min(record.len());
    let file = format!("{label}:{line}");
    let span = (file.clone(), offset..offset);

    let mut colors = ColorGenerator::new();
    let printed = Report::build(ReportKind::Error, span.clone())
        .with_message("Malformed sentence record")
        .with_label(
            Label::new(span)
                .with_message(error.to_string())
                .with_color(colors.next()),
        )
        .finish()
        .eprint((file, Source::from(record)));
    if printed.is_err() {
        eprintln!("{label}:{line}: {error}");
    }
}

/// Resource errors stop the run. Parse errors in files on disk are shown in context.
fn report_configuration_error(error: &DlError) {
    if let DlError::TomlParse { file, source } = error
        && let Some(range) = source.span()
        && let Ok(text) = std::fs::read_to_string(file)
    {
        let span = (file.clone(), range);
        let mut colors = ColorGenerator::new();
        let printed = Report::build(ReportKind::Error, span.clone())
            .with_message(format!("Cannot load '{file}'"))
            .with_label(
                Label::new(span)
                    .with_message(source.message())
                    .with_color(colors.next()),
            )
            .finish()
            .eprint((file.clone(), Source::from(text)));
        if printed.is_ok() {
            return;
        }
    }
    eprintln!("Configuration error: {error}");
}
