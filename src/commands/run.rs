//! Run command handler.
//!
//! Reads records from a file, deduplicates them batch by batch, and writes
//! each route to its own output.

use clap::Args;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use uniqflow::config::UniqflowConfig;
use uniqflow::io::{FileSink, Format, RecordWriter, create_record_writer, read_records};
use uniqflow::models::RunSummary;
use uniqflow::queue::{BatchSupplier, InMemoryQueue};
use uniqflow::services::UniqueProcessor;
use uniqflow::{Error, Result};

/// Path value meaning stdin or stdout.
const STDIO: &str = "-";

/// Arguments for `uniqflow run`.
#[derive(Args)]
pub struct RunArgs {
    /// Input file, or `-` for stdin.
    #[arg(short, long)]
    input: String,

    /// Input format (json, yaml, csv, tsv). Detected from the extension if omitted.
    #[arg(short, long)]
    format: Option<String>,

    /// Output for kept records, or `-` for stdout.
    #[arg(short, long, default_value = STDIO)]
    success: String,

    /// Output for records without a usable key.
    #[arg(long)]
    failure: Option<PathBuf>,

    /// Output for removed duplicates.
    #[arg(long)]
    removed: Option<PathBuf>,

    /// Format for outputs whose extension does not name one.
    #[arg(long)]
    output_format: Option<String>,

    /// Key expression, overriding the configured one.
    #[arg(short, long)]
    key: Option<String>,

    /// Keep the last record of each duplicate group.
    #[arg(long, conflicts_with = "retain_first")]
    retain_last: bool,

    /// Keep the first record of each duplicate group.
    #[arg(long)]
    retain_first: bool,

    /// Records per batch, 0 for all.
    #[arg(short, long)]
    bulk_size: Option<usize>,

    /// Process a single batch and leave the rest unprocessed.
    #[arg(long)]
    once: bool,
}

#[derive(Serialize)]
struct RunReport {
    #[serde(flatten)]
    summary: RunSummary,
    /// Records left queued after `--once`.
    pending: usize,
}

/// Run command.
pub fn cmd_run(config: UniqflowConfig, args: RunArgs) -> Result<()> {
    let mut dedup = config.dedup;
    if let Some(key) = &args.key {
        dedup = dedup.with_unique_key(key.clone());
    }
    if args.retain_last {
        dedup = dedup.with_retain_first(false);
    } else if args.retain_first {
        dedup = dedup.with_retain_first(true);
    }
    if let Some(bulk_size) = args.bulk_size {
        dedup = dedup.with_bulk_size(bulk_size);
    }
    let processor = UniqueProcessor::new(dedup)?;

    let input_format = resolve_input_format(&args)?;
    let records = if args.input == STDIO {
        read_records(io::stdin().lock(), input_format)?
    } else {
        let file = File::open(&args.input).map_err(|e| Error::OperationFailed {
            operation: "open_input".to_string(),
            cause: format!("{}: {e}", args.input),
        })?;
        read_records(BufReader::new(file), input_format)?
    };
    tracing::debug!(count = records.len(), format = %input_format, "Loaded records");

    let output_format = args
        .output_format
        .as_deref()
        .map(str::parse::<Format>)
        .transpose()?
        .unwrap_or(input_format);

    let success = if args.success == STDIO {
        create_record_writer(io::stdout(), output_format)
    } else {
        open_output(Path::new(&args.success), output_format)?
    };
    let mut sink = FileSink::new(success);
    if let Some(path) = &args.failure {
        sink = sink.with_failure(open_output(path, output_format)?);
    }
    if let Some(path) = &args.removed {
        sink = sink.with_removed(open_output(path, output_format)?);
    }

    let mut queue: InMemoryQueue = records.into_iter().collect();
    let summary = if args.once {
        let mut run = RunSummary::default();
        if let Some(batch) = processor.on_trigger(&mut queue, &mut sink)? {
            run.absorb(&batch);
        }
        run
    } else {
        processor.run_until_drained(&mut queue, &mut sink)?
    };
    sink.finish()?;

    let report = RunReport {
        summary,
        pending: queue.pending(),
    };
    if args.success == STDIO {
        tracing::info!(
            batches = report.summary.batches,
            kept = report.summary.kept,
            removed = report.summary.removed,
            errored = report.summary.errored,
            pending = report.pending,
            "Run complete"
        );
    } else {
        let json = serde_json::to_string_pretty(&report).map_err(|e| Error::OperationFailed {
            operation: "serialize_summary".to_string(),
            cause: e.to_string(),
        })?;
        writeln!(io::stdout(), "{json}").map_err(|e| Error::OperationFailed {
            operation: "write_summary".to_string(),
            cause: e.to_string(),
        })?;
    }

    Ok(())
}

fn resolve_input_format(args: &RunArgs) -> Result<Format> {
    match (&args.format, args.input.as_str()) {
        (Some(format), _) => format.parse(),
        (None, STDIO) => Err(Error::InvalidInput(
            "--format is required when reading from stdin".to_string(),
        )),
        (None, path) => Format::from_path(Path::new(path)),
    }
}

/// Creates an output file, using its extension to pick the format when it names one.
fn open_output(path: &Path, fallback: Format) -> Result<Box<dyn RecordWriter>> {
    let format = Format::from_path(path).unwrap_or(fallback);
    let file = File::create(path).map_err(|e| Error::OperationFailed {
        operation: "create_output".to_string(),
        cause: format!("{}: {e}", path.display()),
    })?;
    Ok(create_record_writer(io::BufWriter::new(file), format))
}
