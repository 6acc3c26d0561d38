use anyhow::Context;
use arbor_config::ArborConfig;
use arbor_import::{ImportBatch, ImportError, build_batch, parse_json_batch, read_table};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ImportArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ImportResponse {
    topic: String,
    nodes: usize,
    dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    replaced: Option<u64>,
    warnings: Vec<String>,
}

/// Handle `arb import`.
pub async fn handle(args: &ImportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let batch = load_batch(args, &ctx.config)?;
    for warning in &batch.warnings {
        tracing::warn!(topic = %batch.topic, "{warning}");
    }

    let replaced = if args.dry_run {
        None
    } else {
        let report = ctx
            .service
            .replace_topic(&batch.topic, &batch.nodes)
            .await
            .with_context(|| format!("topic '{}' was left unchanged", batch.topic))?;
        Some(report.deleted)
    };

    output(
        &ImportResponse {
            nodes: batch.nodes.len(),
            warnings: batch.warnings.iter().map(ToString::to_string).collect(),
            topic: batch.topic,
            dry_run: args.dry_run,
            replaced,
        },
        flags.format,
    )
}

/// Read and validate the input file without touching the store.
fn load_batch(args: &ImportArgs, config: &ArborConfig) -> anyhow::Result<ImportBatch> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let parsed = if args.json {
        let text = String::from_utf8(bytes)
            .with_context(|| format!("{} is not valid UTF-8", args.file.display()))?;
        parse_json_batch(&args.topic, &text)
    } else {
        let delimiter = match args.delimiter {
            Some(delimiter) => Some(delimiter),
            None => config.import.delimiter_byte()?,
        };
        read_table(&bytes, delimiter).and_then(|table| build_batch(&args.topic, &table))
    };

    parsed.map_err(|error| describe(error, args))
}

fn describe(error: ImportError, args: &ImportArgs) -> anyhow::Error {
    let file = args.file.display();
    if let ImportError::InvalidRows { errors, .. } = &error {
        let rows = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return anyhow::anyhow!("{error} in {file}: {rows}");
    }
    anyhow::Error::new(error).context(format!("failed to import {file}"))
}
