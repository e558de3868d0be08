use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use elastiquery::logging::{self, Verbosity};
use elastiquery::query::{parse_time, query_opts_from_flags};
use elastiquery::{
    BoolOp, Client, QueryOptions, QuerySpec, Stage, build_queries, compose, get_server_version,
    time_range_query, with_deadline,
};
use std::io::{self, Write};
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

const MAX_TIMEOUT_SECS: u64 = 86_400;

#[derive(Debug, Parser)]
#[command(
    name = "elastiquery",
    version,
    about = "Query Elasticsearch 2.x and 6.x servers from the command line",
    long_about = None
)]
struct Cli {
    /// Elasticsearch server URL
    #[arg(long = "es-url", env = "ES_URL")]
    es_url: String,

    /// Elasticsearch index
    #[arg(long, env = "ES_INDEX")]
    index: String,

    /// Timeout in seconds for the version probe and for the query (1 to 86400)
    #[arg(
        long,
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS)
    )]
    timeout: u64,

    /// Number of results to skip
    #[arg(long, default_value = "0")]
    offset: usize,

    /// Number of results to return (0 uses the default of 500)
    #[arg(long, default_value = "0")]
    limit: usize,

    /// Field name to sort results by (default: the time field)
    #[arg(long = "sort-by")]
    sort_by: Option<String>,

    /// Sort in reverse order
    #[arg(long)]
    reverse: bool,

    /// Require only one of the given queries to match, rather than all of them
    #[arg(long)]
    or: bool,

    /// Raw Elasticsearch JSON query
    #[arg(long)]
    raw: Option<String>,

    /// Semicolon-separated term queries in the form field=term
    #[arg(long)]
    terms: Option<String>,

    /// Semicolon-separated prefix queries in the form field=prefix
    #[arg(long)]
    prefixes: Option<String>,

    /// Semicolon-separated range queries in the form field=from~to
    #[arg(long)]
    ranges: Option<String>,

    /// Field name for record timestamps
    #[arg(long = "time-field", default_value = "@timestamp")]
    time_field: String,

    /// Start time for search, in RFC3339 format
    #[arg(long = "time-start")]
    time_start: Option<String>,

    /// End time for search, in RFC3339 format
    #[arg(long = "time-end")]
    time_end: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Only log warnings and errors. The documents are still written
    #[arg(short, long)]
    quiet: bool,

    /// Log requests and responses
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    #[value(name = "jsonl")]
    JsonL,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_tracing(Verbosity::from_flags(cli.quiet, cli.verbose));

    let timeout = Duration::from_secs(cli.timeout);

    let version = with_deadline(
        Stage::Probe,
        Instant::now() + timeout,
        get_server_version(&cli.es_url),
    )
    .await
    .context("Could not determine server version")?;
    info!("Server version is {version}");

    let client = Client::for_version(&version, &cli.es_url)
        .with_context(|| format!("Could not create client for server version {version}"))?;

    let spec = QuerySpec {
        raw: cli.raw.clone(),
        terms: cli.terms.clone(),
        prefixes: cli.prefixes.clone(),
        ranges: cli.ranges.clone(),
    };
    let queries = build_queries(&client, &spec)?;

    let time_from = cli.time_start.as_deref().map(parse_time).transpose()?;
    let time_to = cli.time_end.as_deref().map(parse_time).transpose()?;
    let time_range = time_range_query(&client, &cli.time_field, time_from, time_to);

    let op = if cli.or { BoolOp::Or } else { BoolOp::And };
    let query = compose(&client, queries, op, time_range)?;

    let options = QueryOptions::with_default_sort(cli.time_field.as_str()).apply(
        query_opts_from_flags(cli.offset, cli.limit, cli.sort_by.as_deref(), cli.reverse),
    );

    let result = query
        .execute(&cli.index, &options, Instant::now() + timeout)
        .await
        .context("Query failed")?;

    if result.is_empty() {
        bail!("Query returned no results");
    }
    info!(
        "Showing {} of {} matching documents",
        result.raw_hits().len(),
        result.total_hits()
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match cli.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut handle, result.raw_hits())?;
            writeln!(&mut handle)?;
        }
        OutputFormat::JsonL => {
            for document in result.raw_hits() {
                serde_json::to_writer(&mut handle, document)?;
                writeln!(&mut handle)?;
            }
            // Write metadata as last line
            let metadata = serde_json::json!({
                "_metadata": {
                    "total_hits": result.total_hits(),
                    "returned_count": result.raw_hits().len()
                }
            });
            serde_json::to_writer(&mut handle, &metadata)?;
            writeln!(&mut handle)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(extra: &[&str]) -> Result<Cli, clap::Error> {
        let mut args = vec!["elastiquery", "--es-url", "http://localhost:9200", "--index", "logs"];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args)
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_values() {
        assert!(matches!(parse(&[]).unwrap().format, OutputFormat::Json));
        assert!(matches!(
            parse(&["--format", "json"]).unwrap().format,
            OutputFormat::Json
        ));
        assert!(matches!(
            parse(&["--format", "jsonl"]).unwrap().format,
            OutputFormat::JsonL
        ));
        assert!(matches!(
            parse(&["-f", "jsonl"]).unwrap().format,
            OutputFormat::JsonL
        ));
        assert!(parse(&["--format", "json-l"]).is_err());
    }

    #[test]
    fn test_timeout_bounds() {
        assert_eq!(parse(&[]).unwrap().timeout, 30);
        assert_eq!(parse(&["--timeout", "86400"]).unwrap().timeout, MAX_TIMEOUT_SECS);
        assert!(parse(&["--timeout", "0"]).is_err());
        assert!(parse(&["--timeout", "86401"]).is_err());
        assert!(parse(&["--timeout", &u64::MAX.to_string()]).is_err());
    }
}
