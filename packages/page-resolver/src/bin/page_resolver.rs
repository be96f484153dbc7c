//! Page resolver CLI
//!
//! Prints the site URL (or just the uid) of every selected page. Selection
//! starts from `--pid`, from the uids returned by `--query`, or both, and can
//! be widened to all descendants (`--children`) or narrowed to owning site
//! roots (`--roots`).

use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use page_resolver::dsn::normalize_dsn;
use page_resolver::output::OutputFormat;
use page_resolver::selection::Transform;
use page_resolver::source::MySqlSource;
use page_resolver::{resolve, Config, ResolveRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "page-resolver")]
#[command(about = "Resolve page ids into site URLs")]
struct Cli {
    /// Database connection string (falls back to DATABASE_URL)
    #[arg(long)]
    dsn: Option<String>,

    /// Page ID
    #[arg(long, default_value_t = 0)]
    pid: i64,

    /// A select that yields a list of page IDs in its first column
    #[arg(long)]
    query: Option<String>,

    /// Number of fields selected by --query besides the page uid
    #[arg(long, default_value_t = 0)]
    nfields: usize,

    /// Select children pages
    #[arg(long)]
    children: bool,

    /// Select root pages
    #[arg(long)]
    roots: bool,

    /// Print a comma-separated uid list instead of URLs
    #[arg(long)]
    csv: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries results; logs go to stderr
    let default_filter = if cli.verbose {
        "warn,page_resolver=debug"
    } else {
        "warn,page_resolver=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env()?;

    let dsn = cli
        .dsn
        .filter(|dsn| !dsn.trim().is_empty())
        .or_else(|| config.database_url.clone())
        .context("must have DSN as argument (--dsn or DATABASE_URL)")?;
    let url = normalize_dsn(&dsn)?;

    let source = MySqlSource::connect(&url)
        .await
        .context("mysql error")?
        .with_queries(config.pages_query, config.domains_query);

    let request = ResolveRequest {
        pid: cli.pid,
        query: cli.query,
        nfields: cli.nfields,
        transform: Transform {
            children: cli.children,
            roots: cli.roots,
        },
        format: if cli.csv {
            OutputFormat::IdList
        } else {
            OutputFormat::Urls
        },
        url_scheme: config.url_scheme,
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    resolve(&source, &request, &mut out).await?;
    out.flush().context("Failed to flush output")?;

    Ok(())
}
