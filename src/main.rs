use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use log::debug;
use snapfinder::{
    catalog::SnapshotCatalog,
    cdx::{CdxClient, CdxOptions},
    server::{self, AppState},
    types::{FilterCriteria, SortMode},
};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Wayback Machine snapshot finder", long_about = None)]
struct Args {
    /// Page address to look up in the archive
    url: Option<String>,
    /// Filter by recorded HTTP status code
    #[arg(long)]
    status: Option<String>,
    /// Filter by capture year
    #[arg(long)]
    year: Option<String>,
    /// Case-insensitive substring match against the archived address
    #[arg(short = 'q', long)]
    query: Option<String>,
    /// Sort order: newest, oldest or status
    #[arg(short = 's', long, default_value = "newest")]
    sort: SortMode,
    /// Run the HTTP server instead of a one-shot search
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Port for the HTTP server
    #[arg(short = 'p', long, default_value_t = 3000)]
    port: u16,
    /// Directory of static front-end files served next to the API
    #[arg(long, default_value = "public")]
    public_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    debug!("starting with {:?}", args.clone());

    let cdx = CdxClient::new(
        CdxOptions::default_builder()
            .build()
            .context("could not build cdx client options")?,
    );

    if args.serve {
        let state = Arc::new(AppState { cdx });
        return server::start(args.port, args.public_dir, state).await;
    }

    let target = args.url.unwrap_or_default();
    let raw = cdx.fetch_snapshots(&target).await?;

    let mut catalog = SnapshotCatalog::new();
    catalog.process_snapshots(raw)?;
    catalog.apply_sorting(args.sort);
    catalog.apply_filters(FilterCriteria {
        status: args.status,
        year: args.year,
        query: args.query,
    });

    print_table(&catalog);

    Ok(())
}

fn print_table(catalog: &SnapshotCatalog) {
    let summary = catalog.summary();

    println!(
        "{} snapshots, showing {}, captured {}",
        summary.total,
        summary.showing,
        summary.date_range.unwrap_or_else(|| "-".into())
    );
    println!();

    for row in catalog.display_rows() {
        if row.rank == 0 {
            println!("{}", row.original_url);
            continue;
        }
        println!(
            "{:>4}  {:<22}  {:<40}  {:<5}  {:<20}  {}",
            row.rank,
            row.captured,
            row.original_url,
            row.status_code,
            row.mime_type,
            row.archive_view_url
        );
    }
}
