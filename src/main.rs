//! catalog-harvest - Daily retailer catalog snapshots
//!
//! Collects categories and products per site and stores them as dated CSV files.

use anyhow::Result;
use catalog_harvest::commands::run::format_report;
use catalog_harvest::commands::{LatestCommand, RunCommand};
use catalog_harvest::config::Config;
use catalog_harvest::{RecordKind, Site, Task};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "catalog-harvest",
    version,
    about = "Daily retailer catalog snapshots",
    long_about = "Collects the category taxonomy and per-category product listings of retail sites \
                  and stores each harvest as a dated CSV snapshot.\n\n\
                  Sites: falabella, sodimac\n\
                  Tasks: collectcategories, collectproducts"
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "HARVEST_PROXY")]
    proxy: Option<String>,

    /// Timeout for each page fetch in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run tasks in order; each task runs for all sites concurrently
    Run {
        /// Sites to harvest (falabella, sodimac)
        #[arg(short, long, required = true, num_args = 1.., value_delimiter = ',')]
        sites: Vec<Site>,

        /// Tasks to run, in order (collectcategories, collectproducts)
        #[arg(short, long, required = true, num_args = 1.., value_delimiter = ',')]
        tasks: Vec<Task>,
    },

    /// List supported sites and tasks
    Sites,

    /// Show the latest snapshot of a site
    Latest {
        /// Site name (falabella, sodimac)
        site: Site,

        /// Snapshot kind (categories, products)
        kind: RecordKind,

        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(timeout) = cli.timeout {
        config.fetch_timeout_secs = timeout;
    }

    match cli.command {
        Commands::Run { sites, tasks } => {
            let cmd = RunCommand::new(config);
            let report = cmd.execute(&sites, &tasks).await?;
            println!("{}", format_report(&report));

            let failed = report.failures().count();
            if failed > 0 {
                anyhow::bail!("{} of {} site tasks failed", failed, report.outcomes.len());
            }
        }

        Commands::Sites => {
            println!("Supported sites:\n");
            println!("{:<12} {:<12} {}", "Site", "Name", "Landing page");
            println!("{:-<12} {:-<12} {:-<40}", "", "", "");

            for site in Site::all() {
                println!("{:<12} {:<12} {}", site.to_string(), site.name(), site.landing_url());
            }

            println!("\nTasks (run in the order given):\n");
            for task in Task::all() {
                println!("  {}", task);
            }
        }

        Commands::Latest { site, kind, json } => {
            let cmd = LatestCommand::new(&config);
            println!("{}", cmd.execute(site, kind, json)?);
        }
    }

    Ok(())
}
