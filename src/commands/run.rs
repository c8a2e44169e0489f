//! Pipeline run command implementation.

use crate::client::{HttpFetcher, PageFetcher};
use crate::config::Config;
use crate::pipeline::{Pipeline, RunReport, Task, TaskOutput};
use crate::sites::{Site, SiteBinding};
use crate::store::SnapshotStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Runs the collection pipeline for a set of sites and tasks.
pub struct RunCommand {
    config: Config,
}

impl RunCommand {
    /// Creates a new run command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the pipeline over HTTP.
    pub async fn execute(&self, sites: &[Site], tasks: &[Task]) -> Result<RunReport> {
        let fetcher = HttpFetcher::new(&self.config).context("Failed to create HTTP client")?;
        self.execute_with_fetcher(Arc::new(fetcher), sites, tasks).await
    }

    /// Runs the pipeline with a provided fetcher (for testing).
    pub async fn execute_with_fetcher(
        &self,
        fetcher: Arc<dyn PageFetcher>,
        sites: &[Site],
        tasks: &[Task],
    ) -> Result<RunReport> {
        if sites.is_empty() || tasks.is_empty() {
            anyhow::bail!("At least one site and one task are required");
        }

        info!(
            "Running tasks [{}] for sites [{}]",
            tasks.iter().map(Task::to_string).collect::<Vec<_>>().join(", "),
            sites.iter().map(Site::to_string).collect::<Vec<_>>().join(", ")
        );

        let bindings: Vec<SiteBinding> =
            sites.iter().map(|&site| SiteBinding::html(site, fetcher.clone())).collect();

        let pipeline = Pipeline::new(SnapshotStore::from_config(&self.config), fetcher)
            .with_concurrency(self.config.max_concurrent_fetches);

        Ok(pipeline.run(&bindings, tasks).await)
    }
}

/// Formats a run report as a summary table.
pub fn format_report(report: &RunReport) -> String {
    let mut lines = Vec::new();

    lines.push(format!("{:<18} {:<10} {:<8} {}", "Task", "Site", "Records", "Result"));
    lines.push(format!("{:-<18} {:-<10} {:-<8} {:-<40}", "", "", "", ""));

    for outcome in &report.outcomes {
        let (records, detail) = match &outcome.result {
            Ok(TaskOutput::Categories { count, path }) => {
                (count.to_string(), path.display().to_string())
            }
            Ok(TaskOutput::Products { count, skipped_categories, rejected, path }) => {
                let mut detail = path.display().to_string();
                if *skipped_categories > 0 || *rejected > 0 {
                    detail.push_str(&format!(
                        " ({} categories skipped, {} products rejected)",
                        skipped_categories, rejected
                    ));
                }
                (count.to_string(), detail)
            }
            Err(e) => ("-".to_string(), format!("FAILED: {}", e)),
        };

        lines.push(format!(
            "{:<18} {:<10} {:<8} {}",
            outcome.task.to_string(),
            outcome.site.to_string(),
            records,
            detail
        ));
    }

    lines.push(String::new());
    lines.push(format!("Finished in {:.4} seconds.", report.elapsed.as_secs_f64()));

    lines.join("\n")
}
