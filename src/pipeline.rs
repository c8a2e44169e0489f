//! Orchestration of collection and persistence across sites and tasks.
//!
//! Tasks run one after the other in the order given. For each task every site runs
//! concurrently, and the next task starts only once all sites have finished the current
//! one. A failing site never cancels its siblings.

use crate::client::PageFetcher;
use crate::collect::{CategoryCollector, ProductCollector};
use crate::error::{HarvestError, Result};
use crate::models::Category;
use crate::sites::{Site, SiteBinding};
use crate::store::SnapshotStore;
use futures::future::join_all;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// A unit of work run for each selected site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Collect the category taxonomy and store it
    CollectCategories,
    /// Collect products for the latest stored categories and store them
    CollectProducts,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::CollectCategories => "collectcategories",
            Task::CollectProducts => "collectproducts",
        }
    }

    /// Returns all tasks in their natural order.
    pub fn all() -> &'static [Task] {
        &[Task::CollectCategories, Task::CollectProducts]
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = HarvestError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "collectcategories" | "collect-categories" | "categories" => {
                Ok(Task::CollectCategories)
            }
            "collectproducts" | "collect-products" | "products" => Ok(Task::CollectProducts),
            _ => Err(HarvestError::InvalidArgument(format!(
                "Unknown task '{}'. Valid tasks: collectcategories, collectproducts",
                s
            ))),
        }
    }
}

/// What a successful task wrote.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutput {
    Categories { count: usize, path: PathBuf },
    Products { count: usize, skipped_categories: usize, rejected: usize, path: PathBuf },
}

impl TaskOutput {
    /// Number of records written to the snapshot.
    pub fn count(&self) -> usize {
        match self {
            TaskOutput::Categories { count, .. } | TaskOutput::Products { count, .. } => *count,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            TaskOutput::Categories { path, .. } | TaskOutput::Products { path, .. } => path,
        }
    }
}

/// Outcome of one task for one site.
#[derive(Debug)]
pub struct SiteOutcome {
    pub task: Task,
    pub site: Site,
    pub result: Result<TaskOutput>,
}

/// Outcomes of a whole run, in execution order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<SiteOutcome>,
    pub elapsed: Duration,
}

impl RunReport {
    /// Outcomes whose task failed.
    pub fn failures(&self) -> impl Iterator<Item = &SiteOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Finds the outcome of `task` for `site`.
    pub fn outcome(&self, task: Task, site: Site) -> Option<&SiteOutcome> {
        self.outcomes.iter().find(|o| o.task == task && o.site == site)
    }
}

/// Drives collectors and the snapshot store.
pub struct Pipeline {
    store: SnapshotStore,
    fetcher: Arc<dyn PageFetcher>,
    max_concurrent_fetches: usize,
}

impl Pipeline {
    pub fn new(store: SnapshotStore, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { store, fetcher, max_concurrent_fetches: 1 }
    }

    /// Sets how many category pages one site may fetch at once.
    pub fn with_concurrency(mut self, max_concurrent_fetches: usize) -> Self {
        self.max_concurrent_fetches = max_concurrent_fetches.max(1);
        self
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Collects categories for the site and writes today's snapshot.
    pub async fn collect_categories(&self, binding: &SiteBinding) -> Result<TaskOutput> {
        let site = binding.site;
        info!("Collecting and storing categories from {}", site.name());

        let categories =
            CategoryCollector::new(site, binding.categories.clone()).collect().await?;
        if categories.is_empty() {
            warn!("No categories found for {}", site.name());
        }

        let path = self.store.write(site.slug(), &categories)?;
        Ok(TaskOutput::Categories { count: categories.len(), path })
    }

    /// Collects products for the latest category snapshot and writes today's snapshot.
    pub async fn collect_products(&self, binding: &SiteBinding) -> Result<TaskOutput> {
        let site = binding.site;
        info!("Collecting and storing products from {}", site.name());

        let categories: Vec<Category> = self.store.read_latest(site.slug())?;

        let harvest =
            ProductCollector::new(site, self.fetcher.clone(), binding.extractor.clone())
                .with_concurrency(self.max_concurrent_fetches)
                .collect(&categories)
                .await;

        if harvest.products.is_empty() {
            warn!("No products found for {}", site.name());
        }

        let path = self.store.write(site.slug(), &harvest.products)?;
        Ok(TaskOutput::Products {
            count: harvest.products.len(),
            skipped_categories: harvest.skipped.len(),
            rejected: harvest.rejected,
            path,
        })
    }

    pub async fn run_task(&self, binding: &SiteBinding, task: Task) -> Result<TaskOutput> {
        match task {
            Task::CollectCategories => self.collect_categories(binding).await,
            Task::CollectProducts => self.collect_products(binding).await,
        }
    }

    /// Runs `tasks` in order, each across all `bindings` concurrently.
    ///
    /// A site listed twice runs once per task.
    pub async fn run(&self, bindings: &[SiteBinding], tasks: &[Task]) -> RunReport {
        let started = Instant::now();

        let mut sites: Vec<&SiteBinding> = Vec::with_capacity(bindings.len());
        for binding in bindings {
            if !sites.iter().any(|b| b.site == binding.site) {
                sites.push(binding);
            }
        }

        let mut report = RunReport::default();

        for &task in tasks {
            info!("Running {} for {} site(s)", task, sites.len());

            let results = join_all(sites.iter().map(|binding| self.run_task(binding, task))).await;

            for (binding, result) in sites.iter().zip(results) {
                match &result {
                    Ok(output) => info!(
                        "{} {}: {} records in {}",
                        binding.site.name(),
                        task,
                        output.count(),
                        output.path().display()
                    ),
                    Err(e) => error!("{} {} failed: {}", binding.site.name(), task, e),
                }
                report.outcomes.push(SiteOutcome { task, site: binding.site, result });
            }
        }

        report.elapsed = started.elapsed();
        info!("Finished run in {:.4} seconds", report.elapsed.as_secs_f64());
        report
    }
}
