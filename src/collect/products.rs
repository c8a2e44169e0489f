//! Product collection over a site's category listing pages.

use crate::client::PageFetcher;
use crate::error::HarvestError;
use crate::models::{Category, Product};
use crate::sites::{ProductExtractor, Site};
use futures::stream::{self, StreamExt};
use std::pin::pin;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A category whose listing page could not be fetched.
#[derive(Debug)]
pub struct SkippedCategory {
    pub category_id: String,
    pub url: String,
    pub error: HarvestError,
}

/// Products gathered across all categories of one site.
#[derive(Debug, Default)]
pub struct ProductHarvest {
    /// Products in category order, then listing order
    pub products: Vec<Product>,
    /// Categories that produced nothing because their fetch failed
    pub skipped: Vec<SkippedCategory>,
    /// Product cards dropped because their price did not parse
    pub rejected: usize,
}

/// Fetches and parses every category listing of one site.
pub struct ProductCollector {
    site: Site,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn ProductExtractor>,
    max_concurrent_fetches: usize,
}

impl ProductCollector {
    pub fn new(
        site: Site,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn ProductExtractor>,
    ) -> Self {
        Self { site, fetcher, extractor, max_concurrent_fetches: 1 }
    }

    /// Sets how many category pages may be in flight at once.
    pub fn with_concurrency(mut self, max_concurrent_fetches: usize) -> Self {
        self.max_concurrent_fetches = max_concurrent_fetches.max(1);
        self
    }

    /// Collects products for `categories`.
    ///
    /// A failed fetch skips its category and never aborts the run. There is no
    /// deduplication: a product linked from two categories appears twice.
    pub async fn collect(&self, categories: &[Category]) -> ProductHarvest {
        let fetcher = &self.fetcher;

        let mut pages = pin!(stream::iter(categories)
            .map(|category| async move {
                debug!("Fetching category {} ({})", category.id, category.url);
                (category, fetcher.fetch(&category.url).await)
            })
            .buffered(self.max_concurrent_fetches));

        let mut harvest = ProductHarvest::default();

        while let Some((category, page)) = pages.next().await {
            match page {
                Ok(body) => self.extract(category, &body, &mut harvest),
                Err(error) => {
                    if error.is_fetch_failure() {
                        warn!("Skipping {} category {}: {}", self.site.name(), category.id, error);
                    } else {
                        error!("Skipping {} category {}: {}", self.site.name(), category.id, error);
                    }
                    harvest.skipped.push(SkippedCategory {
                        category_id: category.id.clone(),
                        url: category.url.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            "Collected {} {} products from {} categories ({} skipped, {} rejected)",
            harvest.products.len(),
            self.site.name(),
            categories.len(),
            harvest.skipped.len(),
            harvest.rejected
        );

        harvest
    }

    fn extract(&self, category: &Category, body: &str, harvest: &mut ProductHarvest) {
        let raw = self.extractor.extract_products(body);
        debug!("Category {} listed {} products", category.id, raw.len());

        for item in raw {
            match Product::with_price_text(
                self.site.name(),
                &category.id,
                &item.id,
                &item.url,
                &item.name,
                &item.price_text,
            ) {
                Ok(product) => harvest.products.push(product),
                Err(e) => {
                    warn!("Dropping product {} in category {}: {}", item.id, category.id, e);
                    harvest.rejected += 1;
                }
            }
        }
    }
}
