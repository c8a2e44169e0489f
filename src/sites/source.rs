//! Category links harvested from a site's landing page.

use super::selectors::{falabella, sodimac};
use super::{CategorySource, RawCategory, Site};
use crate::client::PageFetcher;
use crate::error::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, info, trace};
use url::Url;

/// Reads the category menu out of the landing page markup.
pub struct HtmlCategorySource {
    site: Site,
    fetcher: Arc<dyn PageFetcher>,
    landing_url: String,
}

impl HtmlCategorySource {
    pub fn new(site: Site, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_landing_url(site, fetcher, site.landing_url())
    }

    /// Creates a source reading another landing page URL, such as a regional mirror.
    pub fn with_landing_url(
        site: Site,
        fetcher: Arc<dyn PageFetcher>,
        landing_url: impl Into<String>,
    ) -> Self {
        Self { site, fetcher, landing_url: landing_url.into() }
    }

    fn link_selector(&self) -> &'static Selector {
        match self.site {
            Site::Falabella => &falabella::CATEGORY_LINKS,
            Site::Sodimac => &sodimac::CATEGORY_LINKS,
        }
    }

    /// Collects `(label, absolute href)` pairs in document order.
    ///
    /// Links carrying a query string are filtered views of a category, not categories.
    pub fn parse_links(&self, body: &str) -> Vec<RawCategory> {
        let document = Html::parse_document(body);
        let base = Url::parse(&self.landing_url).ok();

        document
            .select(self.link_selector())
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?.trim();
                let absolute = match &base {
                    Some(base) => base.join(href).ok()?.to_string(),
                    None => href.to_string(),
                };

                if absolute.contains('?') {
                    trace!("Skipping filtered category link: {}", absolute);
                    return None;
                }

                let label = anchor.text().collect::<String>();
                Some(RawCategory::new(label, absolute))
            })
            .collect()
    }
}

#[async_trait]
impl CategorySource for HtmlCategorySource {
    async fn produce_categories(&self) -> Result<Vec<RawCategory>> {
        info!("Reading {} categories from {}", self.site.name(), self.landing_url);

        let body = self.fetcher.fetch(&self.landing_url).await?;
        let links = self.parse_links(&body);

        debug!("Found {} category links for {}", links.len(), self.site.name());
        Ok(links)
    }
}
