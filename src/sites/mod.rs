//! Supported retailers and the per-site capabilities the collectors consume.
//!
//! A site is a pair of capabilities: a [`CategorySource`] producing raw navigation links and a
//! [`ProductExtractor`] turning a category listing page into raw product tuples. The built-in
//! implementations work on static HTML; anything else (a browser driver, fixtures) can be plugged
//! in through [`SiteBinding::new`].

pub mod extract;
pub mod selectors;
pub mod source;

use crate::client::PageFetcher;
use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use extract::HtmlProductExtractor;
pub use source::HtmlCategorySource;

/// Retailers the harvester knows how to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    Falabella,
    Sodimac,
}

impl Site {
    /// Name stored in the `site_name` column of every record.
    pub fn name(&self) -> &'static str {
        match self {
            Site::Falabella => "Falabella",
            Site::Sodimac => "Sodimac",
        }
    }

    /// Lowercase identifier used in snapshot file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Site::Falabella => "falabella",
            Site::Sodimac => "sodimac",
        }
    }

    /// Page listing the furniture categories.
    pub fn landing_url(&self) -> &'static str {
        match self {
            Site::Falabella => "https://www.falabella.com.ar/falabella-ar/",
            Site::Sodimac => "https://www.sodimac.com.ar/sodimac-ar/",
        }
    }

    /// Index of the category id when a category URL is split on `/`.
    ///
    /// `https://www.sodimac.com.ar/sodimac-ar/category/cat10560/Muebles` -> `cat10560`
    pub fn category_id_segment(&self) -> usize {
        match self {
            Site::Falabella | Site::Sodimac => 5,
        }
    }

    /// Returns all supported sites.
    pub fn all() -> &'static [Site] {
        &[Site::Falabella, Site::Sodimac]
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Site {
    type Err = HarvestError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "falabella" => Ok(Site::Falabella),
            "sodimac" => Ok(Site::Sodimac),
            _ => Err(HarvestError::InvalidArgument(format!(
                "Unknown site '{}'. Valid sites: falabella, sodimac",
                s
            ))),
        }
    }
}

/// A navigation link as found on the site, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCategory {
    pub label: String,
    pub href: String,
}

impl RawCategory {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self { label: label.into(), href: href.into() }
    }
}

/// A product card as found on a listing page, price still in display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProduct {
    pub id: String,
    pub url: String,
    pub name: String,
    pub price_text: String,
}

/// Produces the raw category links of one site.
#[async_trait]
pub trait CategorySource: Send + Sync {
    async fn produce_categories(&self) -> Result<Vec<RawCategory>>;
}

/// Extracts raw product tuples from a category listing page body.
pub trait ProductExtractor: Send + Sync {
    fn extract_products(&self, page_body: &str) -> Vec<RawProduct>;
}

/// The capability pair used to harvest one site.
#[derive(Clone)]
pub struct SiteBinding {
    pub site: Site,
    pub categories: Arc<dyn CategorySource>,
    pub extractor: Arc<dyn ProductExtractor>,
}

impl SiteBinding {
    pub fn new(
        site: Site,
        categories: Arc<dyn CategorySource>,
        extractor: Arc<dyn ProductExtractor>,
    ) -> Self {
        Self { site, categories, extractor }
    }

    /// Binds the built-in HTML capabilities of `site`.
    pub fn html(site: Site, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::new(
            site,
            Arc::new(HtmlCategorySource::new(site, fetcher)),
            Arc::new(HtmlProductExtractor::new(site)),
        )
    }
}

impl fmt::Debug for SiteBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteBinding").field("site", &self.site).finish_non_exhaustive()
    }
}
