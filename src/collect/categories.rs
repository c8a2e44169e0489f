//! Category collection from a site's category source.

use crate::error::{HarvestError, Result};
use crate::models::Category;
use crate::sites::{CategorySource, RawCategory, Site};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Breadcrumb glyphs some menus append to a label.
const LABEL_MARKERS: &[char] = &['>', '›', '»'];

/// Collects the categories of one site.
pub struct CategoryCollector {
    site: Site,
    source: Arc<dyn CategorySource>,
}

impl CategoryCollector {
    pub fn new(site: Site, source: Arc<dyn CategorySource>) -> Self {
        Self { site, source }
    }

    /// Drains the source and maps every usable link to a [`Category`], in source order.
    ///
    /// Links whose href is not an absolute URL or lacks the id segment are skipped.
    /// An empty result is not an error.
    pub async fn collect(&self) -> Result<Vec<Category>> {
        let raw = self.source.produce_categories().await?;
        let total = raw.len();

        let mut categories = Vec::with_capacity(total);
        for item in raw {
            match self.to_category(&item) {
                Ok(category) => categories.push(category),
                Err(e) => warn!("Skipping {} category '{}': {}", self.site.name(), item.label, e),
            }
        }

        info!("Collected {} of {} {} categories", categories.len(), total, self.site.name());
        Ok(categories)
    }

    fn to_category(&self, item: &RawCategory) -> Result<Category> {
        let id = derive_category_id(&item.href, self.site.category_id_segment())?;
        Ok(Category::new(self.site.name(), normalize_label(&item.label), &item.href, id))
    }
}

/// Trims a label and strips trailing breadcrumb markers (`"Muebles >"` -> `"Muebles"`).
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .trim_end_matches(|c: char| LABEL_MARKERS.contains(&c) || c.is_whitespace())
        .to_string()
}

/// Takes the `segment`-th piece of `href` split on `/`.
pub fn derive_category_id(href: &str, segment: usize) -> Result<String> {
    let invalid = |reason: &str| HarvestError::InvalidCategory {
        href: href.to_string(),
        reason: reason.to_string(),
    };

    let href = href.trim();
    Url::parse(href).map_err(|e| invalid(&e.to_string()))?;

    href.split('/')
        .nth(segment)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .ok_or_else(|| invalid(&format!("no id at path segment {}", segment)))
}
