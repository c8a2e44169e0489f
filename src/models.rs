//! Record models for harvested categories and products.

use crate::error::{HarvestError, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// A node of a retailer's navigation taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Display name of the site the category belongs to
    pub site_name: String,
    /// Category label
    pub name: String,
    /// Absolute URL of the category listing page
    pub url: String,
    /// Identifier derived from the URL path
    pub id: String,
}

impl Category {
    /// Creates a category, trimming surrounding whitespace from every field.
    pub fn new(
        site_name: impl AsRef<str>,
        name: impl AsRef<str>,
        url: impl AsRef<str>,
        id: impl AsRef<str>,
    ) -> Self {
        Self {
            site_name: site_name.as_ref().trim().to_string(),
            name: name.as_ref().trim().to_string(),
            url: url.as_ref().trim().to_string(),
            id: id.as_ref().trim().to_string(),
        }
    }
}

/// A sellable item found on a category listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Display name of the site the product was found on
    pub site_name: String,
    /// Id of the category whose listing linked the product
    pub category_id: String,
    /// Retailer product identifier
    pub id: String,
    /// Product page URL
    pub url: String,
    /// Product name
    pub name: String,
    /// Non-negative price
    pub price: f64,
}

impl Product {
    /// Creates a product, trimming surrounding whitespace from every text field.
    pub fn new(
        site_name: impl AsRef<str>,
        category_id: impl AsRef<str>,
        id: impl AsRef<str>,
        url: impl AsRef<str>,
        name: impl AsRef<str>,
        price: f64,
    ) -> Self {
        Self {
            site_name: site_name.as_ref().trim().to_string(),
            category_id: category_id.as_ref().trim().to_string(),
            id: id.as_ref().trim().to_string(),
            url: url.as_ref().trim().to_string(),
            name: name.as_ref().trim().to_string(),
            price,
        }
    }

    /// Creates a product from locale-formatted price text.
    ///
    /// Fails with [`HarvestError::PriceParse`] instead of defaulting the price.
    pub fn with_price_text(
        site_name: impl AsRef<str>,
        category_id: impl AsRef<str>,
        id: impl AsRef<str>,
        url: impl AsRef<str>,
        name: impl AsRef<str>,
        price_text: &str,
    ) -> Result<Self> {
        let price = parse_price(price_text)?;
        Ok(Self::new(site_name, category_id, id, url, name, price))
    }
}

/// Currency prefixes the retailers print before a price.
const CURRENCY_SYMBOLS: &[&str] = &["US$", "$"];

/// `1.305,30`, `12.999`, `996,00` or plain digits.
static PRICE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{1,3}(?:\.\d{3})+|\d+)(?:,\d+)?$").unwrap());

/// Parses a price written with `.` as thousands separator and `,` as decimal mark.
///
/// A leading currency symbol and surrounding whitespace are ignored: `"$ 1.305,30"` -> `1305.30`.
/// For ranges such as `"$ 10.000 - $ 20.000"` the lower bound is taken. Any other text around
/// the number makes the price invalid.
pub fn parse_price(text: &str) -> Result<f64> {
    let invalid = || HarvestError::PriceParse { text: text.to_string() };

    let lower = text.split('-').next().unwrap_or_default().trim();
    let number = CURRENCY_SYMBOLS
        .iter()
        .find_map(|symbol| lower.strip_prefix(symbol))
        .unwrap_or(lower)
        .trim();

    if !PRICE_SHAPE.is_match(number) {
        return Err(invalid());
    }

    number
        .replace('.', "")
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
        .ok_or_else(invalid)
}

/// The two kinds of snapshot files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Categories,
    Products,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Categories => "categories",
            RecordKind::Products => "products",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = HarvestError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "categories" | "category" => Ok(RecordKind::Categories),
            "products" | "product" => Ok(RecordKind::Products),
            _ => Err(HarvestError::InvalidArgument(format!(
                "Unknown record kind '{}'. Valid kinds: categories, products",
                s
            ))),
        }
    }
}
