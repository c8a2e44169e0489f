//! CSS selectors for the retailers' HTML.
//!
//! Update this file when a site changes its markup, and add a fixture to
//! `tests/fixtures/` reproducing the new structure.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for one site's category listing page.
pub struct ListingSelectors {
    /// Product card container
    pub card: Selector,
    /// Attribute on the card holding the product id
    pub id_attr: &'static str,
    /// Link to the product page
    pub link: Selector,
    /// Product name text
    pub name: Selector,
    /// Displayed price text
    pub price: Selector,
}

fn parse(selector: &str) -> Selector {
    Selector::parse(selector).unwrap()
}

/// Selectors for falabella.com.ar.
pub mod falabella {
    use super::*;

    /// Furniture sub-category links in the second level of the category menu.
    pub static CATEGORY_LINKS: LazyLock<Selector> = LazyLock::new(|| {
        parse("li.secondLevelMenu__title > a[href*='/falabella-ar/category/']")
    });

    pub static LISTING: LazyLock<ListingSelectors> = LazyLock::new(|| ListingSelectors {
        card: parse("div[data-pod='catalyst-pod']"),
        id_attr: "data-key",
        link: parse("a.pod-link, a[href*='/product/']"),
        name: parse("b.pod-subTitle, .pod-subTitle"),
        price: parse("li[data-internet-price] span, li.prices-0 span"),
    });
}

/// Selectors for sodimac.com.ar.
pub mod sodimac {
    use super::*;

    /// Entries of the furniture menu list.
    pub static CATEGORY_LINKS: LazyLock<Selector> = LazyLock::new(|| {
        parse(
            "ul.menu-list-desktop > li[class*='link-primary'] > \
             a[href^='https://www.sodimac.com.ar/sodimac-ar/']",
        )
    });

    pub static LISTING: LazyLock<ListingSelectors> = LazyLock::new(|| ListingSelectors {
        card: parse("div.product-wrapper[data-key], div[data-testid='product-card'][data-key]"),
        id_attr: "data-key",
        link: parse("a.product-link, a[href*='/product/']"),
        name: parse("h2.product-title, .product-title"),
        price: parse("span.product-price, .price .main"),
    });
}
