//! Product cards extracted from category listing pages.

use super::selectors::{falabella, sodimac, ListingSelectors};
use super::{ProductExtractor, RawProduct, Site};
use scraper::{ElementRef, Html};
use tracing::{debug, trace};
use url::Url;

/// Listing page parser driven by the site's CSS selectors.
pub struct HtmlProductExtractor {
    site: Site,
    base: Option<Url>,
}

impl HtmlProductExtractor {
    pub fn new(site: Site) -> Self {
        Self { site, base: Url::parse(site.landing_url()).ok() }
    }

    fn selectors(&self) -> &'static ListingSelectors {
        match self.site {
            Site::Falabella => &falabella::LISTING,
            Site::Sodimac => &sodimac::LISTING,
        }
    }

    /// Parses one card. Cards without an id, link or name are placeholders.
    fn parse_card(&self, card: ElementRef, selectors: &ListingSelectors) -> Option<RawProduct> {
        let id = card.value().attr(selectors.id_attr).map(str::trim).filter(|id| !id.is_empty())?;

        let href = card.select(&selectors.link).next()?.value().attr("href")?.trim();
        let url = match &self.base {
            Some(base) => base.join(href).ok()?.to_string(),
            None => href.to_string(),
        };

        let name = card
            .select(&selectors.name)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|name| !name.is_empty())?;

        let price_text = card
            .select(&selectors.price)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        Some(RawProduct { id: id.to_string(), url, name, price_text })
    }
}

impl ProductExtractor for HtmlProductExtractor {
    fn extract_products(&self, page_body: &str) -> Vec<RawProduct> {
        let document = Html::parse_document(page_body);
        let selectors = self.selectors();

        let mut products = Vec::new();
        for card in document.select(&selectors.card) {
            match self.parse_card(card, selectors) {
                Some(product) => {
                    trace!("Extracted product: {} - {}", product.id, product.name);
                    products.push(product);
                }
                None => trace!("Skipping incomplete product card"),
            }
        }

        debug!("Extracted {} products from {} listing", products.len(), self.site.name());
        products
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_falabella_cards() {
        let html = r#"
            <div id="testId-searchResults-products">
                <div data-pod="catalyst-pod" data-key="8834212">
                    <a class="pod-link" href="/falabella-ar/product/8834212/Mesa-Ratona/8834212">
                        <b class="pod-subTitle"> Mesa Ratona Nórdica </b>
                    </a>
                    <ol><li data-internet-price="1.305,30"><span>$ 1.305,30</span></li></ol>
                </div>
                <div data-pod="catalyst-pod" data-key="">
                    <a class="pod-link" href="/falabella-ar/product/0/Ad"><b class="pod-subTitle">Ad</b></a>
                </div>
                <div data-pod="catalyst-pod" data-key="7712">
                    <a class="pod-link" href="https://www.falabella.com.ar/falabella-ar/product/7712/Silla">
                        <b class="pod-subTitle">Silla</b>
                    </a>
                </div>
            </div>
        "#;

        let products = HtmlProductExtractor::new(Site::Falabella).extract_products(html);

        assert_eq!(products.len(), 2);
        assert_eq!(
            products[0],
            RawProduct {
                id: "8834212".to_string(),
                url: "https://www.falabella.com.ar/falabella-ar/product/8834212/Mesa-Ratona/8834212"
                    .to_string(),
                name: "Mesa Ratona Nórdica".to_string(),
                price_text: "$ 1.305,30".to_string(),
            }
        );
        assert_eq!(products[1].id, "7712");
        assert_eq!(products[1].price_text, "");
    }

    #[test]
    fn test_extract_sodimac_cards() {
        let html = r#"
            <div class="product-wrapper" data-key="110203">
                <a class="product-link" href="/sodimac-ar/product/110203/Escritorio">
                    <h2 class="product-title">Escritorio 120 cm</h2>
                </a>
                <span class="product-price">$ 996,00</span>
            </div>
            <div class="product-wrapper" data-key="110204">
                <span class="product-price">$ 10,00</span>
            </div>
        "#;

        let products = HtmlProductExtractor::new(Site::Sodimac).extract_products(html);

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "110203");
        assert_eq!(products[0].url, "https://www.sodimac.com.ar/sodimac-ar/product/110203/Escritorio");
        assert_eq!(products[0].price_text, "$ 996,00");
    }

    #[test]
    fn test_extract_empty_page() {
        let products = HtmlProductExtractor::new(Site::Sodimac).extract_products("<html></html>");
        assert!(products.is_empty());
    }
}
