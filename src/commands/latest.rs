//! Latest snapshot lookup command implementation.

use crate::config::Config;
use crate::models::{Category, Product, RecordKind};
use crate::sites::Site;
use crate::store::SnapshotStore;
use anyhow::Result;

/// Shows the latest snapshot of one kind for one site.
pub struct LatestCommand {
    store: SnapshotStore,
}

impl LatestCommand {
    /// Creates a new lookup command.
    pub fn new(config: &Config) -> Self {
        Self { store: SnapshotStore::from_config(config) }
    }

    /// Resolves the latest snapshot and describes it, or dumps its records as JSON.
    pub fn execute(&self, site: Site, kind: RecordKind, json: bool) -> Result<String> {
        let path = self.store.resolve_latest(site.slug(), kind)?;

        if json {
            return Ok(match kind {
                RecordKind::Categories => {
                    serde_json::to_string_pretty(&self.store.read::<Category>(&path)?)?
                }
                RecordKind::Products => {
                    serde_json::to_string_pretty(&self.store.read::<Product>(&path)?)?
                }
            });
        }

        let count = match kind {
            RecordKind::Categories => self.store.read::<Category>(&path)?.len(),
            RecordKind::Products => self.store.read::<Product>(&path)?.len(),
        };

        Ok(format!("{}\n{} records", path.display(), count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn make_config(tmp: &TempDir) -> Config {
        Config {
            categories_dir: tmp.path().join("categories"),
            products_dir: tmp.path().join("products"),
            ..Config::default()
        }
    }

    #[test]
    fn test_latest_summary() {
        let tmp = TempDir::new().unwrap();
        let config = make_config(&tmp);
        let store = SnapshotStore::from_config(&config);
        let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let categories = vec![
            Category::new("Sodimac", "Living", "https://www.sodimac.com.ar/sodimac-ar/category/cat1/L", "cat1"),
            Category::new("Sodimac", "Baño", "https://www.sodimac.com.ar/sodimac-ar/category/cat2/B", "cat2"),
        ];
        store.write_dated("sodimac", &categories, day).unwrap();

        let output = LatestCommand::new(&config)
            .execute(Site::Sodimac, RecordKind::Categories, false)
            .unwrap();

        assert!(output.contains("sodimac-categories-2024-02-01.csv"));
        assert!(output.ends_with("2 records"));
    }

    #[test]
    fn test_latest_json() {
        let tmp = TempDir::new().unwrap();
        let config = make_config(&tmp);
        let store = SnapshotStore::from_config(&config);
        let products = vec![Product::new("Falabella", "cat1", "p1", "https://x/p1", "Mesa", 1305.3)];
        store.write("falabella", &products).unwrap();

        let output = LatestCommand::new(&config)
            .execute(Site::Falabella, RecordKind::Products, true)
            .unwrap();

        assert!(output.starts_with('['));
        assert!(output.contains("\"category_id\": \"cat1\""));
        assert!(output.contains("1305.3"));
    }

    #[test]
    fn test_latest_missing_snapshot() {
        let tmp = TempDir::new().unwrap();
        let config = make_config(&tmp);

        let err = LatestCommand::new(&config)
            .execute(Site::Falabella, RecordKind::Products, false)
            .unwrap_err();
        assert!(err.to_string().contains("no products snapshot found"));
    }
}
