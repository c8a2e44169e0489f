//! Dated CSV snapshot files and latest-snapshot resolution.
//!
//! Files are named `<site>-<kind>-<YYYY-MM-DD>.csv` and live in one directory per record
//! kind. A second write on the same day overwrites the first.

use crate::config::Config;
use crate::error::{HarvestError, Result};
use crate::models::{Category, Product, RecordKind};
use chrono::{Local, NaiveDate};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A record type that can be persisted as one row of a snapshot file.
pub trait SnapshotRecord: Sized {
    /// Which snapshot directory and file name the record type uses.
    const KIND: RecordKind;

    /// Header row written at the top of every file of this kind.
    const HEADERS: &'static [&'static str];

    fn to_row(&self) -> Vec<String>;

    /// Maps a data row back into a record. The error is a human-readable reason.
    fn from_row(row: &StringRecord) -> std::result::Result<Self, String>;
}

fn field<'a>(row: &'a StringRecord, index: usize, name: &str) -> std::result::Result<&'a str, String> {
    row.get(index).ok_or_else(|| format!("missing {} column", name))
}

impl SnapshotRecord for Category {
    const KIND: RecordKind = RecordKind::Categories;
    const HEADERS: &'static [&'static str] =
        &["site_name", "category_name", "category_url", "category_id"];

    fn to_row(&self) -> Vec<String> {
        vec![self.site_name.clone(), self.name.clone(), self.url.clone(), self.id.clone()]
    }

    fn from_row(row: &StringRecord) -> std::result::Result<Self, String> {
        Ok(Category::new(
            field(row, 0, "site_name")?,
            field(row, 1, "category_name")?,
            field(row, 2, "category_url")?,
            field(row, 3, "category_id")?,
        ))
    }
}

impl SnapshotRecord for Product {
    const KIND: RecordKind = RecordKind::Products;
    const HEADERS: &'static [&'static str] =
        &["site_name", "category_id", "product_id", "product_url", "product_name", "product_price"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.site_name.clone(),
            self.category_id.clone(),
            self.id.clone(),
            self.url.clone(),
            self.name.clone(),
            self.price.to_string(),
        ]
    }

    fn from_row(row: &StringRecord) -> std::result::Result<Self, String> {
        let price_text = field(row, 5, "product_price")?;
        let price: f64 = price_text
            .trim()
            .parse()
            .map_err(|_| format!("invalid product_price '{}'", price_text))?;

        Ok(Product::new(
            field(row, 0, "site_name")?,
            field(row, 1, "category_id")?,
            field(row, 2, "product_id")?,
            field(row, 3, "product_url")?,
            field(row, 4, "product_name")?,
            price,
        ))
    }
}

/// File-backed store for category and product snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    categories_dir: PathBuf,
    products_dir: PathBuf,
}

impl SnapshotStore {
    /// Creates a store over explicit per-kind directories.
    pub fn new(categories_dir: impl Into<PathBuf>, products_dir: impl Into<PathBuf>) -> Self {
        Self { categories_dir: categories_dir.into(), products_dir: products_dir.into() }
    }

    /// Creates a store from the resolved configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.categories_dir, &config.products_dir)
    }

    /// Directory holding snapshots of the given kind.
    pub fn dir(&self, kind: RecordKind) -> &Path {
        match kind {
            RecordKind::Categories => &self.categories_dir,
            RecordKind::Products => &self.products_dir,
        }
    }

    /// Builds `<site>-<kind>-<date>.csv`.
    pub fn file_name(site: &str, kind: RecordKind, date: NaiveDate) -> String {
        format!("{}-{}.csv", Self::file_prefix(site, kind), date.format(DATE_FORMAT))
    }

    fn file_prefix(site: &str, kind: RecordKind) -> String {
        format!("{}-{}", site, kind)
    }

    /// Writes today's snapshot, overwriting any file already written today.
    pub fn write<R: SnapshotRecord>(&self, site: &str, records: &[R]) -> Result<PathBuf> {
        self.write_dated(site, records, Local::now().date_naive())
    }

    /// Writes the snapshot for an explicit date.
    pub fn write_dated<R: SnapshotRecord>(
        &self,
        site: &str,
        records: &[R],
        date: NaiveDate,
    ) -> Result<PathBuf> {
        let dir = self.dir(R::KIND);
        fs::create_dir_all(dir)?;

        let path = dir.join(Self::file_name(site, R::KIND, date));
        debug!("Writing {} {} records to {}", records.len(), R::KIND, path.display());

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .delimiter(b',')
            .quote(b'"')
            .from_writer(File::create(&path)?);

        writer.write_record(R::HEADERS)?;
        for record in records {
            writer.write_record(record.to_row())?;
        }
        writer.flush()?;

        info!("Stored {} {} for {} in {}", records.len(), R::KIND, site, path.display());
        Ok(path)
    }

    /// Finds the snapshot of `kind` for `site` whose file name carries the latest date.
    ///
    /// When two files carry the same date the one listed last wins.
    pub fn resolve_latest(&self, site: &str, kind: RecordKind) -> Result<PathBuf> {
        let dir = self.dir(kind);
        let prefix = Self::file_prefix(site, kind);
        let not_found = || HarvestError::NoSnapshotFound {
            site: site.to_string(),
            kind: kind.to_string(),
            dir: dir.to_path_buf(),
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        let mut latest: Option<(NaiveDate, PathBuf)> = None;

        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !file_name.contains(&prefix) {
                continue;
            }

            let date = Self::embedded_date(&file_name, &prefix)?;
            trace!("Snapshot candidate {} dated {}", file_name, date);

            if latest.as_ref().is_none_or(|(best, _)| date >= *best) {
                latest = Some((date, entry.path()));
            }
        }

        let (date, path) = latest.ok_or_else(not_found)?;
        debug!("Latest {} snapshot for {} is dated {}", kind, site, date);
        Ok(path)
    }

    /// Extracts the date between `<prefix>-` and `.csv`.
    fn embedded_date(file_name: &str, prefix: &str) -> Result<NaiveDate> {
        let malformed = || HarvestError::MalformedFilename { file: file_name.to_string() };

        let start = file_name.find(prefix).ok_or_else(malformed)? + prefix.len();
        let date_text = file_name[start..]
            .strip_prefix('-')
            .and_then(|rest| rest.strip_suffix(".csv"))
            .ok_or_else(malformed)?;

        NaiveDate::parse_from_str(date_text, DATE_FORMAT).map_err(|_| malformed())
    }

    /// Reads every row after the first as a record.
    ///
    /// The first row is always treated as the header, even when the file has none.
    pub fn read<R: SnapshotRecord>(&self, path: &Path) -> Result<Vec<R>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate().skip(1) {
            let row = row?;
            let record = R::from_row(&row).map_err(|reason| HarvestError::MalformedRow {
                path: path.to_path_buf(),
                line: row.position().map(|p| p.line()).unwrap_or(index as u64 + 1),
                reason,
            })?;
            records.push(record);
        }

        debug!("Read {} {} records from {}", records.len(), R::KIND, path.display());
        Ok(records)
    }

    /// Reads the latest snapshot of `R` for `site`.
    pub fn read_latest<R: SnapshotRecord>(&self, site: &str) -> Result<Vec<R>> {
        let path = self.resolve_latest(site, R::KIND)?;
        self.read(&path)
    }
}
