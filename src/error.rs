//! Error taxonomy for collection and snapshot storage.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the store, the fetcher and the collectors.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Bad user input (unknown site or task name).
    #[error("{0}")]
    InvalidArgument(String),

    /// No snapshot of the requested kind exists for the site.
    #[error("no {kind} snapshot found for '{site}' in {}", dir.display())]
    NoSnapshotFound { site: String, kind: String, dir: PathBuf },

    /// A snapshot file name whose embedded date does not parse.
    #[error("malformed snapshot file name: {file}")]
    MalformedFilename { file: String },

    /// A snapshot row that does not map onto its record type.
    #[error("malformed row {line} in {}: {reason}", path.display())]
    MalformedRow { path: PathBuf, line: u64, reason: String },

    #[error("request to {url} timed out")]
    FetchTimeout { url: String },

    #[error("request to {url} failed with status {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("request to {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    /// Locale-formatted price text that is not a non-negative number.
    #[error("could not parse price from '{text}'")]
    PriceParse { text: String },

    /// A raw category whose href cannot produce a valid category.
    #[error("invalid category href '{href}': {reason}")]
    InvalidCategory { href: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl HarvestError {
    /// Per-category fetch failures the product collector recovers from.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            HarvestError::FetchTimeout { .. }
                | HarvestError::FetchStatus { .. }
                | HarvestError::Fetch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_classification() {
        assert!(HarvestError::FetchTimeout { url: "u".into() }.is_fetch_failure());
        assert!(HarvestError::FetchStatus { url: "u".into(), status: 404 }.is_fetch_failure());
        assert!(HarvestError::Fetch { url: "u".into(), reason: "dns".into() }.is_fetch_failure());
        assert!(!HarvestError::PriceParse { text: "abc".into() }.is_fetch_failure());
        assert!(!HarvestError::MalformedFilename { file: "x".into() }.is_fetch_failure());
    }

    #[test]
    fn test_error_messages() {
        let err = HarvestError::FetchStatus { url: "https://x/c".into(), status: 503 };
        assert_eq!(err.to_string(), "request to https://x/c failed with status 503");

        let err = HarvestError::NoSnapshotFound {
            site: "sodimac".into(),
            kind: "categories".into(),
            dir: PathBuf::from("data/categories"),
        };
        assert_eq!(err.to_string(), "no categories snapshot found for 'sodimac' in data/categories");
    }
}
