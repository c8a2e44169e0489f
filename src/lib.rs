//! catalog-harvest - Daily retailer catalog snapshots
//!
//! Harvests a retailer's category taxonomy and the products listed under each category,
//! and persists every harvest as a dated CSV snapshot that later runs resolve by date.

pub mod client;
pub mod collect;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod sites;
pub mod store;

pub use config::Config;
pub use error::HarvestError;
pub use models::{Category, Product, RecordKind};
pub use pipeline::{Pipeline, RunReport, Task};
pub use sites::Site;
pub use store::SnapshotStore;
