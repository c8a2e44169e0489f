//! Collectors turning raw site data into records.

pub mod categories;
pub mod products;

pub use categories::CategoryCollector;
pub use products::{ProductCollector, ProductHarvest, SkippedCategory};
