//! CLI command implementations.

pub mod latest;
pub mod run;

pub use latest::LatestCommand;
pub use run::RunCommand;
