//! Destination store abstraction
//!
//! The batch loader writes through [`DestinationStore`]; the DuckDB adapter
//! is the production implementation.

pub mod traits;

pub use traits::DestinationStore;
