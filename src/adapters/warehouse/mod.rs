//! Remote warehouse abstraction
//!
//! A [`WarehouseClient`] submits a query and returns a [`QueryHandle`] once
//! the remote job has completed. The handle reports the authoritative row
//! count and is then consumed into a single-pass [`BatchStream`].

pub mod factory;
pub mod traits;

pub use factory::create_warehouse_client;
pub use traits::{BatchStream, QueryHandle, WarehouseClient};
