//! Database module: subscriber records and the SQLite repository.
//!
//! - `model`: storage-side records returned by the repository.
//! - `repo`: SQL functions, the `SubscriberStore` seam and its SQLite implementation.
//! - `error`: the store error taxonomy.
//!
//! External modules should import from `mailing_list::db`; the repository API
//! and models are re-exported here.

pub mod error;
pub mod model;
pub mod repo;

pub use error::{StoreError, StoreResult};
pub use model::{PageParams, Subscriber};
pub use repo::*;
