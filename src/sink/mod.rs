//! Destination side: bulk request transmission.

pub mod bulk;

pub use bulk::{BulkFailure, BulkSender};
