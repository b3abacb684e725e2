//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - model bundle JSON read/write (`bundle`)
//! - held-out prediction export (`export`)

pub mod bundle;
pub mod export;
pub mod ingest;

pub use bundle::*;
pub use export::*;
pub use ingest::*;
