//! Ensemble training and evaluation.
//!
//! Responsibilities:
//!
//! - seeded train/test split (`split`)
//! - fit N independently seeded forests (`ensemble`)
//! - reduce member outputs to an interval (`predictor`)
//! - held-out metrics on the raw interval (`evaluate`)

pub mod ensemble;
pub mod evaluate;
pub mod predictor;
pub mod split;

pub use ensemble::*;
pub use evaluate::*;
pub use predictor::*;
pub use split::*;
