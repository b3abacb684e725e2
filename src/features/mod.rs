//! Feature encoding shared by training and prediction.
//!
//! - categorical code tables (`encoder`)
//! - fixed-order feature vector derivations (`vector`)

pub mod encoder;
pub mod vector;

pub use encoder::*;
pub use vector::*;
