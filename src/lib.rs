//! `salary-compass` library crate.
//!
//! The binary (`compass`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - a trained bundle can be loaded and queried from other front-ends

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod fit;
pub mod io;
pub mod market;
pub mod math;
pub mod models;
pub mod report;
