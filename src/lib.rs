#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// #![warn(clippy::cargo)]

pub mod analysis;
pub mod calibration;
pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod math;
pub mod predict;
pub mod quality;

pub use error::{Error, Result};
