pub mod algorithm;
pub mod basic_terminal;
pub mod config;
pub mod error;
pub mod input;
pub mod patch;
pub mod validate;

pub use error::{Error, Result};
