pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod store;

pub use error::{Error, Result};
