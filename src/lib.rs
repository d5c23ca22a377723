pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use config::AppConfig;
pub use error::{ReportError, Result};
