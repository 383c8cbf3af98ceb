pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod metrics;
#[cfg(feature = "proxy")]
pub mod proxy;
pub mod report;
pub mod rules;
pub mod session;
pub mod snapshot;
pub mod tracker;

pub use error::{Result, SeoError};
