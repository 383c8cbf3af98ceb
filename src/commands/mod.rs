//! Command implementations for seocheck CLI

mod analyze;
mod misc;
mod review;

pub use analyze::*;
pub use misc::*;
pub use review::*;
