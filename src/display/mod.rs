//! Console presentation: colours, per-file lines and the run summary

pub mod colours;
pub mod config;
pub mod format;
pub mod report;

pub use colours::*;
pub use config::*;
pub use format::*;
pub use report::*;
