pub mod app;
pub mod cli;
pub mod config;
pub mod display;
pub mod encoding;
pub mod enumerate;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod normalize;
pub mod process;
pub mod rewrite;
