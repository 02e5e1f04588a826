//! Command line parsing

pub mod args;
pub mod enhanced_parser;

pub use args::{Args, ClangFormatArgs, Command, JavaFormatArgs, TargetArgs};
