//! Application orchestration module

pub mod execution;
pub mod initialization;
pub mod root;

pub use execution::{run, run_batch, BatchOptions};
pub use initialization::{
    configure_logging,
    create_colour_manager,
    create_enumerator,
    create_formatter,
    load_configuration,
};
pub use root::resolve_root;
