//! Command implementations

mod setup;

pub use setup::cmd_setup;
