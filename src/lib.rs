pub mod archive;
pub mod backup;
pub mod cli;
pub mod clone;
pub mod config;
pub mod contract;
pub mod encrypt;
pub mod load_config;
pub mod upload;
pub mod workspace;

pub use cli::{run, Cli, Commands};
