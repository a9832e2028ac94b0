//! CLI library for testing purposes

pub mod config;
pub mod menu;
pub mod merge;
pub mod path_glob;
pub mod validation;

pub use config::{StrategyChoice, TsMergeConfig, load_config};
pub use merge::{MergeArgs, run_merge_command};
pub use path_glob::expand_inputs;
