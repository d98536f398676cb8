pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use adapters::{csv_provider::CsvDataProvider, solver::MicroLpSolver, storage::LocalStorage};
pub use app::pipelines::AllocationPipeline;
pub use core::engine::{allocate, AllocationEngine};
pub use utils::error::{AllocError, Result};
