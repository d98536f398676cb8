pub mod builder;
pub mod diagnostics;
pub mod engine;
pub mod export;
pub mod extractor;
pub mod naming;

pub use builder::build_model;
pub use diagnostics::run_diagnostics;
pub use engine::{allocate, AllocationEngine};
pub use extractor::extract_results;
