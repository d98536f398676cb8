pub mod allocation_pipeline;

pub use allocation_pipeline::AllocationPipeline;
