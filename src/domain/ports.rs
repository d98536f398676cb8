use crate::domain::lp::{Model, Solution};
use crate::domain::model::{CapacityPolicy, InputData};
use crate::domain::report::{AllocationRun, RunSummary};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// Where the input tables live and where results go.
pub trait ConfigProvider: Send + Sync {
    fn input_dir(&self) -> &str;
    fn projects_file(&self) -> &str;
    fn people_file(&self) -> &str;
    fn overrides_file(&self) -> Option<&str>;
    fn roles_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn capacity(&self) -> CapacityPolicy;
    fn output_formats(&self) -> Vec<String>;
    /// ZIP bundle name when compression is enabled.
    fn archive_name(&self) -> Option<&str>;
}

/// Opaque LP engine: takes a model, returns a verdict and, when optimal,
/// a value for every variable.
pub trait Solver: Send + Sync {
    fn name(&self) -> &str;
    fn solve(&self, model: &Model) -> Result<Solution>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<InputData>;
    async fn transform(&self, data: InputData) -> Result<AllocationRun>;
    async fn load(&self, run: AllocationRun) -> Result<RunSummary>;
}

/// Data-provider seam between storage and the model code.
pub trait DataProvider: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<InputData>> + Send;
}
