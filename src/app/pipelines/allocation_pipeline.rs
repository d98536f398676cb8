use crate::adapters::csv_provider::{CsvDataProvider, InputFiles};
use crate::core::engine::allocate;
use crate::core::export;
use crate::domain::model::InputData;
use crate::domain::ports::{ConfigProvider, DataProvider, Pipeline, Solver, Storage};
use crate::domain::report::{AllocationRun, RunSummary};
use crate::utils::error::Result;
use chrono::Utc;
use std::path::Path;

pub struct AllocationPipeline<S: Storage, C: ConfigProvider, V: Solver> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) solver: V,
}

impl<S: Storage, C: ConfigProvider, V: Solver> AllocationPipeline<S, C, V> {
    pub fn new(storage: S, config: C, solver: V) -> Self {
        Self {
            storage,
            config,
            solver,
        }
    }

    pub fn input_files(&self) -> InputFiles {
        InputFiles::in_dir(
            self.config.input_dir(),
            self.config.projects_file(),
            self.config.people_file(),
            self.config.overrides_file(),
            self.config.roles_file(),
        )
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    fn wants(&self, format: &str) -> bool {
        self.config
            .output_formats()
            .iter()
            .any(|f| f.eq_ignore_ascii_case(format))
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, V: Solver> Pipeline for AllocationPipeline<S, C, V> {
    async fn extract(&self) -> Result<InputData> {
        let files = self.input_files();
        tracing::debug!("Input files: {:?}", files);
        CsvDataProvider::new(&self.storage, files).load().await
    }

    async fn transform(&self, data: InputData) -> Result<AllocationRun> {
        allocate(data, &self.config.capacity(), &self.solver)
    }

    async fn load(&self, run: AllocationRun) -> Result<RunSummary> {
        let generated_at = Utc::now();
        let mut entries: Vec<(String, Vec<u8>)> = Vec::new();

        // 模型檔在非最佳解時也輸出，方便追查不可行的約束
        if self.wants("lp") {
            entries.push((
                export::MODEL_FILE.to_string(),
                run.model.to_lp_string().into_bytes(),
            ));
        }

        if self.wants("json") {
            entries.push((
                export::DIAGNOSTICS_FILE.to_string(),
                export::diagnostics_json(
                    &run.diagnostics,
                    run.status(),
                    run.solution.objective,
                    generated_at,
                )?,
            ));
        }

        if let Some(result) = &run.result {
            if self.wants("csv") {
                entries.push((
                    export::MATRIX_FILE.to_string(),
                    export::matrix_csv(&result.matrix)?,
                ));
                entries.push((
                    export::DETAIL_FILE.to_string(),
                    export::detail_csv(&result.records)?,
                ));
            }
            if self.wants("json") {
                entries.push((
                    export::ALLOCATION_JSON_FILE.to_string(),
                    export::allocation_json(result)?,
                ));
            }
        }

        let mut files = Vec::new();
        let output_path = match self.config.archive_name() {
            Some(archive) => {
                tracing::debug!("Creating ZIP file with {} files", entries.len());
                let zip_data = export::zip_bundle(&entries)?;
                let target = self.output_file(archive);
                self.storage.write_file(&target, &zip_data).await?;
                files.extend(entries.iter().map(|(name, _)| name.clone()));
                target
            }
            None => {
                for (name, data) in &entries {
                    self.storage.write_file(&self.output_file(name), data).await?;
                    files.push(name.clone());
                }
                self.config.output_path().to_string()
            }
        };

        tracing::debug!("Wrote {} artefact(s): {}", files.len(), files.join(", "));

        Ok(RunSummary {
            status: run.status(),
            objective: run.solution.objective,
            output_path,
            files,
            generated_at,
        })
    }
}
