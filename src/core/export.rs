//! Serialized forms of a finished run.

use crate::core::extractor::round_hours;
use crate::domain::lp::SolverStatus;
use crate::domain::model::{AllocationMatrix, AllocationRecord, AllocationResult};
use crate::domain::report::DiagnosticReport;
use crate::utils::error::{AllocError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

pub const MODEL_FILE: &str = "model.lp";
pub const DIAGNOSTICS_FILE: &str = "diagnostics.json";
pub const MATRIX_FILE: &str = "allocation_matrix.csv";
pub const DETAIL_FILE: &str = "allocation_detail.csv";
pub const ALLOCATION_JSON_FILE: &str = "allocation.json";

/// Rows are projects, columns are people with at least one allocation.
pub fn matrix_csv(matrix: &AllocationMatrix) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    let mut header = Vec::with_capacity(matrix.people.len() + 1);
    header.push("ProjectName".to_string());
    header.extend(matrix.people.iter().cloned());
    wtr.write_record(&header)?;

    for (project, row) in matrix.projects.iter().zip(&matrix.cells) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(project.clone());
        record.extend(row.iter().map(|hours| format!("{:.2}", round_hours(*hours))));
        wtr.write_record(&record)?;
    }

    into_bytes(wtr)
}

pub fn detail_csv(records: &[AllocationRecord]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["ProjectName", "PersonName", "HoursAllocated"])?;
    for record in records {
        let hours = format!("{:.2}", record.hours_allocated);
        wtr.write_record([record.project.as_str(), record.person.as_str(), hours.as_str()])?;
    }
    into_bytes(wtr)
}

fn into_bytes(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    wtr.into_inner().map_err(|e| AllocError::IoError(e.into_error()))
}

#[derive(Debug, Serialize)]
struct DiagnosticsDocument<'a> {
    generated_at: DateTime<Utc>,
    status: String,
    objective: Option<f64>,
    diagnostics: &'a DiagnosticReport,
}

pub fn diagnostics_json(
    report: &DiagnosticReport,
    status: SolverStatus,
    objective: Option<f64>,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let document = DiagnosticsDocument {
        generated_at,
        status: status.to_string(),
        objective,
        diagnostics: report,
    };
    Ok(serde_json::to_vec_pretty(&document)?)
}

pub fn allocation_json(result: &AllocationResult) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(result)?)
}

/// Bundles `(name, bytes)` entries into one ZIP archive.
pub fn zip_bundle(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        zip.start_file(name.as_str(), SimpleFileOptions::default())?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
