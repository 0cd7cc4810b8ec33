//! Project reports (flat CSV dump or paginated PDF).

use super::Project;
use crate::export::PdfDocument;
use crate::types::{CommandError, Result};
use std::path::Path;
use std::str::FromStr;

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Pdf,
}

impl FromStr for ReportFormat {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "pdf" => Ok(Self::Pdf),
            other => Err(CommandError::syntax(format!(
                "unsupported format '{}' (use PDF or CSV)",
                other
            ))),
        }
    }
}

const CSV_HEADER: [&str; 6] = [
    "name",
    "deadline",
    "priority",
    "assigned_to",
    "status",
    "dependencies",
];

/// Write the project report in the requested format.
///
/// # Errors
///
/// Returns `IoError`/`CsvError` if the file cannot be written
pub fn export_report<P: AsRef<Path>>(
    project: &Project,
    format: ReportFormat,
    path: P,
    delimiter: u8,
) -> Result<()> {
    match format {
        ReportFormat::Csv => export_csv(project, path, delimiter),
        ReportFormat::Pdf => pdf_report(project).save(path),
    }
}

/// One row per task; dependencies are joined with `;`.
pub fn export_csv<P: AsRef<Path>>(project: &Project, path: P, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;

    writer.write_record(CSV_HEADER)?;
    for task in project.tasks() {
        let dependencies = task
            .dependencies
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(";");
        writer.write_record([
            task.name.as_str(),
            task.deadline.as_str(),
            task.priority.as_str(),
            task.assigned_to.as_deref().unwrap_or(""),
            task.status.as_str(),
            dependencies.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Lay the project out as a text document: a title line, then a block per task.
pub fn pdf_report(project: &Project) -> PdfDocument {
    let mut doc = PdfDocument::new(format!("Project: {}", project.name));
    doc.line(format!("Project: {}", project.name));
    for task in project.tasks() {
        doc.line(format!("Task: {}", task.name))
            .line(format!("Deadline: {}", task.deadline))
            .line(format!("Priority: {}", task.priority))
            .line(format!(
                "Assigned to: {}",
                task.assigned_to.as_deref().unwrap_or("-")
            ))
            .line(format!("Status: {}", task.status))
            .blank();
    }
    doc
}
