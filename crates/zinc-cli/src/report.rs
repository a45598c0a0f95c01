//! Result sink: the ranked table and the post-scan summary.

use crate::error::Result;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use zincscan::engine::aggregate::StructureResult;
use zincscan::workflows::scan::ScanReport;

const COLUMNS: [&str; 4] = ["PDB_ID", "LigandNames", "MinDistance", "LigandDistances"];
const SHEET_NAME: &str = "zinc_ligands";

#[derive(Debug, Serialize)]
struct TableRow<'a> {
    #[serde(rename = "PDB_ID")]
    pdb_id: &'a str,
    #[serde(rename = "LigandNames")]
    ligand_names: String,
    #[serde(rename = "MinDistance")]
    min_distance: String,
    #[serde(rename = "LigandDistances")]
    ligand_distances: String,
}

impl<'a> From<&'a StructureResult> for TableRow<'a> {
    fn from(result: &'a StructureResult) -> Self {
        Self {
            pdb_id: &result.identifier,
            ligand_names: result.ligand_names.join(", "),
            min_distance: format_distance(result.min_distance),
            ligand_distances: result
                .closest_by_ligand
                .iter()
                .map(|(name, distance)| format!("{name}:{}", format_distance(*distance)))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn format_distance(distance: f64) -> String {
    format!("{distance:.2}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Delimited(u8),
    Spreadsheet,
}

impl TableFormat {
    /// `.xlsx` is a spreadsheet, `.tsv` is tab-separated, anything else is CSV.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Self::Spreadsheet,
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Self::Delimited(b'\t'),
            _ => Self::Delimited(b','),
        }
    }
}

/// Writes the result table to `path`, creating parent directories as needed.
pub fn write_table(results: &[StructureResult], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    match TableFormat::for_path(path) {
        TableFormat::Spreadsheet => write_workbook(results, path),
        TableFormat::Delimited(delimiter) => {
            let file = std::fs::File::create(path)?;
            write_table_to(results, file, delimiter)
        }
    }
}

/// One worksheet with a bold header row. `MinDistance` is stored as a number shown
/// with two decimals; the other columns are text.
fn write_workbook(results: &[StructureResult], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let distance = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, title) in (0u16..).zip(COLUMNS) {
        sheet.write_string_with_format(0, col, title, &header)?;
    }
    for (row, result) in (1u32..).zip(results) {
        let text = TableRow::from(result);
        sheet.write_string(row, 0, text.pdb_id)?;
        sheet.write_string(row, 1, &text.ligand_names)?;
        sheet.write_number_with_format(row, 2, round_distance(result.min_distance), &distance)?;
        sheet.write_string(row, 3, &text.ligand_distances)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn round_distance(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}

pub fn write_table_to<W: Write>(results: &[StructureResult], writer: W, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    if results.is_empty() {
        writer.write_record(COLUMNS)?;
    }
    for result in results {
        writer.serialize(TableRow::from(result))?;
    }
    writer.flush()?;
    Ok(())
}

/// Human-readable summary: outcome counts, then one line per failed structure.
pub fn render_summary(report: &ScanReport) -> String {
    let mut text = format!("Scan summary: {}", report.summary());
    for failure in &report.failures {
        let _ = write!(
            text,
            "\n  {} failed at {} stage: {}",
            failure.identifier, failure.stage, failure.message
        );
    }
    text
}
