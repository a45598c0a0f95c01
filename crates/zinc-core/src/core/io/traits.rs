use super::error::ParseError;
use crate::core::models::structure::CoordinateModel;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading a structure file format into a coordinate model.
pub trait StructureFile {
    /// Reads a coordinate model from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is malformed, truncated, or contains no atoms.
    fn read_from(reader: &mut impl BufRead) -> Result<CoordinateModel, ParseError>;

    /// Reads a coordinate model from a file path.
    ///
    /// When the file itself carries no identifier, the upper-cased file stem is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<CoordinateModel, ParseError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut model = Self::read_from(&mut reader)?;
        if model.id.is_empty() {
            model.id = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_ascii_uppercase())
                .unwrap_or_default();
        }
        Ok(model)
    }
}
