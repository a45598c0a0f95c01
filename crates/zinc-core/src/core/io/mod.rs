//! Provides input functionality for macromolecular structure file formats.
//!
//! Both readers produce a [`CoordinateModel`] through a common [`traits::StructureFile`]
//! interface. [`load_structure`] picks the reader from the file extension.

pub mod error;
pub mod mmcif;
pub mod pdb;
pub mod traits;

use crate::core::models::structure::CoordinateModel;
use error::ParseError;
use mmcif::MmcifFile;
use pdb::PdbFile;
use std::path::Path;
use traits::StructureFile;

/// Loads a coordinate model from a local structure file.
///
/// `.cif` and `.mmcif` files are read as mmCIF, `.pdb` and `.ent` files as PDB.
///
/// # Errors
///
/// Returns [`ParseError::UnsupportedFormat`] for any other extension, and the
/// reader's error if the file is unreadable, malformed or truncated.
pub fn load_structure(path: &Path) -> Result<CoordinateModel, ParseError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "cif" | "mmcif" => MmcifFile::read_from_path(path),
        "pdb" | "ent" => PdbFile::read_from_path(path),
        _ => Err(ParseError::UnsupportedFormat(path.display().to_string())),
    }
}
