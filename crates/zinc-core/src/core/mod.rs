//! # Core Module
//!
//! Stateless building blocks shared by every pipeline stage.
//!
//! - **Coordinate Representation** ([`models`]) - Atoms, residues and the per-structure
//!   coordinate model, plus the chemistry tables that classify residues.
//! - **File I/O** ([`io`]) - Readers that turn mmCIF and PDB files into coordinate models.

pub mod io;
pub mod models;
