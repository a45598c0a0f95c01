//! # zincscan Core Library
//!
//! Surveys macromolecular structures for chemical groups sitting close to zinc ions.
//! For every structure the library reports the distinct ligand names found within a
//! fixed radius of any zinc atom, together with the closest observed distance.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Immutable coordinate models (`CoordinateModel`,
//!   `Atom`, `Residue`), chemistry tables, and structure file readers (mmCIF, PDB).
//!
//! - **[`engine`]: The Pipeline Stages.** Zinc location, radius-bounded neighbor search,
//!   ligand aggregation and the per-structure scan worker, together with the
//!   configuration, error and progress types they share.
//!
//! - **[`workflows`]: The Public API.** Fans a list of structure identifiers out to a
//!   bounded worker pool and collects every outcome into a ranked result table.

pub mod core;
pub mod engine;
pub mod workflows;
