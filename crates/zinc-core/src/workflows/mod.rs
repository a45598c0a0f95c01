//! # Workflows Module
//!
//! High-level entry points that run a complete survey over many structures.
//!
//! ## Overview
//!
//! A workflow owns the concurrency decisions. The per-structure stages in
//! [`crate::engine`] know nothing about each other or about how many of them run at
//! once; the workflow validates the configuration, fans identifiers out to a bounded
//! worker pool, and re-imposes a deterministic order once every outcome is in.
//!
//! - **Scan Workflow** ([`scan`]) - Fetches, loads and searches each structure, then
//!   ranks the structures with zinc ligands by their closest ligand distance.

pub mod scan;
