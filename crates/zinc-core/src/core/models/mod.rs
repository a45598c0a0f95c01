//! # Core Models Module
//!
//! Data structures describing one parsed structure.
//!
//! A [`structure::CoordinateModel`] owns every [`atom::Atom`] and [`residue::Residue`]
//! of a single structure. It is built once per scan through
//! [`builder::CoordinateModelBuilder`] and never mutated afterwards.
//!
//! ```ignore
//! use nalgebra::Point3;
//! use zincscan::core::models::builder::{AtomRecord, CoordinateModelBuilder};
//!
//! let mut builder = CoordinateModelBuilder::new("1ABC");
//! builder.add_atom(AtomRecord::new("ZN", "ZN", "ZN", "A", 301, Point3::origin()).hetero());
//! let model = builder.build();
//! assert_eq!(model.atoms().len(), 1);
//! ```

pub mod atom;
pub mod builder;
pub mod chemistry;
pub mod residue;
pub mod structure;
