//! # Engine Module
//!
//! The stages of a structure scan and the types they share.
//!
//! A scan of one structure runs, in order: [`source`] (obtain a local file),
//! [`crate::core::io`] (load the coordinate model), [`locator`] (find zinc atoms),
//! [`neighbors`] (radius search around each zinc atom) and [`aggregate`] (reduce hits
//! to one result). [`worker`] strings these together and converts every failure into a
//! tagged outcome so that one bad structure never disturbs another.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod locator;
pub mod neighbors;
pub mod progress;
pub mod source;
pub mod worker;
