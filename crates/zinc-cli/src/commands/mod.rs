pub mod cache;
pub mod scan;
pub mod search;
