//! Recipe lineage and archival
//!
//! Duplicating a recipe records where it came from; archiving hides a
//! recipe from everyday listings without severing anything. Both live
//! in `HeritageGraph`.

pub mod graph;

pub use graph::{Heritage, HeritageGraph};
