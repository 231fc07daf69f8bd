//! Domain services
//!
//! The three services that own recipe state: `recipe` for the
//! append-only version chains, `heritage` for duplication lineage and
//! archival, `instance` for frozen cooking snapshots. Each wraps its
//! repository and is constructed from a `SqlitePool`.

pub mod heritage;
pub mod instance;
pub mod recipe;
