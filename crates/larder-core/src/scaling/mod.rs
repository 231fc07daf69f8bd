//! Scaling and unit conversion engine
//!
//! Pure arithmetic over recipe quantities: a closed set of kitchen
//! units, conversion through per-category base units, practical
//! rounding to measuring-cup amounts, and whole-ingredient scaling.
//! Nothing in here touches the database.
//!
//! # Architecture
//!
//! - `units` - The `Unit` enum, its categories, and measurement systems
//! - `convert` - Cross-unit conversion, scaling, and system switching
//! - `rounding` - Practical rounding and fraction display
//!
//! # Example
//!
//! ```ignore
//! use larder_core::scaling::{convert_to_system, scale, Unit, UnitSystem};
//!
//! let doubled = scale(&ingredient, 2.0)?;
//! let metric = convert_to_system(&doubled, UnitSystem::Metric);
//! println!("{} {}", metric.quantity, metric.unit);
//! ```

pub mod convert;
pub mod rounding;
pub mod units;

pub use convert::{convert, convert_to_system, scale};
pub use rounding::{format_quantity, round_to_practical};
pub use units::{Unit, UnitCategory, UnitSystem};
