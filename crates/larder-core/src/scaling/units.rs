//! Measurement units and systems
//!
//! Defines the closed set of ingredient units, their categories, and the
//! US/metric system split used by conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement category a unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitCategory {
    /// Liquid measures, convertible through milliliters
    Volume,
    /// Mass measures, convertible through grams
    Weight,
    /// Discrete items (piece, dozen)
    Count,
    /// Measures with no fixed size (pinch, dash, to taste)
    Imprecise,
}

/// Measurement system used for display and conversion targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    Us,
    Metric,
}

impl UnitSystem {
    /// Create from string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "us" => Some(Self::Us),
            "metric" => Some(Self::Metric),
            _ => None,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Metric => "metric",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of ingredient units
///
/// The string form (serde and `as_str`) is the snake_case name used in
/// stored JSON and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    // US volume
    Tsp,
    Tbsp,
    FlOz,
    Cup,
    Pint,
    Quart,
    Gallon,
    // Metric volume
    Ml,
    L,
    // US weight
    Oz,
    Lb,
    // Metric weight
    G,
    Kg,
    // Count
    Piece,
    Dozen,
    // Imprecise
    Pinch,
    Dash,
    ToTaste,
}

impl Unit {
    /// Every unit, in declaration order
    pub const ALL: [Unit; 18] = [
        Self::Tsp,
        Self::Tbsp,
        Self::FlOz,
        Self::Cup,
        Self::Pint,
        Self::Quart,
        Self::Gallon,
        Self::Ml,
        Self::L,
        Self::Oz,
        Self::Lb,
        Self::G,
        Self::Kg,
        Self::Piece,
        Self::Dozen,
        Self::Pinch,
        Self::Dash,
        Self::ToTaste,
    ];

    /// Create from string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tsp" => Some(Self::Tsp),
            "tbsp" => Some(Self::Tbsp),
            "fl_oz" => Some(Self::FlOz),
            "cup" => Some(Self::Cup),
            "pint" => Some(Self::Pint),
            "quart" => Some(Self::Quart),
            "gallon" => Some(Self::Gallon),
            "ml" => Some(Self::Ml),
            "l" => Some(Self::L),
            "oz" => Some(Self::Oz),
            "lb" => Some(Self::Lb),
            "g" => Some(Self::G),
            "kg" => Some(Self::Kg),
            "piece" => Some(Self::Piece),
            "dozen" => Some(Self::Dozen),
            "pinch" => Some(Self::Pinch),
            "dash" => Some(Self::Dash),
            "to_taste" => Some(Self::ToTaste),
            _ => None,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tsp => "tsp",
            Self::Tbsp => "tbsp",
            Self::FlOz => "fl_oz",
            Self::Cup => "cup",
            Self::Pint => "pint",
            Self::Quart => "quart",
            Self::Gallon => "gallon",
            Self::Ml => "ml",
            Self::L => "l",
            Self::Oz => "oz",
            Self::Lb => "lb",
            Self::G => "g",
            Self::Kg => "kg",
            Self::Piece => "piece",
            Self::Dozen => "dozen",
            Self::Pinch => "pinch",
            Self::Dash => "dash",
            Self::ToTaste => "to_taste",
        }
    }

    /// Measurement category of this unit
    pub fn category(&self) -> UnitCategory {
        match self {
            Self::Tsp
            | Self::Tbsp
            | Self::FlOz
            | Self::Cup
            | Self::Pint
            | Self::Quart
            | Self::Gallon
            | Self::Ml
            | Self::L => UnitCategory::Volume,
            Self::Oz | Self::Lb | Self::G | Self::Kg => UnitCategory::Weight,
            Self::Piece | Self::Dozen => UnitCategory::Count,
            Self::Pinch | Self::Dash | Self::ToTaste => UnitCategory::Imprecise,
        }
    }

    /// Measurement system this unit belongs to, if any
    ///
    /// Count and imprecise units belong to no system and are never
    /// converted.
    pub fn system(&self) -> Option<UnitSystem> {
        match self {
            Self::Tsp
            | Self::Tbsp
            | Self::FlOz
            | Self::Cup
            | Self::Pint
            | Self::Quart
            | Self::Gallon
            | Self::Oz
            | Self::Lb => Some(UnitSystem::Us),
            Self::Ml | Self::L | Self::G | Self::Kg => Some(UnitSystem::Metric),
            Self::Piece | Self::Dozen | Self::Pinch | Self::Dash | Self::ToTaste => None,
        }
    }

    /// Whether this unit participates in cross-unit conversion
    pub fn is_convertible(&self) -> bool {
        matches!(self.category(), UnitCategory::Volume | UnitCategory::Weight)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
