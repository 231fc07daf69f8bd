//! Practical-fraction rounding
//!
//! Raw scaled quantities like 1.3333 cups are useless at the counter; this
//! module rounds them to amounts a cook can actually measure.

use super::units::{Unit, UnitCategory, UnitSystem};

/// Fractions that map onto common measuring cups and spoons
///
/// Ascending; the final 1.0 entry means "round up to the next whole".
const PRACTICAL_FRACTIONS: [f64; 7] = [
    1.0 / 8.0,
    1.0 / 4.0,
    1.0 / 3.0,
    1.0 / 2.0,
    2.0 / 3.0,
    3.0 / 4.0,
    1.0,
];

/// Fractional parts below this are dropped entirely
const DROP_THRESHOLD: f64 = 0.0625;

/// Quantities below this keep two decimals instead of snapping
const SMALL_QUANTITY: f64 = 0.125;

/// Round a quantity to a practical, cook-friendly amount
///
/// - Quantities under 0.125 keep two decimal places.
/// - Count units round to the nearest half item.
/// - Imprecise units round to the nearest whole.
/// - Metric measures keep two decimals; fractions are a US-measure habit.
/// - US volume and weight snap the fractional part to the nearest
///   practical fraction, with ties going to the larger fraction.
pub fn round_to_practical(quantity: f64, unit: Unit) -> f64 {
    if quantity < SMALL_QUANTITY {
        return round_decimals(quantity);
    }

    match unit.category() {
        UnitCategory::Count => (quantity * 2.0).round() / 2.0,
        UnitCategory::Imprecise => quantity.round(),
        UnitCategory::Volume | UnitCategory::Weight => {
            if unit.system() == Some(UnitSystem::Metric) {
                return round_decimals(quantity);
            }

            let whole = quantity.trunc();
            let frac = quantity - whole;
            if frac < DROP_THRESHOLD {
                return whole;
            }

            // Ties go to the later (larger) candidate.
            let mut snapped = PRACTICAL_FRACTIONS[0];
            let mut best = (frac - snapped).abs();
            for candidate in PRACTICAL_FRACTIONS.iter().skip(1) {
                let dist = (frac - candidate).abs();
                if dist <= best {
                    best = dist;
                    snapped = *candidate;
                }
            }
            // Snapping to 1.0 lands on the next whole.
            whole + snapped
        }
    }
}

fn round_decimals(quantity: f64) -> f64 {
    (quantity * 100.0).round() / 100.0
}

/// Render a quantity with its practical fraction for display
///
/// `1.5` becomes `"1 1/2"`, a bare third becomes `"1/3"`; quantities that
/// carry no practical fraction print as plain decimals. Display only; the
/// output is never parsed back into arithmetic.
pub fn format_quantity(quantity: f64) -> String {
    const LABELS: [(f64, &str); 6] = [
        (1.0 / 8.0, "1/8"),
        (1.0 / 4.0, "1/4"),
        (1.0 / 3.0, "1/3"),
        (1.0 / 2.0, "1/2"),
        (2.0 / 3.0, "2/3"),
        (3.0 / 4.0, "3/4"),
    ];

    let whole = quantity.trunc();
    let frac = quantity - whole;

    if frac.abs() < 1e-9 {
        return format!("{}", whole as i64);
    }

    for (value, label) in LABELS {
        if (frac - value).abs() < 1e-9 {
            return if whole >= 1.0 {
                format!("{} {}", whole as i64, label)
            } else {
                label.to_string()
            };
        }
    }

    format!("{}", quantity)
}
