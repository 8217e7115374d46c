//! Totals aggregation.
//!
//! The same reduction is applied at meal granularity (one meal's entries),
//! day granularity (every entry across a day's meals) and range granularity
//! (one day total per calendar date). Day totals are always re-summed from
//! the source entries; there is no cached running total anywhere.

use super::types::Nutrients;

/// The nutrient snapshot stored on a food entry. Every value is optional:
/// older rows and unresolved foods may carry NULLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NutrientSnapshot {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
}

/// A missing or non-finite value contributes zero; one malformed entry must
/// never abort the whole aggregation.
fn value(v: Option<f64>) -> f64 {
    v.filter(|x| x.is_finite()).unwrap_or(0.0)
}

/// Sum a collection of entry snapshots. Empty input yields all-zero totals.
pub fn sum_nutrients<I>(entries: I) -> Nutrients
where
    I: IntoIterator<Item = NutrientSnapshot>,
{
    let mut totals = Nutrients::zero();
    for e in entries {
        totals += Nutrients {
            calories: value(e.calories),
            protein: value(e.protein),
            carbs: value(e.carbs),
            fat: value(e.fat),
            fiber: value(e.fiber),
            sugar: value(e.sugar),
            sodium: value(e.sodium),
        };
    }
    totals
}
