//! Goal attainment tracking.
//!
//! Percent-of-goal per nutrient, the macro-ratio display split, the
//! composite day-level achievement boolean, and the range-report summaries
//! (per-day rows, averages, achievement rates).

use serde::Serialize;
use time::Date;

use super::types::Nutrients;

/// Target values for every tracked nutrient. `Default` carries the standard
/// constants applied whenever a user has no stored goal; injected into the
/// tracker and the recommendation generator so tests can override them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalTargets {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
}

impl Default for GoalTargets {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 75.0,
            carbs: 250.0,
            fat: 65.0,
            fiber: 25.0,
            sugar: 50.0,
            sodium: 2300.0,
        }
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Percent of goal reached, one decimal. A goal of zero yields 0, not an
/// error; this fallback intentionally differs from the macro-ratio display
/// fallback below.
pub fn percent_of_goal(total: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        round1(total / goal * 100.0)
    } else {
        0.0
    }
}

pub fn percent_of_goals(totals: &Nutrients, goals: &GoalTargets) -> Nutrients {
    Nutrients {
        calories: percent_of_goal(totals.calories, goals.calories),
        protein: percent_of_goal(totals.protein, goals.protein),
        carbs: percent_of_goal(totals.carbs, goals.carbs),
        fat: percent_of_goal(totals.fat, goals.fat),
        fiber: percent_of_goal(totals.fiber, goals.fiber),
        sugar: percent_of_goal(totals.sugar, goals.sugar),
        sodium: percent_of_goal(totals.sodium, goals.sodium),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroRatio {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Display constants used when the macro-calorie sum is zero. A display
/// default, not a computed ratio.
const MACRO_RATIO_FALLBACK: MacroRatio = MacroRatio {
    protein: 25.0,
    carbs: 45.0,
    fat: 30.0,
};

/// Share of calories contributed by each macro of a stored goal, one
/// decimal. Protein and carbs count 4 kcal/g, fat 9 kcal/g.
pub fn macro_ratio(protein_g: f64, carbs_g: f64, fat_g: f64) -> MacroRatio {
    let protein_kcal = protein_g * 4.0;
    let carbs_kcal = carbs_g * 4.0;
    let fat_kcal = fat_g * 9.0;
    let total = protein_kcal + carbs_kcal + fat_kcal;

    if total > 0.0 {
        MacroRatio {
            protein: round1(protein_kcal / total * 100.0),
            carbs: round1(carbs_kcal / total * 100.0),
            fat: round1(fat_kcal / total * 100.0),
        }
    } else {
        MACRO_RATIO_FALLBACK
    }
}

/// The composite day-level achievement boolean used by range reports:
/// calories within [0.8x, 2x] of goal, protein and carbs each at least 80%.
/// Fat and the remaining nutrients are not part of this check.
pub fn day_goal_achieved(totals: &Nutrients, goals: &GoalTargets) -> bool {
    totals.calories <= goals.calories * 2.0
        && totals.calories >= goals.calories * 0.8
        && totals.protein >= goals.protein * 0.8
        && totals.carbs >= goals.carbs * 0.8
}

/// One row of a range report. Values are rounded to whole units for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaySummary {
    pub date: Date,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub goal_achieved: bool,
}

pub fn summarize_day(date: Date, totals: &Nutrients, goals: &GoalTargets) -> DaySummary {
    DaySummary {
        date,
        calories: totals.calories.round(),
        protein: totals.protein.round(),
        carbs: totals.carbs.round(),
        fat: totals.fat.round(),
        goal_achieved: day_goal_achieved(totals, goals),
    }
}

/// Zero-filled row for a date with no recorded intake; never achieved.
pub fn empty_day(date: Date) -> DaySummary {
    DaySummary {
        date,
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
        goal_achieved: false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeAverages {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Per-day averages over a range report; calories to whole kcal, macros to
/// one decimal. An empty range averages to zero.
pub fn range_averages(days: &[DaySummary]) -> RangeAverages {
    if days.is_empty() {
        return RangeAverages {
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
        };
    }
    let n = days.len() as f64;
    RangeAverages {
        calories: (days.iter().map(|d| d.calories).sum::<f64>() / n).round(),
        protein: round1(days.iter().map(|d| d.protein).sum::<f64>() / n),
        carbs: round1(days.iter().map(|d| d.carbs).sum::<f64>() / n),
        fat: round1(days.iter().map(|d| d.fat).sum::<f64>() / n),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AchievementRates {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Fraction of days in range meeting each nutrient's threshold, as a
/// percentage with one decimal. Calories uses the composite day boolean;
/// protein requires 90% of goal; carbs and fat require 110% of goal, a
/// deliberately stricter bar than the day-level 80% check.
pub fn achievement_rates(days: &[DaySummary], goals: &GoalTargets) -> AchievementRates {
    if days.is_empty() {
        return AchievementRates {
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
        };
    }
    let n = days.len() as f64;
    let rate = |count: usize| round1(count as f64 / n * 100.0);

    AchievementRates {
        calories: rate(days.iter().filter(|d| d.goal_achieved).count()),
        protein: rate(
            days.iter()
                .filter(|d| d.protein >= goals.protein * 0.9)
                .count(),
        ),
        carbs: rate(
            days.iter()
                .filter(|d| d.carbs >= goals.carbs * 1.1)
                .count(),
        ),
        fat: rate(days.iter().filter(|d| d.fat >= goals.fat * 1.1).count()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn totals(calories: f64, protein: f64, carbs: f64, fat: f64) -> Nutrients {
        Nutrients {
            calories,
            protein,
            carbs,
            fat,
            ..Nutrients::zero()
        }
    }

    #[test]
    fn percent_of_zero_goal_is_zero() {
        assert_eq!(percent_of_goal(123.4, 0.0), 0.0);
        assert_eq!(percent_of_goal(0.0, 0.0), 0.0);
        assert_eq!(percent_of_goal(-5.0, 0.0), 0.0);
    }

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(percent_of_goal(2500.0, 2000.0), 125.0);
        assert_eq!(percent_of_goal(1.0, 3.0), 33.3);
        assert_eq!(percent_of_goal(2.0, 3.0), 66.7);
    }

    #[test]
    fn macro_ratio_of_standard_goal() {
        // 75*4 + 250*4 + 65*9 = 300 + 1000 + 585 = 1885 kcal
        let ratio = macro_ratio(75.0, 250.0, 65.0);
        assert_eq!(ratio.protein, 15.9);
        assert_eq!(ratio.carbs, 53.1);
        assert_eq!(ratio.fat, 31.0);
    }

    #[test]
    fn macro_ratio_zero_falls_back_to_display_constants() {
        let ratio = macro_ratio(0.0, 0.0, 0.0);
        assert_eq!(ratio.protein, 25.0);
        assert_eq!(ratio.carbs, 45.0);
        assert_eq!(ratio.fat, 30.0);
    }

    #[test]
    fn day_achievement_requires_all_thresholds() {
        let goals = GoalTargets::default();

        // calories 2500 <= 4000 and >= 1600, protein 60 >= 60, carbs 150 < 200
        assert!(!day_goal_achieved(&totals(2500.0, 60.0, 150.0, 0.0), &goals));

        assert!(day_goal_achieved(&totals(2000.0, 75.0, 250.0, 0.0), &goals));

        // protein below 80% of goal fails regardless of the rest
        assert!(!day_goal_achieved(&totals(2000.0, 59.9, 250.0, 100.0), &goals));

        // overeating beyond 2x the calorie goal fails
        assert!(!day_goal_achieved(&totals(4001.0, 75.0, 250.0, 0.0), &goals));
    }

    #[test]
    fn summarize_day_rounds_for_display() {
        let goals = GoalTargets::default();
        let day = summarize_day(
            date!(2025 - 03 - 01),
            &totals(1999.6, 74.4, 250.2, 64.9),
            &goals,
        );
        assert_eq!(day.calories, 2000.0);
        assert_eq!(day.protein, 74.0);
        assert_eq!(day.carbs, 250.0);
        assert_eq!(day.fat, 65.0);
        // achievement is evaluated on the unrounded totals
        assert!(day.goal_achieved);
    }

    #[test]
    fn empty_day_is_zero_filled_and_not_achieved() {
        let day = empty_day(date!(2025 - 03 - 02));
        assert_eq!(day.calories, 0.0);
        assert_eq!(day.protein, 0.0);
        assert!(!day.goal_achieved);
    }

    #[test]
    fn averages_round_per_field() {
        let goals = GoalTargets::default();
        let days = [
            summarize_day(date!(2025 - 03 - 01), &totals(2500.0, 60.0, 150.0, 80.0), &goals),
            empty_day(date!(2025 - 03 - 02)),
            empty_day(date!(2025 - 03 - 03)),
        ];
        let avg = range_averages(&days);
        assert_eq!(avg.calories, 833.0);
        assert_eq!(avg.protein, 20.0);
        assert_eq!(avg.carbs, 50.0);
        assert_eq!(avg.fat, 26.7);
    }

    #[test]
    fn averages_of_empty_range_are_zero() {
        let avg = range_averages(&[]);
        assert_eq!(avg.calories, 0.0);
        assert_eq!(avg.fat, 0.0);
    }

    #[test]
    fn achievement_rates_use_per_nutrient_thresholds() {
        let goals = GoalTargets::default();
        // protein bar: 67.5, carbs bar: 275, fat bar: 71.5
        let days = [
            summarize_day(date!(2025 - 03 - 01), &totals(2000.0, 70.0, 280.0, 80.0), &goals),
            summarize_day(date!(2025 - 03 - 02), &totals(1000.0, 68.0, 270.0, 60.0), &goals),
            empty_day(date!(2025 - 03 - 03)),
        ];
        let rates = achievement_rates(&days, &goals);
        assert_eq!(rates.calories, 33.3); // only day 1 hits the composite bar
        assert_eq!(rates.protein, 66.7); // 70 and 68 are both >= 67.5
        assert_eq!(rates.carbs, 33.3); // 280 >= 275, 270 is not
        assert_eq!(rates.fat, 33.3); // 80 >= 71.5, 60 is not
    }

    #[test]
    fn achievement_rates_of_empty_range_are_zero() {
        let rates = achievement_rates(&[], &GoalTargets::default());
        assert_eq!(rates.calories, 0.0);
        assert_eq!(rates.protein, 0.0);
    }
}
