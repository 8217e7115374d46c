//! Recommended-goal computation.
//!
//! Harris-Benedict BMR, scaled by activity level, adjusted for the user's
//! goal, floored at 1200 kcal, then split into macro grams. The function is
//! total over a complete biometric profile; unknown activity/goal strings
//! parse to their documented defaults instead of failing.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Anything that is not `male` uses the female coefficients.
    pub fn parse(s: &str) -> Self {
        match s {
            "male" => Gender::Male,
            _ => Gender::Female,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [&'static str; 5] = ["sedentary", "light", "moderate", "active", "very_active"];

    /// Unknown values fall back to sedentary (multiplier 1.2).
    pub fn parse(s: &str) -> Self {
        match s {
            "light" => ActivityLevel::Light,
            "moderate" => ActivityLevel::Moderate,
            "active" => ActivityLevel::Active,
            "very_active" => ActivityLevel::VeryActive,
            _ => ActivityLevel::Sedentary,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalKind {
    Maintain,
    LoseWeight,
    GainWeight,
    GainMuscle,
}

impl GoalKind {
    pub const ALL: [&'static str; 4] = ["maintain", "lose_weight", "gain_weight", "gain_muscle"];

    /// Unknown values fall back to maintain (no calorie adjustment).
    pub fn parse(s: &str) -> Self {
        match s {
            "lose_weight" => GoalKind::LoseWeight,
            "gain_weight" => GoalKind::GainWeight,
            "gain_muscle" => GoalKind::GainMuscle,
            _ => GoalKind::Maintain,
        }
    }

    fn calorie_adjustment(self) -> f64 {
        match self {
            GoalKind::Maintain => 0.0,
            GoalKind::LoseWeight => -500.0,
            GoalKind::GainWeight => 500.0,
            GoalKind::GainMuscle => 300.0,
        }
    }

    /// Fraction of total calories assigned to each macro.
    fn macro_split(self) -> MacroSplit {
        match self {
            GoalKind::GainMuscle => MacroSplit {
                protein: 0.30,
                fat: 0.25,
                carbs: 0.45,
            },
            GoalKind::LoseWeight => MacroSplit {
                protein: 0.35,
                fat: 0.30,
                carbs: 0.35,
            },
            GoalKind::Maintain | GoalKind::GainWeight => MacroSplit {
                protein: 0.25,
                fat: 0.30,
                carbs: 0.45,
            },
        }
    }
}

struct MacroSplit {
    protein: f64,
    fat: f64,
    carbs: f64,
}

/// A complete biometric profile. Callers must ensure completeness before
/// invoking the formula; it is not defined for partial profiles.
#[derive(Debug, Clone, Copy)]
pub struct BiometricProfile {
    pub gender: Gender,
    pub age: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity: ActivityLevel,
    pub goal: GoalKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecommendedGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

const MIN_CALORIES: f64 = 1200.0;

const PROTEIN_KCAL_PER_G: f64 = 4.0;
const CARBS_KCAL_PER_G: f64 = 4.0;
const FAT_KCAL_PER_G: f64 = 9.0;

pub fn recommended_goals(profile: &BiometricProfile) -> RecommendedGoals {
    let bmr = match profile.gender {
        Gender::Male => {
            88.362 + 13.397 * profile.weight_kg + 4.799 * profile.height_cm
                - 5.677 * profile.age as f64
        }
        Gender::Female => {
            447.593 + 9.247 * profile.weight_kg + 3.098 * profile.height_cm
                - 4.330 * profile.age as f64
        }
    };

    let tdee = bmr * profile.activity.multiplier();
    let calories = (tdee + profile.goal.calorie_adjustment()).round().max(MIN_CALORIES);

    let split = profile.goal.macro_split();
    // Each macro rounds independently; the three gram values need not
    // reconstruct the rounded calorie total exactly.
    RecommendedGoals {
        calories,
        protein: (calories * split.protein / PROTEIN_KCAL_PER_G).round(),
        carbs: (calories * split.carbs / CARBS_KCAL_PER_G).round(),
        fat: (calories * split.fat / FAT_KCAL_PER_G).round(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(
        gender: Gender,
        age: i32,
        weight_kg: f64,
        height_cm: f64,
        activity: ActivityLevel,
        goal: GoalKind,
    ) -> BiometricProfile {
        BiometricProfile {
            gender,
            age,
            height_cm,
            weight_kg,
            activity,
            goal,
        }
    }

    #[test]
    fn moderate_male_maintain() {
        // BMR = 88.362 + 13.397*70 + 4.799*175 - 5.677*30 = 1695.667
        // TDEE = 1695.667 * 1.55 = 2628.28, rounds to 2628 kcal
        let goals = recommended_goals(&profile(
            Gender::Male,
            30,
            70.0,
            175.0,
            ActivityLevel::Moderate,
            GoalKind::Maintain,
        ));
        assert_eq!(goals.calories, 2628.0);
        assert_eq!(goals.protein, 164.0); // 2628*0.25/4 = 164.25
        assert_eq!(goals.carbs, 296.0); // 2628*0.45/4 = 295.65
        assert_eq!(goals.fat, 88.0); // 2628*0.30/9 = 87.6
    }

    #[test]
    fn female_formula_is_the_default_branch() {
        let f = recommended_goals(&profile(
            Gender::Female,
            25,
            60.0,
            165.0,
            ActivityLevel::Light,
            GoalKind::Maintain,
        ));
        // BMR = 447.593 + 9.247*60 + 3.098*165 - 4.330*25 = 1405.333
        // TDEE = 1405.333 * 1.375 = 1932.33, rounds to 1932
        assert_eq!(f.calories, 1932.0);
    }

    #[test]
    fn calories_never_drop_below_floor() {
        let goals = recommended_goals(&profile(
            Gender::Female,
            80,
            40.0,
            150.0,
            ActivityLevel::Sedentary,
            GoalKind::LoseWeight,
        ));
        assert_eq!(goals.calories, 1200.0);

        for (gender, age, weight, height) in [
            (Gender::Male, 18, 50.0, 160.0),
            (Gender::Female, 90, 38.0, 145.0),
            (Gender::Male, 75, 55.0, 155.0),
        ] {
            for activity in [
                ActivityLevel::Sedentary,
                ActivityLevel::Light,
                ActivityLevel::Moderate,
                ActivityLevel::Active,
                ActivityLevel::VeryActive,
            ] {
                for goal in [
                    GoalKind::Maintain,
                    GoalKind::LoseWeight,
                    GoalKind::GainWeight,
                    GoalKind::GainMuscle,
                ] {
                    let g =
                        recommended_goals(&profile(gender, age, weight, height, activity, goal));
                    assert!(g.calories >= 1200.0);
                }
            }
        }
    }

    #[test]
    fn gain_muscle_uses_high_protein_split() {
        let goals = recommended_goals(&profile(
            Gender::Male,
            28,
            80.0,
            180.0,
            ActivityLevel::Active,
            GoalKind::GainMuscle,
        ));
        // protein share is 30% of calories at 4 kcal/g
        assert_eq!(goals.protein, (goals.calories * 0.30 / 4.0).round());
        assert_eq!(goals.fat, (goals.calories * 0.25 / 9.0).round());
        assert_eq!(goals.carbs, (goals.calories * 0.45 / 4.0).round());
    }

    #[test]
    fn unknown_strings_parse_to_defaults() {
        assert_eq!(ActivityLevel::parse("couch"), ActivityLevel::Sedentary);
        assert_eq!(GoalKind::parse("bulk"), GoalKind::Maintain);
        assert_eq!(Gender::parse("other"), Gender::Female);
        assert_eq!(ActivityLevel::parse("very_active"), ActivityLevel::VeryActive);
    }
}
