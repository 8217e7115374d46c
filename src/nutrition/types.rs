use serde::{Deserialize, Serialize};

/// Nutrient values over the tracked key set. Used for per-100g catalog
/// figures, meal/day totals, and percent-of-goal maps alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
}

impl Nutrients {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale every value by a multiplier. Portion snapshots are
    /// `per-100g × weight/100`.
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein: self.protein * multiplier,
            carbs: self.carbs * multiplier,
            fat: self.fat * multiplier,
            fiber: self.fiber * multiplier,
            sugar: self.sugar * multiplier,
            sodium: self.sodium * multiplier,
        }
    }

    pub fn get(&self, kind: NutrientKind) -> f64 {
        match kind {
            NutrientKind::Calories => self.calories,
            NutrientKind::Protein => self.protein,
            NutrientKind::Carbs => self.carbs,
            NutrientKind::Fat => self.fat,
            NutrientKind::Fiber => self.fiber,
            NutrientKind::Sugar => self.sugar,
            NutrientKind::Sodium => self.sodium,
        }
    }
}

impl std::ops::Add for Nutrients {
    type Output = Nutrients;

    fn add(self, other: Nutrients) -> Nutrients {
        Nutrients {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
            fiber: self.fiber + other.fiber,
            sugar: self.sugar + other.sugar,
            sodium: self.sodium + other.sodium,
        }
    }
}

impl std::ops::AddAssign for Nutrients {
    fn add_assign(&mut self, other: Nutrients) {
        *self = *self + other;
    }
}

impl std::iter::Sum for Nutrients {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrients::zero(), |acc, n| acc + n)
    }
}

/// One tracked nutrient, used to address catalog queries and value maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutrientKind {
    Calories,
    Protein,
    Carbs,
    Fat,
    Fiber,
    Sugar,
    Sodium,
}

impl NutrientKind {
    /// Column name in `food_nutrition`; also the key used in responses.
    pub fn column(self) -> &'static str {
        match self {
            NutrientKind::Calories => "calories",
            NutrientKind::Protein => "protein",
            NutrientKind::Carbs => "carbs",
            NutrientKind::Fat => "fat",
            NutrientKind::Fiber => "fiber",
            NutrientKind::Sugar => "sugar",
            NutrientKind::Sodium => "sodium",
        }
    }
}
