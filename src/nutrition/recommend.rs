//! Gap-based food recommendations.
//!
//! Compares the day's intake against the active goal targets, emits one
//! advisory per triggered nutrient rule (each backed by up to two catalog
//! foods), and, while dinner is still open and a large calorie gap remains,
//! synthesizes a dinner suggestion from catalog components. A rule whose
//! catalog query comes back empty is silently omitted, never an error.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::tracker::GoalTargets;
use super::types::{NutrientKind, Nutrients};

/// The nutrient keys recommendations reason about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IntakeSummary {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

impl From<Nutrients> for IntakeSummary {
    fn from(n: Nutrients) -> Self {
        Self {
            calories: n.calories,
            protein: n.protein,
            carbs: n.carbs,
            fat: n.fat,
            fiber: n.fiber,
        }
    }
}

/// Shortfall between intake and goal per nutrient, floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutrientGaps {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

pub fn nutrient_gaps(current: &IntakeSummary, goals: &GoalTargets) -> NutrientGaps {
    NutrientGaps {
        calories: (goals.calories - current.calories).max(0.0),
        protein: (goals.protein - current.protein).max(0.0),
        carbs: (goals.carbs - current.carbs).max(0.0),
        fat: (goals.fat - current.fat).max(0.0),
        fiber: (goals.fiber - current.fiber).max(0.0),
    }
}

/// A catalog food with its per-100g nutrition, as returned by lookups.
#[derive(Debug, Clone)]
pub struct CatalogFood {
    pub id: Uuid,
    pub name: String,
    pub per_100g: Nutrients,
}

/// Read-side port onto the food catalog. The store-backed implementation
/// lives in the catalog module; tests inject an in-memory fake.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Foods whose per-100g value for `nutrient` exceeds `min_per_100g`,
    /// ordered by that nutrient descending.
    async fn foods_by_nutrient_threshold(
        &self,
        nutrient: NutrientKind,
        min_per_100g: f64,
        limit: i64,
    ) -> anyhow::Result<Vec<CatalogFood>>;

    async fn foods_by_category(&self, category: &str, limit: i64)
        -> anyhow::Result<Vec<CatalogFood>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Protein,
    Fiber,
    Fat,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestedFood {
    pub id: Uuid,
    pub name: String,
    pub serving_size: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    pub calories: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: &'static str,
    pub suggested_foods: Vec<SuggestedFood>,
}

/// One scaled component of a synthesized meal.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestedPortion {
    pub id: Uuid,
    pub name: String,
    pub amount: &'static str,
    pub calories: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealSuggestion {
    pub name: &'static str,
    pub foods: Vec<SuggestedPortion>,
    pub totals: IntakeSummary,
}

#[derive(Debug, Serialize)]
pub struct RecommendationReport {
    pub gaps: NutrientGaps,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dinner: Option<MealSuggestion>,
}

const SUGGESTED_FOODS_LIMIT: i64 = 2;

const PROTEIN_GAP_TRIGGER: f64 = 10.0;
const PROTEIN_FOOD_MIN: f64 = 10.0;
const FIBER_GAP_TRIGGER: f64 = 5.0;
const FIBER_FOOD_MIN: f64 = 2.0;
const FAT_GAP_TRIGGER: f64 = 15.0;
const FAT_FOOD_MIN: f64 = 10.0;

const DINNER_CALORIE_GAP: f64 = 400.0;
const DINNER_PROTEIN_MIN: f64 = 20.0;
const DINNER_CARBS_MIN: f64 = 20.0;
const DINNER_FAT_MIN: f64 = 10.0;
const VEGETABLE_CATEGORY: &str = "vegetables";

pub async fn generate(
    current: &IntakeSummary,
    goals: &GoalTargets,
    has_dinner: bool,
    catalog: &dyn CatalogLookup,
) -> anyhow::Result<RecommendationReport> {
    let gaps = nutrient_gaps(current, goals);
    let mut recommendations = Vec::new();

    if gaps.protein > PROTEIN_GAP_TRIGGER {
        let foods = catalog
            .foods_by_nutrient_threshold(NutrientKind::Protein, PROTEIN_FOOD_MIN, SUGGESTED_FOODS_LIMIT)
            .await?;
        if !foods.is_empty() {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Protein,
                message: "Protein intake is below target. Consider adding lean meat, fish, beans, or eggs.",
                suggested_foods: foods
                    .into_iter()
                    .map(|f| SuggestedFood {
                        id: f.id,
                        name: f.name,
                        serving_size: "100 g",
                        protein: Some(f.per_100g.protein),
                        fiber: None,
                        fat: None,
                        calories: f.per_100g.calories,
                    })
                    .collect(),
            });
        }
    }

    if gaps.fiber > FIBER_GAP_TRIGGER {
        let foods = catalog
            .foods_by_nutrient_threshold(NutrientKind::Fiber, FIBER_FOOD_MIN, SUGGESTED_FOODS_LIMIT)
            .await?;
        if !foods.is_empty() {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Fiber,
                message: "Fiber intake is below target. Consider adding vegetables, fruit, whole grains, or beans.",
                suggested_foods: foods
                    .into_iter()
                    .map(|f| SuggestedFood {
                        id: f.id,
                        name: f.name,
                        serving_size: "100 g",
                        protein: None,
                        fiber: Some(f.per_100g.fiber),
                        fat: None,
                        calories: f.per_100g.calories,
                    })
                    .collect(),
            });
        }
    }

    if gaps.fat > FAT_GAP_TRIGGER {
        let foods = catalog
            .foods_by_nutrient_threshold(NutrientKind::Fat, FAT_FOOD_MIN, SUGGESTED_FOODS_LIMIT)
            .await?;
        if !foods.is_empty() {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Fat,
                message: "Healthy-fat intake is below target. Consider a moderate amount of nuts, olive oil, or avocado.",
                suggested_foods: foods
                    .into_iter()
                    .map(|f| SuggestedFood {
                        id: f.id,
                        name: f.name,
                        serving_size: "30 g",
                        protein: None,
                        fiber: None,
                        fat: Some(f.per_100g.fat),
                        calories: f.per_100g.calories,
                    })
                    .collect(),
            });
        }
    }

    let dinner = if !has_dinner && gaps.calories > DINNER_CALORIE_GAP {
        Some(suggest_dinner(&gaps, catalog).await?)
    } else {
        None
    };

    Ok(RecommendationReport {
        gaps,
        recommendations,
        dinner,
    })
}

/// Assemble a dinner from up to one catalog match per component; a component
/// with no matching food is left out rather than failing the suggestion.
async fn suggest_dinner(
    gaps: &NutrientGaps,
    catalog: &dyn CatalogLookup,
) -> anyhow::Result<MealSuggestion> {
    let mut foods = Vec::new();

    if gaps.protein > PROTEIN_GAP_TRIGGER {
        if let Some(f) = catalog
            .foods_by_nutrient_threshold(NutrientKind::Protein, DINNER_PROTEIN_MIN, 1)
            .await?
            .into_iter()
            .next()
        {
            foods.push(SuggestedPortion {
                id: f.id,
                name: f.name,
                amount: "150 g",
                calories: f.per_100g.calories * 1.5,
                protein: Some(f.per_100g.protein * 1.5),
                carbs: None,
                fat: None,
                fiber: None,
            });
        }
    }

    if gaps.carbs > DINNER_CARBS_MIN {
        if let Some(f) = catalog
            .foods_by_nutrient_threshold(NutrientKind::Carbs, DINNER_CARBS_MIN, 1)
            .await?
            .into_iter()
            .next()
        {
            foods.push(SuggestedPortion {
                id: f.id,
                name: f.name,
                amount: "1 bowl",
                calories: f.per_100g.calories * 1.5,
                protein: None,
                carbs: Some(f.per_100g.carbs * 1.5),
                fat: None,
                fiber: Some(f.per_100g.fiber * 1.5),
            });
        }
    }

    // One vegetable regardless of the remaining gaps, when the catalog has one.
    if let Some(f) = catalog
        .foods_by_category(VEGETABLE_CATEGORY, 1)
        .await?
        .into_iter()
        .next()
    {
        foods.push(SuggestedPortion {
            id: f.id,
            name: f.name,
            amount: "200 g",
            calories: f.per_100g.calories * 2.0,
            protein: None,
            carbs: Some(f.per_100g.carbs * 2.0),
            fat: None,
            fiber: Some(f.per_100g.fiber * 2.0),
        });
    }

    if gaps.fat > DINNER_FAT_MIN {
        if let Some(f) = catalog
            .foods_by_nutrient_threshold(NutrientKind::Fat, FAT_FOOD_MIN, 1)
            .await?
            .into_iter()
            .next()
        {
            foods.push(SuggestedPortion {
                id: f.id,
                name: f.name,
                amount: "15 g",
                calories: f.per_100g.calories * 0.5,
                protein: None,
                carbs: None,
                fat: Some(f.per_100g.fat * 0.5),
                fiber: None,
            });
        }
    }

    let totals = IntakeSummary {
        calories: foods.iter().map(|f| f.calories).sum(),
        protein: foods.iter().filter_map(|f| f.protein).sum(),
        carbs: foods.iter().filter_map(|f| f.carbs).sum(),
        fat: foods.iter().filter_map(|f| f.fat).sum(),
        fiber: foods.iter().filter_map(|f| f.fiber).sum(),
    };

    Ok(MealSuggestion {
        name: "Suggested dinner",
        foods,
        totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeCatalog {
        foods: Vec<(CatalogFood, &'static str)>,
    }

    impl FakeCatalog {
        fn new() -> Self {
            Self { foods: Vec::new() }
        }

        fn with(mut self, name: &str, category: &'static str, per_100g: Nutrients) -> Self {
            self.foods.push((
                CatalogFood {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    per_100g,
                },
                category,
            ));
            self
        }
    }

    #[async_trait]
    impl CatalogLookup for FakeCatalog {
        async fn foods_by_nutrient_threshold(
            &self,
            nutrient: NutrientKind,
            min_per_100g: f64,
            limit: i64,
        ) -> anyhow::Result<Vec<CatalogFood>> {
            let mut matches: Vec<CatalogFood> = self
                .foods
                .iter()
                .filter(|(f, _)| f.per_100g.get(nutrient) > min_per_100g)
                .map(|(f, _)| f.clone())
                .collect();
            matches.sort_by(|a, b| {
                b.per_100g
                    .get(nutrient)
                    .partial_cmp(&a.per_100g.get(nutrient))
                    .unwrap()
            });
            matches.truncate(limit as usize);
            Ok(matches)
        }

        async fn foods_by_category(
            &self,
            category: &str,
            limit: i64,
        ) -> anyhow::Result<Vec<CatalogFood>> {
            Ok(self
                .foods
                .iter()
                .filter(|(_, c)| *c == category)
                .map(|(f, _)| f.clone())
                .take(limit as usize)
                .collect())
        }
    }

    fn per_100g(calories: f64, protein: f64, carbs: f64, fat: f64, fiber: f64) -> Nutrients {
        Nutrients {
            calories,
            protein,
            carbs,
            fat,
            fiber,
            ..Nutrients::zero()
        }
    }

    fn stocked_catalog() -> FakeCatalog {
        FakeCatalog::new()
            .with("chicken breast", "meat", per_100g(165.0, 30.0, 0.0, 3.6, 0.0))
            .with("tofu", "soy", per_100g(76.0, 20.0, 1.9, 4.8, 0.3))
            .with("cheddar", "dairy", per_100g(402.0, 12.0, 1.3, 33.0, 0.0))
            .with("brown rice", "grains", per_100g(130.0, 2.7, 28.0, 0.9, 1.8))
            .with("broccoli", "vegetables", per_100g(34.0, 2.8, 7.0, 0.4, 2.6))
            .with("almonds", "nuts", per_100g(579.0, 21.0, 22.0, 50.0, 12.5))
    }

    #[test]
    fn gaps_are_floored_at_zero() {
        let goals = GoalTargets::default();
        let current = IntakeSummary {
            calories: 2400.0,
            protein: 60.0,
            carbs: 300.0,
            fat: 70.0,
            fiber: 10.0,
        };
        let gaps = nutrient_gaps(&current, &goals);
        assert_eq!(gaps.calories, 0.0);
        assert_eq!(gaps.protein, 15.0);
        assert_eq!(gaps.carbs, 0.0);
        assert_eq!(gaps.fat, 0.0);
        assert_eq!(gaps.fiber, 15.0);
    }

    #[tokio::test]
    async fn protein_rule_lists_top_two_by_protein_descending() {
        let catalog = stocked_catalog();
        let goals = GoalTargets::default();
        // only the protein gap (15 g) crosses its trigger
        let current = IntakeSummary {
            calories: 1800.0,
            protein: 60.0,
            carbs: 240.0,
            fat: 55.0,
            fiber: 22.0,
        };

        let report = generate(&current, &goals, true, &catalog).await.unwrap();
        assert_eq!(report.recommendations.len(), 1);

        let rec = &report.recommendations[0];
        assert_eq!(rec.kind, RecommendationKind::Protein);
        assert_eq!(rec.suggested_foods.len(), 2);
        assert_eq!(rec.suggested_foods[0].protein, Some(30.0));
        assert_eq!(rec.suggested_foods[1].protein, Some(21.0));
        assert!(report.dinner.is_none());
    }

    #[tokio::test]
    async fn no_rules_trigger_when_intake_is_on_target() {
        let catalog = stocked_catalog();
        let goals = GoalTargets::default();
        let current = IntakeSummary {
            calories: 2000.0,
            protein: 75.0,
            carbs: 250.0,
            fat: 65.0,
            fiber: 25.0,
        };

        let report = generate(&current, &goals, false, &catalog).await.unwrap();
        assert!(report.recommendations.is_empty());
        assert!(report.dinner.is_none());
    }

    #[tokio::test]
    async fn dinner_is_synthesized_from_scaled_components() {
        let catalog = stocked_catalog();
        let goals = GoalTargets::default();
        let current = IntakeSummary {
            calories: 1000.0,
            protein: 50.0,
            carbs: 200.0,
            fat: 50.0,
            fiber: 10.0,
        };

        let report = generate(&current, &goals, false, &catalog).await.unwrap();
        let dinner = report.dinner.expect("dinner should be suggested");
        assert_eq!(dinner.foods.len(), 4);

        // protein source: chicken breast at 1.5x
        assert_eq!(dinner.foods[0].name, "chicken breast");
        assert_eq!(dinner.foods[0].calories, 165.0 * 1.5);
        assert_eq!(dinner.foods[0].protein, Some(45.0));

        // carb source: brown rice at 1.5x, fiber carried along
        assert_eq!(dinner.foods[1].name, "brown rice");
        assert_eq!(dinner.foods[1].carbs, Some(42.0));
        assert_eq!(dinner.foods[1].fiber, Some(1.8 * 1.5));

        // vegetable at 2x, always present when the catalog has one
        assert_eq!(dinner.foods[2].name, "broccoli");
        assert_eq!(dinner.foods[2].calories, 68.0);

        // fat source at 0.5x
        assert_eq!(dinner.foods[3].name, "almonds");
        assert_eq!(dinner.foods[3].fat, Some(25.0));

        let expected_calories = 165.0 * 1.5 + 130.0 * 1.5 + 34.0 * 2.0 + 579.0 * 0.5;
        assert!((dinner.totals.calories - expected_calories).abs() < 1e-9);
        assert_eq!(dinner.totals.protein, 45.0);
        assert!((dinner.totals.carbs - (42.0 + 14.0)).abs() < 1e-9);
        assert_eq!(dinner.totals.fat, 25.0);
    }

    #[tokio::test]
    async fn dinner_skipped_when_already_logged_or_gap_small() {
        let catalog = stocked_catalog();
        let goals = GoalTargets::default();
        let hungry = IntakeSummary {
            calories: 1000.0,
            ..IntakeSummary::default()
        };

        let report = generate(&hungry, &goals, true, &catalog).await.unwrap();
        assert!(report.dinner.is_none());

        let nearly_done = IntakeSummary {
            calories: 1700.0,
            protein: 75.0,
            carbs: 250.0,
            fat: 65.0,
            fiber: 25.0,
        };
        let report = generate(&nearly_done, &goals, false, &catalog).await.unwrap();
        assert!(report.dinner.is_none());
    }

    #[tokio::test]
    async fn missing_catalog_matches_are_omitted_silently() {
        // a catalog with no vegetables and no high-carb food
        let catalog = FakeCatalog::new().with(
            "chicken breast",
            "meat",
            per_100g(165.0, 30.0, 0.0, 3.6, 0.0),
        );
        let goals = GoalTargets::default();
        let current = IntakeSummary {
            calories: 1000.0,
            protein: 50.0,
            carbs: 200.0,
            fat: 60.0,
            fiber: 24.0,
        };

        let report = generate(&current, &goals, false, &catalog).await.unwrap();
        let dinner = report.dinner.expect("dinner still suggested");
        assert_eq!(dinner.foods.len(), 1);
        assert_eq!(dinner.foods[0].name, "chicken breast");
        assert_eq!(dinner.totals.carbs, 0.0);
    }

    #[tokio::test]
    async fn fiber_and_fat_rules_trigger_independently() {
        let catalog = stocked_catalog();
        let goals = GoalTargets::default();
        let current = IntakeSummary {
            calories: 1900.0,
            protein: 70.0,
            carbs: 245.0,
            fat: 40.0,
            fiber: 15.0,
        };

        let report = generate(&current, &goals, true, &catalog).await.unwrap();
        let kinds: Vec<RecommendationKind> =
            report.recommendations.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RecommendationKind::Fiber, RecommendationKind::Fat]);

        let fiber_rec = &report.recommendations[0];
        assert_eq!(fiber_rec.suggested_foods[0].name, "almonds");
        assert_eq!(fiber_rec.suggested_foods[0].fiber, Some(12.5));

        let fat_rec = &report.recommendations[1];
        assert_eq!(fat_rec.suggested_foods[0].serving_size, "30 g");
        assert_eq!(fat_rec.suggested_foods[0].fat, Some(50.0));
    }
}
