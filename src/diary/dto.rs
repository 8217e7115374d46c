use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;
use uuid::Uuid;

use crate::diary::repo::FoodEntryWithFood;
use crate::nutrition::recommend::{IntakeSummary, MealSuggestion, NutrientGaps, Recommendation};
use crate::nutrition::tracker::{AchievementRates, DaySummary, GoalTargets, RangeAverages};
use crate::nutrition::Nutrients;

pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn parse_date(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s, DATE_FORMAT)
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).expect("ISO date format")
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct IntakeQuery {
    pub user_id: Uuid,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Uuid,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMealRequest {
    pub user_id: Uuid,
    pub date: String,
    pub meal: MealSpec,
}

#[derive(Debug, Deserialize)]
pub struct MealSpec {
    pub name: String,
    pub time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFoodRequest {
    pub user_id: Uuid,
    pub date: String,
    pub meal_id: Uuid,
    pub food: FoodSpec,
}

#[derive(Debug, Deserialize)]
pub struct FoodSpec {
    pub food_id: Uuid,
    pub amount: Option<String>,
    pub weight: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct FoodEntryView {
    pub id: Uuid,
    pub food_id: Uuid,
    pub name: String,
    pub amount: Option<String>,
    pub weight: Option<f64>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
}

impl From<FoodEntryWithFood> for FoodEntryView {
    fn from(e: FoodEntryWithFood) -> Self {
        Self {
            id: e.id,
            food_id: e.food_id,
            name: e.food_name.unwrap_or_else(|| "unknown food".to_string()),
            amount: e.amount,
            weight: e.weight,
            calories: e.calories,
            protein: e.protein,
            carbs: e.carbs,
            fat: e.fat,
            fiber: e.fiber,
            sugar: e.sugar,
            sodium: e.sodium,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MealView {
    pub id: Uuid,
    pub name: String,
    pub time: Option<String>,
    pub foods: Vec<FoodEntryView>,
    pub totals: Nutrients,
}

#[derive(Debug, Serialize)]
pub struct DailyIntakeResponse {
    pub user_id: Uuid,
    pub date: String,
    pub meals: Vec<MealView>,
    pub totals: Nutrients,
    pub goals: GoalTargets,
    pub percentages: Nutrients,
}

#[derive(Debug, Serialize)]
pub struct CreatedMealResponse {
    pub meal: MealView,
}

#[derive(Debug, Serialize)]
pub struct AddFoodResponse {
    pub food_entry: FoodEntryView,
    pub meal_totals: Nutrients,
    pub daily_totals: Nutrients,
    pub percentages: Nutrients,
}

#[derive(Debug, Serialize)]
pub struct DeletedMealResponse {
    pub deleted_meal_id: Uuid,
    pub deleted_meal_name: String,
    pub deleted_food_count: u64,
}

#[derive(Debug, Serialize)]
pub struct DeletedFoodResponse {
    pub deleted_food_entry_id: Uuid,
    pub meal_id: Uuid,
    pub meal_totals: Nutrients,
    pub daily_totals: Nutrients,
}

#[derive(Debug, Serialize)]
pub struct HistoryDay {
    pub date: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub goal_achieved: bool,
}

impl From<DaySummary> for HistoryDay {
    fn from(d: DaySummary) -> Self {
        Self {
            date: format_date(d.date),
            calories: d.calories,
            protein: d.protein,
            carbs: d.carbs,
            fat: d.fat,
            goal_achieved: d.goal_achieved,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user_id: Uuid,
    pub start_date: String,
    pub end_date: String,
    pub daily: Vec<HistoryDay>,
    pub averages: RangeAverages,
    pub goals: GoalTargets,
    pub goal_achievement_rate: AchievementRates,
}

/// The goal keys recommendations are computed against.
#[derive(Debug, Serialize)]
pub struct RecommendationGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

impl From<&GoalTargets> for RecommendationGoals {
    fn from(g: &GoalTargets) -> Self {
        Self {
            calories: g.calories,
            protein: g.protein,
            carbs: g.carbs,
            fat: g.fat,
            fiber: g.fiber,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MealSuggestions {
    pub dinner: MealSuggestion,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub user_id: Uuid,
    pub date: String,
    pub current_intake: IntakeSummary,
    pub goals: RecommendationGoals,
    pub gaps: NutrientGaps,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_suggestions: Option<MealSuggestions>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_roundtrip() {
        let d = parse_date("2025-03-09").unwrap();
        assert_eq!(format_date(d), "2025-03-09");
        assert!(parse_date("03/09/2025").is_err());
        assert!(parse_date("not-a-date").is_err());
    }
}
