use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::goals::repo::{GoalPatch, NutritionGoal, ProfilePatch};
use crate::nutrition::formula::RecommendedGoals;
use crate::nutrition::tracker::MacroRatio;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct InitializeGoalsRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub use_profile_based: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalsRequest {
    pub user_id: Uuid,
    pub goals: GoalPatch,
}

#[derive(Debug, Serialize)]
pub struct GoalValues {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
}

impl From<&NutritionGoal> for GoalValues {
    fn from(g: &NutritionGoal) -> Self {
        Self {
            calories: g.calories,
            protein: g.protein,
            carbs: g.carbs,
            fat: g.fat,
            fiber: g.fiber,
            sugar: g.sugar,
            sodium: g.sodium,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GoalsResponse {
    pub user_id: Uuid,
    pub goals: GoalValues,
    pub macro_ratio: MacroRatio,
    pub last_updated: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct InitializeGoalsResponse {
    pub user_id: Uuid,
    pub goals: GoalValues,
    pub macro_ratio: MacroRatio,
    pub is_profile_based: bool,
    pub is_new_user: bool,
    pub last_updated: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub profile: ProfilePatch,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub activity_level: Option<String>,
    pub goal: Option<String>,
    pub dietary_restrictions: Vec<String>,
    pub last_updated: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_goals: Option<RecommendedGoals>,
}
