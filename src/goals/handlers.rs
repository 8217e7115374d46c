use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    goals::{
        dto::{
            GoalValues, GoalsResponse, InitializeGoalsRequest, InitializeGoalsResponse,
            ProfileResponse, UpdateGoalsRequest, UpdateProfileRequest, UserQuery,
        },
        repo::{GoalPatch, NutritionGoal, UserProfile},
    },
    nutrition::formula::{self, ActivityLevel, GoalKind, RecommendedGoals},
    nutrition::tracker::{self, GoalTargets},
    state::AppState,
    users,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/goals/initialize", post(initialize_goals))
        .route("/goals", get(get_goals).put(update_goals))
        .route("/profile", get(get_profile).put(update_profile))
}

/// The calorie/macro base written when no profile-based computation applies.
fn standard_base(defaults: &GoalTargets) -> RecommendedGoals {
    RecommendedGoals {
        calories: defaults.calories,
        protein: defaults.protein,
        carbs: defaults.carbs,
        fat: defaults.fat,
    }
}

#[instrument(skip(state, payload))]
pub async fn initialize_goals(
    State(state): State<AppState>,
    Json(payload): Json<InitializeGoalsRequest>,
) -> Result<(StatusCode, Json<InitializeGoalsResponse>), (StatusCode, String)> {
    ensure_user(&state, payload.user_id).await?;

    let existing = NutritionGoal::find_by_user(&state.db, payload.user_id)
        .await
        .map_err(internal)?;
    let is_new_user = existing.is_none();
    let defaults = state.default_goals;

    let base = if payload.use_profile_based {
        let profile = UserProfile::find_by_user(&state.db, payload.user_id)
            .await
            .map_err(internal)?;
        match profile.as_ref().and_then(UserProfile::biometric) {
            Some(biometric) => formula::recommended_goals(&biometric),
            None => {
                warn!(user_id = %payload.user_id, "profile missing or incomplete, using standard defaults");
                standard_base(&defaults)
            }
        }
    } else {
        standard_base(&defaults)
    };

    // Optional nutrients keep their stored value; new rows and NULL columns
    // are backfilled with the defaults.
    let patch = GoalPatch {
        calories: Some(base.calories),
        protein: Some(base.protein),
        carbs: Some(base.carbs),
        fat: Some(base.fat),
        fiber: Some(existing.as_ref().and_then(|g| g.fiber).unwrap_or(defaults.fiber)),
        sugar: Some(existing.as_ref().and_then(|g| g.sugar).unwrap_or(defaults.sugar)),
        sodium: Some(existing.as_ref().and_then(|g| g.sodium).unwrap_or(defaults.sodium)),
    };

    let goal = NutritionGoal::upsert(&state.db, payload.user_id, &patch, &defaults)
        .await
        .map_err(internal)?;

    info!(user_id = %payload.user_id, is_new_user, "nutrition goals initialized");
    Ok((
        StatusCode::CREATED,
        Json(InitializeGoalsResponse {
            user_id: goal.user_id,
            macro_ratio: tracker::macro_ratio(goal.protein, goal.carbs, goal.fat),
            goals: GoalValues::from(&goal),
            is_profile_based: payload.use_profile_based,
            is_new_user,
            last_updated: goal.last_updated,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_goals(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<Json<GoalsResponse>, (StatusCode, String)> {
    ensure_user(&state, q.user_id).await?;

    let goal = NutritionGoal::find_by_user(&state.db, q.user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Nutrition goals not found".to_string()))?;

    Ok(Json(GoalsResponse {
        user_id: goal.user_id,
        macro_ratio: tracker::macro_ratio(goal.protein, goal.carbs, goal.fat),
        goals: GoalValues::from(&goal),
        last_updated: goal.last_updated,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_goals(
    State(state): State<AppState>,
    Json(payload): Json<UpdateGoalsRequest>,
) -> Result<Json<GoalsResponse>, (StatusCode, String)> {
    ensure_user(&state, payload.user_id).await?;

    // Rejected before any write; no partial updates land.
    if let Err(e) = payload.goals.validate() {
        warn!(user_id = %payload.user_id, error = %e, "invalid goal values");
        return Err((StatusCode::BAD_REQUEST, e.to_string()));
    }

    let goal = NutritionGoal::upsert(&state.db, payload.user_id, &payload.goals, &state.default_goals)
        .await
        .map_err(internal)?;

    info!(user_id = %payload.user_id, "nutrition goals updated");
    Ok(Json(GoalsResponse {
        user_id: goal.user_id,
        macro_ratio: tracker::macro_ratio(goal.protein, goal.carbs, goal.fat),
        goals: GoalValues::from(&goal),
        last_updated: goal.last_updated,
    }))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    ensure_user(&state, q.user_id).await?;

    let profile = UserProfile::find_by_user(&state.db, q.user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Profile not found".to_string()))?;

    Ok(Json(profile_response(profile, false)))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    ensure_user(&state, payload.user_id).await?;

    if let Some(level) = payload.profile.activity_level.as_deref() {
        if !ActivityLevel::ALL.iter().any(|v| *v == level) {
            return Err((StatusCode::BAD_REQUEST, "Invalid activity level".into()));
        }
    }
    if let Some(goal) = payload.profile.goal.as_deref() {
        if !GoalKind::ALL.iter().any(|v| *v == goal) {
            return Err((StatusCode::BAD_REQUEST, "Invalid goal".into()));
        }
    }

    let profile = UserProfile::upsert(&state.db, payload.user_id, &payload.profile)
        .await
        .map_err(internal)?;

    info!(user_id = %payload.user_id, "profile updated");
    Ok(Json(profile_response(profile, true)))
}

/// Updates echo the freshly recomputed recommendation; the formula is only
/// invoked once the profile is complete.
fn profile_response(profile: UserProfile, with_recommendation: bool) -> ProfileResponse {
    let recommended_goals = if with_recommendation {
        profile.biometric().map(|b| formula::recommended_goals(&b))
    } else {
        None
    };
    ProfileResponse {
        user_id: profile.user_id,
        dietary_restrictions: profile.restrictions(),
        gender: profile.gender,
        age: profile.age,
        height: profile.height,
        weight: profile.weight,
        activity_level: profile.activity_level,
        goal: profile.goal,
        last_updated: profile.last_updated,
        recommended_goals,
    }
}

async fn ensure_user(state: &AppState, user_id: Uuid) -> Result<(), (StatusCode, String)> {
    let exists = users::user_exists(&state.db, user_id)
        .await
        .map_err(internal)?;
    if exists {
        Ok(())
    } else {
        warn!(%user_id, "unknown user");
        Err((StatusCode::NOT_FOUND, "User not found".to_string()))
    }
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod dto_tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn goals_response_serializes_optional_nutrients_as_nulls() {
        let response = GoalsResponse {
            user_id: Uuid::new_v4(),
            goals: GoalValues {
                calories: 2000.0,
                protein: 75.0,
                carbs: 250.0,
                fat: 65.0,
                fiber: None,
                sugar: Some(50.0),
                sodium: None,
            },
            macro_ratio: tracker::macro_ratio(75.0, 250.0, 65.0),
            last_updated: OffsetDateTime::UNIX_EPOCH,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["goals"]["calories"], 2000.0);
        assert!(json["goals"]["fiber"].is_null());
        assert_eq!(json["macro_ratio"]["protein"], 15.9);
    }
}
