use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::{Date, OffsetDateTime};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    catalog::Food,
    diary::{
        dto::{
            format_date, parse_date, AddFoodRequest, AddFoodResponse, AddMealRequest,
            CreatedMealResponse, DailyIntakeResponse, DeletedFoodResponse, DeletedMealResponse,
            FoodEntryView, HistoryQuery, HistoryResponse, IntakeQuery, MealSuggestions, MealView,
            RecommendationsResponse, UserQuery,
        },
        repo::{DailyIntake, FoodEntry, Meal, NewFoodEntry},
    },
    goals::repo::NutritionGoal,
    nutrition::recommend::{self, IntakeSummary},
    nutrition::totals::sum_nutrients,
    nutrition::tracker::{self, GoalTargets},
    nutrition::Nutrients,
    state::AppState,
    users,
};

const MAX_HISTORY_DAYS: i64 = 31;
const DEFAULT_PORTION_WEIGHT_G: f64 = 100.0;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/daily-intake", get(get_daily_intake))
        .route("/daily-intake/meals", post(add_meal))
        .route("/daily-intake/meals/:id", delete(delete_meal))
        .route("/daily-intake/foods", post(add_food))
        .route("/daily-intake/foods/:id", delete(delete_food_entry))
        .route("/history", get(get_history))
        .route("/recommendations", get(get_recommendations))
}

#[instrument(skip(state))]
pub async fn get_daily_intake(
    State(state): State<AppState>,
    Query(q): Query<IntakeQuery>,
) -> Result<Json<DailyIntakeResponse>, (StatusCode, String)> {
    ensure_user(&state, q.user_id).await?;
    let date = date_or_today(q.date.as_deref())?;
    let goals = goal_targets(&state, q.user_id).await?;

    let intake = DailyIntake::find_by_user_date(&state.db, q.user_id, date)
        .await
        .map_err(internal)?;

    let mut meal_views = Vec::new();
    let mut day_snapshots = Vec::new();
    if let Some(intake) = &intake {
        for meal in Meal::list_by_intake(&state.db, intake.id)
            .await
            .map_err(internal)?
        {
            let entries = FoodEntry::list_by_meal_with_food(&state.db, meal.id)
                .await
                .map_err(internal)?;
            let meal_totals = sum_nutrients(entries.iter().map(|e| e.snapshot()));
            day_snapshots.extend(entries.iter().map(|e| e.snapshot()));
            meal_views.push(MealView {
                id: meal.id,
                name: meal.name,
                time: meal.time,
                foods: entries.into_iter().map(FoodEntryView::from).collect(),
                totals: meal_totals,
            });
        }
    }

    // Day totals re-sum every entry rather than adding up the meal totals.
    let totals = sum_nutrients(day_snapshots);
    let percentages = tracker::percent_of_goals(&totals, &goals);

    Ok(Json(DailyIntakeResponse {
        user_id: q.user_id,
        date: format_date(date),
        meals: meal_views,
        totals,
        goals,
        percentages,
    }))
}

#[instrument(skip(state, payload))]
pub async fn add_meal(
    State(state): State<AppState>,
    Json(payload): Json<AddMealRequest>,
) -> Result<(StatusCode, Json<CreatedMealResponse>), (StatusCode, String)> {
    ensure_user(&state, payload.user_id).await?;

    if payload.meal.name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Meal name must not be empty".into()));
    }
    let date = parse_request_date(&payload.date)?;

    let intake = DailyIntake::find_or_create(&state.db, payload.user_id, date)
        .await
        .map_err(internal)?;
    let meal = Meal::create(
        &state.db,
        intake.id,
        &payload.meal.name,
        payload.meal.time.as_deref(),
    )
    .await
    .map_err(internal)?;

    info!(user_id = %payload.user_id, meal_id = %meal.id, name = %meal.name, "meal created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedMealResponse {
            meal: MealView {
                id: meal.id,
                name: meal.name,
                time: meal.time,
                foods: Vec::new(),
                totals: Nutrients::zero(),
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn add_food(
    State(state): State<AppState>,
    Json(payload): Json<AddFoodRequest>,
) -> Result<Json<AddFoodResponse>, (StatusCode, String)> {
    ensure_user(&state, payload.user_id).await?;
    let date = parse_request_date(&payload.date)?;

    let weight = payload.food.weight.unwrap_or(DEFAULT_PORTION_WEIGHT_G);
    if !weight.is_finite() || weight <= 0.0 {
        return Err((StatusCode::BAD_REQUEST, "Food weight must be positive".into()));
    }

    let (food, nutrition) = Food::find_with_nutrition(&state.db, payload.food.food_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Food not found".to_string()))?;

    let intake = DailyIntake::find_or_create(&state.db, payload.user_id, date)
        .await
        .map_err(internal)?;
    let meal = Meal::find(&state.db, payload.meal_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Meal not found".to_string()))?;
    if meal.daily_intake_id != intake.id {
        warn!(meal_id = %meal.id, date = %payload.date, "meal does not belong to this date");
        return Err((StatusCode::NOT_FOUND, "Meal not found for this date".to_string()));
    }

    // Snapshot resolved once at insertion; catalog values are per 100 g.
    let snapshot = nutrition
        .map(|n| n.scale(weight / 100.0))
        .unwrap_or_else(Nutrients::zero);
    let amount = payload
        .food
        .amount
        .clone()
        .unwrap_or_else(|| "1 serving".to_string());

    let entry = FoodEntry::insert(
        &state.db,
        &NewFoodEntry {
            meal_id: meal.id,
            food_id: food.id,
            amount: Some(amount),
            weight,
            nutrients: snapshot,
        },
    )
    .await
    .map_err(internal)?;

    let meal_entries = FoodEntry::list_by_meal(&state.db, meal.id)
        .await
        .map_err(internal)?;
    let meal_totals = sum_nutrients(meal_entries.iter().map(FoodEntry::snapshot));

    let day_entries = FoodEntry::list_by_intake(&state.db, intake.id)
        .await
        .map_err(internal)?;
    let daily_totals = sum_nutrients(day_entries.iter().map(FoodEntry::snapshot));

    let goals = goal_targets(&state, payload.user_id).await?;
    let percentages = tracker::percent_of_goals(&daily_totals, &goals);

    info!(user_id = %payload.user_id, entry_id = %entry.id, food = %food.name, "food logged");
    Ok(Json(AddFoodResponse {
        food_entry: FoodEntryView {
            id: entry.id,
            food_id: food.id,
            name: food.name,
            amount: entry.amount,
            weight: entry.weight,
            calories: entry.calories,
            protein: entry.protein,
            carbs: entry.carbs,
            fat: entry.fat,
            fiber: entry.fiber,
            sugar: entry.sugar,
            sodium: entry.sodium,
        },
        meal_totals,
        daily_totals,
        percentages,
    }))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    Path(meal_id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> Result<Json<DeletedMealResponse>, (StatusCode, String)> {
    ensure_user(&state, q.user_id).await?;

    let meal = Meal::find(&state.db, meal_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Meal not found".to_string()))?;
    let intake = DailyIntake::find_by_id(&state.db, meal.daily_intake_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Meal not found".to_string()))?;
    if intake.user_id != q.user_id {
        warn!(user_id = %q.user_id, meal_id = %meal.id, "meal belongs to another user");
        return Err((StatusCode::FORBIDDEN, "Not allowed to modify this meal".into()));
    }

    let deleted_food_count = Meal::delete_with_entries(&state.db, meal.id)
        .await
        .map_err(internal)?;

    info!(user_id = %q.user_id, meal_id = %meal.id, deleted_food_count, "meal deleted");
    Ok(Json(DeletedMealResponse {
        deleted_meal_id: meal.id,
        deleted_meal_name: meal.name,
        deleted_food_count,
    }))
}

#[instrument(skip(state))]
pub async fn delete_food_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> Result<Json<DeletedFoodResponse>, (StatusCode, String)> {
    ensure_user(&state, q.user_id).await?;

    let entry = FoodEntry::find(&state.db, entry_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Food entry not found".to_string()))?;
    let meal = Meal::find(&state.db, entry.meal_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Meal not found".to_string()))?;
    let intake = DailyIntake::find_by_id(&state.db, meal.daily_intake_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Meal not found".to_string()))?;
    if intake.user_id != q.user_id {
        warn!(user_id = %q.user_id, entry_id = %entry.id, "entry belongs to another user");
        return Err((StatusCode::FORBIDDEN, "Not allowed to modify this entry".into()));
    }

    FoodEntry::delete(&state.db, entry.id).await.map_err(internal)?;

    let meal_entries = FoodEntry::list_by_meal(&state.db, meal.id)
        .await
        .map_err(internal)?;
    let meal_totals = sum_nutrients(meal_entries.iter().map(FoodEntry::snapshot));
    let day_entries = FoodEntry::list_by_intake(&state.db, intake.id)
        .await
        .map_err(internal)?;
    let daily_totals = sum_nutrients(day_entries.iter().map(FoodEntry::snapshot));

    info!(user_id = %q.user_id, entry_id = %entry.id, "food entry deleted");
    Ok(Json(DeletedFoodResponse {
        deleted_food_entry_id: entry.id,
        meal_id: meal.id,
        meal_totals,
        daily_totals,
    }))
}

#[instrument(skip(state))]
pub async fn get_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, (StatusCode, String)> {
    ensure_user(&state, q.user_id).await?;
    let start = parse_request_date(&q.start_date)?;
    let end = parse_request_date(&q.end_date)?;

    let span_days = (end - start).whole_days() + 1;
    if span_days > MAX_HISTORY_DAYS {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Date range must not exceed {MAX_HISTORY_DAYS} days"),
        ));
    }

    let goals = goal_targets(&state, q.user_id).await?;

    // One row per calendar date; dates without an intake record stay
    // zero-filled and count as not achieved.
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        let summary = match DailyIntake::find_by_user_date(&state.db, q.user_id, current)
            .await
            .map_err(internal)?
        {
            Some(intake) => {
                let entries = FoodEntry::list_by_intake(&state.db, intake.id)
                    .await
                    .map_err(internal)?;
                let totals = sum_nutrients(entries.iter().map(FoodEntry::snapshot));
                tracker::summarize_day(current, &totals, &goals)
            }
            None => tracker::empty_day(current),
        };
        days.push(summary);
        let Some(next) = current.next_day() else { break };
        current = next;
    }

    let averages = tracker::range_averages(&days);
    let goal_achievement_rate = tracker::achievement_rates(&days, &goals);

    Ok(Json(HistoryResponse {
        user_id: q.user_id,
        start_date: q.start_date,
        end_date: q.end_date,
        daily: days.into_iter().map(Into::into).collect(),
        averages,
        goals,
        goal_achievement_rate,
    }))
}

#[instrument(skip(state))]
pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(q): Query<IntakeQuery>,
) -> Result<Json<RecommendationsResponse>, (StatusCode, String)> {
    ensure_user(&state, q.user_id).await?;
    let date = date_or_today(q.date.as_deref())?;

    let intake = DailyIntake::find_by_user_date(&state.db, q.user_id, date)
        .await
        .map_err(internal)?
        .ok_or((
            StatusCode::NOT_FOUND,
            "No intake recorded for this date".to_string(),
        ))?;

    let goals = goal_targets(&state, q.user_id).await?;
    let entries = FoodEntry::list_by_intake(&state.db, intake.id)
        .await
        .map_err(internal)?;
    let current = IntakeSummary::from(sum_nutrients(entries.iter().map(FoodEntry::snapshot)));

    let meals = Meal::list_by_intake(&state.db, intake.id)
        .await
        .map_err(internal)?;
    let has_dinner = meals.iter().any(|m| m.name == "dinner");

    let report = recommend::generate(&current, &goals, has_dinner, state.catalog.as_ref())
        .await
        .map_err(internal)?;

    Ok(Json(RecommendationsResponse {
        user_id: q.user_id,
        date: format_date(date),
        current_intake: current,
        goals: (&goals).into(),
        gaps: report.gaps,
        recommendations: report.recommendations,
        meal_suggestions: report.dinner.map(|dinner| MealSuggestions { dinner }),
    }))
}

/// Stored goal targets when present, the injected defaults otherwise.
async fn goal_targets(
    state: &AppState,
    user_id: Uuid,
) -> Result<GoalTargets, (StatusCode, String)> {
    let stored = NutritionGoal::find_by_user(&state.db, user_id)
        .await
        .map_err(internal)?;
    Ok(stored
        .map(|g| g.targets(&state.default_goals))
        .unwrap_or(state.default_goals))
}

fn parse_request_date(s: &str) -> Result<Date, (StatusCode, String)> {
    parse_date(s).map_err(|_| (StatusCode::BAD_REQUEST, "Invalid date format".to_string()))
}

fn date_or_today(date: Option<&str>) -> Result<Date, (StatusCode, String)> {
    match date {
        Some(s) => parse_request_date(s),
        None => Ok(OffsetDateTime::now_utc().date()),
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
