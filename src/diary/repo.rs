use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::totals::NutrientSnapshot;
use crate::nutrition::Nutrients;

#[derive(Debug, Clone, FromRow)]
pub struct DailyIntake {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
}

impl DailyIntake {
    pub async fn find_by_user_date(
        db: &PgPool,
        user_id: Uuid,
        date: Date,
    ) -> anyhow::Result<Option<DailyIntake>> {
        let intake = sqlx::query_as::<_, DailyIntake>(
            r#"
            SELECT id, user_id, date
            FROM daily_intakes
            WHERE user_id = $1 AND date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(db)
        .await?;
        Ok(intake)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<DailyIntake>> {
        let intake = sqlx::query_as::<_, DailyIntake>(
            r#"
            SELECT id, user_id, date
            FROM daily_intakes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(intake)
    }

    /// Days are created lazily on first write; (user, date) is unique, so a
    /// concurrent create resolves to the same row.
    pub async fn find_or_create(
        db: &PgPool,
        user_id: Uuid,
        date: Date,
    ) -> anyhow::Result<DailyIntake> {
        let intake = sqlx::query_as::<_, DailyIntake>(
            r#"
            INSERT INTO daily_intakes (id, user_id, date)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, date) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, date
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .fetch_one(db)
        .await?;
        Ok(intake)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub daily_intake_id: Uuid,
    pub name: String,
    pub time: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Meal {
    pub async fn create(
        db: &PgPool,
        daily_intake_id: Uuid,
        name: &str,
        time: Option<&str>,
    ) -> anyhow::Result<Meal> {
        let meal = sqlx::query_as::<_, Meal>(
            r#"
            INSERT INTO meals (id, daily_intake_id, name, time)
            VALUES ($1, $2, $3, $4)
            RETURNING id, daily_intake_id, name, time, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(daily_intake_id)
        .bind(name)
        .bind(time)
        .fetch_one(db)
        .await?;
        Ok(meal)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Meal>> {
        let meal = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, daily_intake_id, name, time, created_at
            FROM meals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(meal)
    }

    /// Insertion order. Name lookups over this list use first-match
    /// semantics; duplicate names are not prevented.
    pub async fn list_by_intake(db: &PgPool, daily_intake_id: Uuid) -> anyhow::Result<Vec<Meal>> {
        let meals = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, daily_intake_id, name, time, created_at
            FROM meals
            WHERE daily_intake_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(daily_intake_id)
        .fetch_all(db)
        .await?;
        Ok(meals)
    }

    /// Deletes the meal and every entry under it; returns the entry count.
    pub async fn delete_with_entries(db: &PgPool, meal_id: Uuid) -> anyhow::Result<u64> {
        let mut tx = db.begin().await?;
        let deleted = sqlx::query(
            r#"
            DELETE FROM food_entries WHERE meal_id = $1
            "#,
        )
        .bind(meal_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            r#"
            DELETE FROM meals WHERE id = $1
            "#,
        )
        .bind(meal_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(deleted)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct FoodEntry {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub food_id: Uuid,
    pub amount: Option<String>,
    pub weight: Option<f64>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
    pub created_at: OffsetDateTime,
}

/// Entry joined with its catalog food's name for diary views; the name is
/// NULL when the food row has since disappeared.
#[derive(Debug, Clone, FromRow)]
pub struct FoodEntryWithFood {
    pub id: Uuid,
    pub food_id: Uuid,
    pub food_name: Option<String>,
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

pub struct NewFoodEntry {
    pub meal_id: Uuid,
    pub food_id: Uuid,
    pub amount: Option<String>,
    pub weight: f64,
    pub nutrients: Nutrients,
}

impl FoodEntry {
    /// Stores the resolved snapshot; later catalog edits never touch it.
    pub async fn insert(db: &PgPool, new: &NewFoodEntry) -> anyhow::Result<FoodEntry> {
        let entry = sqlx::query_as::<_, FoodEntry>(
            r#"
            INSERT INTO food_entries
                (id, meal_id, food_id, amount, weight,
                 calories, protein, carbs, fat, fiber, sugar, sodium)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, meal_id, food_id, amount, weight,
                      calories, protein, carbs, fat, fiber, sugar, sodium, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.meal_id)
        .bind(new.food_id)
        .bind(&new.amount)
        .bind(new.weight)
        .bind(new.nutrients.calories)
        .bind(new.nutrients.protein)
        .bind(new.nutrients.carbs)
        .bind(new.nutrients.fat)
        .bind(new.nutrients.fiber)
        .bind(new.nutrients.sugar)
        .bind(new.nutrients.sodium)
        .fetch_one(db)
        .await?;
        Ok(entry)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<FoodEntry>> {
        let entry = sqlx::query_as::<_, FoodEntry>(
            r#"
            SELECT id, meal_id, food_id, amount, weight,
                   calories, protein, carbs, fat, fiber, sugar, sodium, created_at
            FROM food_entries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(entry)
    }

    pub async fn list_by_meal(db: &PgPool, meal_id: Uuid) -> anyhow::Result<Vec<FoodEntry>> {
        let entries = sqlx::query_as::<_, FoodEntry>(
            r#"
            SELECT id, meal_id, food_id, amount, weight,
                   calories, protein, carbs, fat, fiber, sugar, sodium, created_at
            FROM food_entries
            WHERE meal_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(meal_id)
        .fetch_all(db)
        .await?;
        Ok(entries)
    }

    pub async fn list_by_meal_with_food(
        db: &PgPool,
        meal_id: Uuid,
    ) -> anyhow::Result<Vec<FoodEntryWithFood>> {
        let entries = sqlx::query_as::<_, FoodEntryWithFood>(
            r#"
            SELECT e.id, e.food_id, f.name AS food_name, e.amount, e.weight,
                   e.calories, e.protein, e.carbs, e.fat, e.fiber, e.sugar, e.sodium
            FROM food_entries e
            LEFT JOIN foods f ON f.id = e.food_id
            WHERE e.meal_id = $1
            ORDER BY e.created_at ASC
            "#,
        )
        .bind(meal_id)
        .fetch_all(db)
        .await?;
        Ok(entries)
    }

    /// Every entry under one day, across all of its meals. Day totals are
    /// always re-summed from these rows.
    pub async fn list_by_intake(
        db: &PgPool,
        daily_intake_id: Uuid,
    ) -> anyhow::Result<Vec<FoodEntry>> {
        let entries = sqlx::query_as::<_, FoodEntry>(
            r#"
            SELECT e.id, e.meal_id, e.food_id, e.amount, e.weight,
                   e.calories, e.protein, e.carbs, e.fat, e.fiber, e.sugar, e.sodium, e.created_at
            FROM food_entries e
            JOIN meals m ON m.id = e.meal_id
            WHERE m.daily_intake_id = $1
            "#,
        )
        .bind(daily_intake_id)
        .fetch_all(db)
        .await?;
        Ok(entries)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM food_entries WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub fn snapshot(&self) -> NutrientSnapshot {
        NutrientSnapshot {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber,
            sugar: self.sugar,
            sodium: self.sodium,
        }
    }
}

impl FoodEntryWithFood {
    pub fn snapshot(&self) -> NutrientSnapshot {
        NutrientSnapshot {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber,
            sugar: self.sugar,
            sodium: self.sodium,
        }
    }
}
