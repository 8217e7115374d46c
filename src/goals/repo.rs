use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::formula::{ActivityLevel, BiometricProfile, Gender, GoalKind};
use crate::nutrition::GoalTargets;

#[derive(Debug, Clone, FromRow)]
pub struct NutritionGoal {
    pub user_id: Uuid,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
    pub last_updated: OffsetDateTime,
}

/// Partial goal update; absent fields keep the stored value for an existing
/// row and take the injected default for a new one.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct GoalPatch {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GoalValidationError {
    #[error("{0} must be a positive number")]
    NotPositive(&'static str),
}

impl GoalPatch {
    /// Every provided value must be a finite number greater than zero.
    /// Checked before any write; a rejected patch mutates nothing.
    pub fn validate(&self) -> Result<(), GoalValidationError> {
        for (name, value) in [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
            ("fiber", self.fiber),
            ("sugar", self.sugar),
            ("sodium", self.sodium),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(GoalValidationError::NotPositive(name));
                }
            }
        }
        Ok(())
    }
}

impl NutritionGoal {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<NutritionGoal>> {
        let goal = sqlx::query_as::<_, NutritionGoal>(
            r#"
            SELECT user_id, calories, protein, carbs, fat, fiber, sugar, sodium, last_updated
            FROM nutrition_goals
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(goal)
    }

    /// Upsert with partial-update semantics; `last_updated` refreshes on
    /// every write.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        patch: &GoalPatch,
        defaults: &GoalTargets,
    ) -> anyhow::Result<NutritionGoal> {
        let goal = sqlx::query_as::<_, NutritionGoal>(
            r#"
            INSERT INTO nutrition_goals
                (user_id, calories, protein, carbs, fat, fiber, sugar, sodium, last_updated)
            VALUES
                ($1,
                 COALESCE($2, $9), COALESCE($3, $10), COALESCE($4, $11), COALESCE($5, $12),
                 COALESCE($6, $13), COALESCE($7, $14), COALESCE($8, $15),
                 now())
            ON CONFLICT (user_id) DO UPDATE SET
                calories = COALESCE($2, nutrition_goals.calories),
                protein  = COALESCE($3, nutrition_goals.protein),
                carbs    = COALESCE($4, nutrition_goals.carbs),
                fat      = COALESCE($5, nutrition_goals.fat),
                fiber    = COALESCE($6, nutrition_goals.fiber),
                sugar    = COALESCE($7, nutrition_goals.sugar),
                sodium   = COALESCE($8, nutrition_goals.sodium),
                last_updated = now()
            RETURNING user_id, calories, protein, carbs, fat, fiber, sugar, sodium, last_updated
            "#,
        )
        .bind(user_id)
        .bind(patch.calories)
        .bind(patch.protein)
        .bind(patch.carbs)
        .bind(patch.fat)
        .bind(patch.fiber)
        .bind(patch.sugar)
        .bind(patch.sodium)
        .bind(defaults.calories)
        .bind(defaults.protein)
        .bind(defaults.carbs)
        .bind(defaults.fat)
        .bind(defaults.fiber)
        .bind(defaults.sugar)
        .bind(defaults.sodium)
        .fetch_one(db)
        .await?;
        Ok(goal)
    }

    /// Full 7-key target set for the tracker; NULL optional nutrients fall
    /// back to the injected defaults.
    pub fn targets(&self, defaults: &GoalTargets) -> GoalTargets {
        GoalTargets {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber.unwrap_or(defaults.fiber),
            sugar: self.sugar.unwrap_or(defaults.sugar),
            sodium: self.sodium.unwrap_or(defaults.sodium),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub activity_level: Option<String>,
    pub goal: Option<String>,
    pub dietary_restrictions: Option<String>,
    pub last_updated: OffsetDateTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub activity_level: Option<String>,
    pub goal: Option<String>,
    pub dietary_restrictions: Option<Vec<String>>,
}

impl UserProfile {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, gender, age, height, weight, activity_level, goal,
                   dietary_restrictions, last_updated
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        patch: &ProfilePatch,
    ) -> anyhow::Result<UserProfile> {
        // Restrictions are stored comma-joined, matching how they are split
        // back apart on read.
        let restrictions = patch.dietary_restrictions.as_ref().map(|r| r.join(","));

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles
                (user_id, gender, age, height, weight, activity_level, goal,
                 dietary_restrictions, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
            ON CONFLICT (user_id) DO UPDATE SET
                gender               = COALESCE($2, user_profiles.gender),
                age                  = COALESCE($3, user_profiles.age),
                height               = COALESCE($4, user_profiles.height),
                weight               = COALESCE($5, user_profiles.weight),
                activity_level       = COALESCE($6, user_profiles.activity_level),
                goal                 = COALESCE($7, user_profiles.goal),
                dietary_restrictions = COALESCE($8, user_profiles.dietary_restrictions),
                last_updated = now()
            RETURNING user_id, gender, age, height, weight, activity_level, goal,
                      dietary_restrictions, last_updated
            "#,
        )
        .bind(user_id)
        .bind(&patch.gender)
        .bind(patch.age)
        .bind(patch.height)
        .bind(patch.weight)
        .bind(&patch.activity_level)
        .bind(&patch.goal)
        .bind(restrictions)
        .fetch_one(db)
        .await?;
        Ok(profile)
    }

    /// The formula input, or `None` while the profile is still incomplete.
    /// Activity and goal parse leniently (unknown values take the documented
    /// defaults); the biometric fields have no defaults to fall back on.
    pub fn biometric(&self) -> Option<BiometricProfile> {
        Some(BiometricProfile {
            gender: Gender::parse(self.gender.as_deref()?),
            age: self.age?,
            height_cm: self.height?,
            weight_kg: self.weight?,
            activity: ActivityLevel::parse(self.activity_level.as_deref().unwrap_or("")),
            goal: GoalKind::parse(self.goal.as_deref().unwrap_or("")),
        })
    }

    pub fn restrictions(&self) -> Vec<String> {
        let parsed: Vec<String> = self
            .dietary_restrictions
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if parsed.is_empty() {
            vec!["none".to_string()]
        } else {
            parsed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_accepts_positive_values() {
        let patch = GoalPatch {
            calories: Some(1800.0),
            protein: Some(90.0),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn patch_rejects_zero_and_negative_values() {
        let patch = GoalPatch {
            calories: Some(0.0),
            ..Default::default()
        };
        assert_eq!(
            patch.validate(),
            Err(GoalValidationError::NotPositive("calories"))
        );

        let patch = GoalPatch {
            sodium: Some(-10.0),
            ..Default::default()
        };
        assert_eq!(
            patch.validate(),
            Err(GoalValidationError::NotPositive("sodium"))
        );
    }

    #[test]
    fn patch_rejects_non_finite_values() {
        let patch = GoalPatch {
            fat: Some(f64::NAN),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = GoalPatch {
            fat: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(GoalPatch::default().validate().is_ok());
    }

    fn profile_with(dietary: Option<&str>) -> UserProfile {
        UserProfile {
            user_id: Uuid::new_v4(),
            gender: Some("male".into()),
            age: Some(30),
            height: Some(175.0),
            weight: Some(70.0),
            activity_level: Some("moderate".into()),
            goal: Some("maintain".into()),
            dietary_restrictions: dietary.map(str::to_string),
            last_updated: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn restrictions_split_and_default() {
        assert_eq!(
            profile_with(Some("vegetarian,no_nuts")).restrictions(),
            vec!["vegetarian".to_string(), "no_nuts".to_string()]
        );
        assert_eq!(profile_with(None).restrictions(), vec!["none".to_string()]);
        assert_eq!(profile_with(Some("")).restrictions(), vec!["none".to_string()]);
    }

    #[test]
    fn biometric_requires_core_fields() {
        let complete = profile_with(None);
        assert!(complete.biometric().is_some());

        let mut missing_weight = profile_with(None);
        missing_weight.weight = None;
        assert!(missing_weight.biometric().is_none());

        // activity and goal are optional; they default instead
        let mut sparse = profile_with(None);
        sparse.activity_level = None;
        sparse.goal = None;
        let b = sparse.biometric().expect("still complete");
        assert_eq!(b.activity, ActivityLevel::Sedentary);
        assert_eq!(b.goal, GoalKind::Maintain);
    }
}
