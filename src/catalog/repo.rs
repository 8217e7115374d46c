use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::nutrition::recommend::{CatalogFood, CatalogLookup};
use crate::nutrition::{NutrientKind, Nutrients};

#[derive(Debug, Clone, FromRow)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
struct FoodNutritionRow {
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    fiber: Option<f64>,
    sugar: Option<f64>,
    sodium: Option<f64>,
}

impl FoodNutritionRow {
    fn per_100g(&self) -> Nutrients {
        Nutrients {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber.unwrap_or(0.0),
            sugar: self.sugar.unwrap_or(0.0),
            sodium: self.sodium.unwrap_or(0.0),
        }
    }
}

impl Food {
    /// Food row plus its per-100g nutrition, when either exists.
    pub async fn find_with_nutrition(
        db: &PgPool,
        food_id: Uuid,
    ) -> anyhow::Result<Option<(Food, Option<Nutrients>)>> {
        let food = sqlx::query_as::<_, Food>(
            r#"
            SELECT id, name
            FROM foods
            WHERE id = $1
            "#,
        )
        .bind(food_id)
        .fetch_optional(db)
        .await?;

        let Some(food) = food else {
            return Ok(None);
        };

        let nutrition = sqlx::query_as::<_, FoodNutritionRow>(
            r#"
            SELECT calories, protein, carbs, fat, fiber, sugar, sodium
            FROM food_nutrition
            WHERE food_id = $1
            "#,
        )
        .bind(food_id)
        .fetch_optional(db)
        .await?;

        Ok(Some((food, nutrition.map(|n| n.per_100g()))))
    }
}

#[derive(Debug, Clone, FromRow)]
struct CatalogFoodRow {
    id: Uuid,
    name: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    fiber: Option<f64>,
    sugar: Option<f64>,
    sodium: Option<f64>,
}

impl CatalogFoodRow {
    fn into_catalog_food(self) -> CatalogFood {
        CatalogFood {
            id: self.id,
            name: self.name,
            per_100g: Nutrients {
                calories: self.calories,
                protein: self.protein,
                carbs: self.carbs,
                fat: self.fat,
                fiber: self.fiber.unwrap_or(0.0),
                sugar: self.sugar.unwrap_or(0.0),
                sodium: self.sodium.unwrap_or(0.0),
            },
        }
    }
}

/// Store-backed catalog lookup used by the recommendation generator.
#[derive(Clone)]
pub struct PgCatalog {
    db: PgPool,
}

impl PgCatalog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogLookup for PgCatalog {
    async fn foods_by_nutrient_threshold(
        &self,
        nutrient: NutrientKind,
        min_per_100g: f64,
        limit: i64,
    ) -> anyhow::Result<Vec<CatalogFood>> {
        // The column name comes from the closed NutrientKind set, never from
        // user input, so it is safe to splice into the statement.
        let column = nutrient.column();
        let sql = format!(
            r#"
            SELECT f.id, f.name, n.calories, n.protein, n.carbs, n.fat, n.fiber, n.sugar, n.sodium
            FROM foods f
            JOIN food_nutrition n ON n.food_id = f.id
            WHERE n.{column} > $1
            ORDER BY n.{column} DESC
            LIMIT $2
            "#
        );

        let rows = sqlx::query_as::<_, CatalogFoodRow>(&sql)
            .bind(min_per_100g)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(CatalogFoodRow::into_catalog_food).collect())
    }

    async fn foods_by_category(
        &self,
        category: &str,
        limit: i64,
    ) -> anyhow::Result<Vec<CatalogFood>> {
        let rows = sqlx::query_as::<_, CatalogFoodRow>(
            r#"
            SELECT f.id, f.name, n.calories, n.protein, n.carbs, n.fat, n.fiber, n.sugar, n.sodium
            FROM foods f
            JOIN food_nutrition n ON n.food_id = f.id
            WHERE f.category = $1
            ORDER BY f.created_at ASC
            LIMIT $2
            "#,
        )
        .bind(category)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(CatalogFoodRow::into_catalog_food).collect())
    }
}
