//! The nutrition accounting and recommendation engine.
//!
//! Pure domain logic, independent of HTTP and of the store: goal
//! computation from a biometric profile, entry aggregation, goal-attainment
//! tracking, and gap-based recommendations. Handlers feed it rows and
//! ship its outputs.

pub mod formula;
pub mod recommend;
pub mod totals;
pub mod tracker;
pub mod types;

pub use recommend::CatalogLookup;
pub use tracker::GoalTargets;
pub use types::{NutrientKind, Nutrients};
