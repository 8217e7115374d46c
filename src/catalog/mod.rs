mod repo;

pub use repo::{Food, PgCatalog};
