use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Euros per hour for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AnnualRate {
    pub year: i64,
    pub rate: f64,
}
