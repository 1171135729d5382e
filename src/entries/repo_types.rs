use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

use crate::dates::iso_date;

/// Shift worked. Wire and storage labels are the plant's Spanish names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Shift {
    #[serde(rename = "Mañana", alias = "morning")]
    #[sqlx(rename = "Mañana")]
    Morning,
    #[serde(rename = "Tarde", alias = "afternoon")]
    #[sqlx(rename = "Tarde")]
    Afternoon,
    #[serde(rename = "Noche", alias = "night")]
    #[sqlx(rename = "Noche")]
    Night,
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Night];

    pub fn label(self) -> &'static str {
        match self {
            Shift::Morning => "Mañana",
            Shift::Afternoon => "Tarde",
            Shift::Night => "Noche",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorkEntry {
    pub id: i64,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub shift: Shift,
    pub task: String,
    pub amount: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user_id: i64,
}

/// Validated input for an insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkEntry {
    pub date: Date,
    pub shift: Shift,
    pub task: String,
    pub amount: f64,
}

/// One row of the export/report join.
#[derive(Debug, Clone, FromRow)]
pub struct EntryWithOwner {
    pub id: i64,
    pub date: Date,
    pub shift: Shift,
    pub task: String,
    pub amount: f64,
    pub created_at: OffsetDateTime,
    pub user_id: i64,
    pub username: String,
    pub full_name: Option<String>,
}

impl EntryWithOwner {
    pub fn worker(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}
