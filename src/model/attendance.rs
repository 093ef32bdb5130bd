use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
}

/// One row per (user_name, date), created on the first successful geofenced
/// check-in of the day. Never mutated afterward.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Huraira")]
    pub user_name: String,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "10:05:00", value_type = String)]
    pub check_in: NaiveTime,

    #[schema(example = "present")]
    pub status: String,

    #[schema(example = false)]
    pub is_late: bool,
}
