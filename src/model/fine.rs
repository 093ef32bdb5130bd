use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FineStatus {
    Pending,
    Approved,
    Rejected,
}

/// Created pending by the attendance/task fining paths; moved to
/// approved/rejected by the HR review endpoints. At most one per trigger.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Fine {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Huraira")]
    pub user_name: String,

    #[schema(example = 500.0)]
    pub amount: f64,

    #[schema(example = "Late check-in fine: arrived at 10:42")]
    pub reason: String,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "pending")]
    pub status: String,

    #[schema(example = 12, nullable = true)]
    pub attendance_id: Option<u64>,

    #[schema(example = 7, nullable = true)]
    pub task_id: Option<u64>,

    #[schema(example = "Sara", nullable = true)]
    pub approved_by: Option<String>,

    #[schema(example = "2026-01-02T09:30:00", value_type = String, nullable = true)]
    pub approved_at: Option<NaiveDateTime>,

    #[schema(example = "2026-01-01T05:01:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}
