use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Open,
    Done,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Task {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Publish the Gulberg listing")]
    pub title: String,

    #[schema(nullable = true)]
    pub description: Option<String>,

    #[schema(example = "Huraira")]
    pub assigned_to: String,

    #[schema(example = "open")]
    pub status: String,

    #[schema(example = "accepted")]
    pub assignment_status: String,

    #[schema(example = "2026-01-05T18:00:00", value_type = String, nullable = true)]
    pub due_date: Option<NaiveDateTime>,

    #[schema(example = "Sara")]
    pub created_by: String,

    #[schema(example = "2026-01-01T05:01:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Fine-eligible: the assignee accepted, the task is still not done or
    /// cancelled, and the due date has passed.
    pub fn is_overdue_for_fine(&self, now: NaiveDateTime) -> bool {
        let accepted = self.assignment_status == AssignmentStatus::Accepted.to_string();
        let open = self.status != TaskStatus::Done.to_string()
            && self.status != TaskStatus::Cancelled.to_string();
        match self.due_date {
            Some(due) => accepted && open && due < now,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(assignment_status: &str, status: &str, due: Option<NaiveDateTime>) -> Task {
        Task {
            id: 1,
            title: "t".into(),
            description: None,
            assigned_to: "Huraira".into(),
            status: status.into(),
            assignment_status: assignment_status.into(),
            due_date: due,
            created_by: "Sara".into(),
            created_at: None,
        }
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn accepted_open_past_due_is_fine_eligible() {
        assert!(task("accepted", "open", Some(at(1, 9))).is_overdue_for_fine(at(2, 9)));
    }

    #[test]
    fn pending_rejected_done_or_future_tasks_are_not() {
        let now = at(2, 9);
        assert!(!task("pending", "open", Some(at(1, 9))).is_overdue_for_fine(now));
        assert!(!task("rejected", "open", Some(at(1, 9))).is_overdue_for_fine(now));
        assert!(!task("accepted", "done", Some(at(1, 9))).is_overdue_for_fine(now));
        assert!(!task("accepted", "cancelled", Some(at(1, 9))).is_overdue_for_fine(now));
        assert!(!task("accepted", "open", Some(at(3, 9))).is_overdue_for_fine(now));
        assert!(!task("accepted", "open", None).is_overdue_for_fine(now));
    }
}
