use crate::config::AttendancePolicy;
use crate::model::fine::FineStatus;
use anyhow::Result;
use chrono::NaiveDateTime;
use sqlx::MySqlPool;
use std::time::Duration;

const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Periodic sweep over accepted-but-overdue tasks. Runs once at startup and
/// then every five minutes for the life of the process.
pub async fn run_overdue_fine_sweep(pool: MySqlPool, policy: AttendancePolicy) {
    let mut ticker = actix_web::rt::time::interval(SWEEP_INTERVAL);

    loop {
        ticker.tick().await;

        match sweep_overdue_task_fines(&pool, &policy).await {
            Ok(0) => {}
            Ok(created) => tracing::info!(created, "Overdue task fines created"),
            Err(e) => tracing::error!(error = %e, "Overdue fine sweep failed"),
        }
    }
}

pub fn overdue_fine_reason(title: &str, due_date: NaiveDateTime) -> String {
    format!(
        "Overdue Task Fine: \"{}\" was accepted but not completed by due date ({})",
        title,
        due_date.format("%Y-%m-%d")
    )
}

/// One pass: fine every accepted, incomplete, past-due task that has no fine
/// yet. The per-task existence check keeps the sweep idempotent; a failed
/// pass is simply retried whole on the next tick.
pub async fn sweep_overdue_task_fines(pool: &MySqlPool, policy: &AttendancePolicy) -> Result<u32> {
    let now = chrono::Local::now().naive_local();

    let overdue = sqlx::query_as::<_, (u64, String, String, NaiveDateTime)>(
        r#"
        SELECT id, title, assigned_to, due_date
        FROM tasks
        WHERE assignment_status = 'accepted'
        AND status NOT IN ('done', 'cancelled')
        AND due_date IS NOT NULL
        AND due_date < ?
        "#,
    )
    .bind(now)
    .fetch_all(pool)
    .await?;

    let mut created = 0u32;

    for (task_id, title, assigned_to, due_date) in overdue {
        let existing =
            sqlx::query_scalar::<_, u64>("SELECT id FROM fines WHERE task_id = ? AND user_name = ?")
                .bind(task_id)
                .bind(&assigned_to)
                .fetch_optional(pool)
                .await?;

        if existing.is_some() {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO fines (user_name, amount, reason, date, status, task_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&assigned_to)
        .bind(policy.task_fine_amount)
        .bind(overdue_fine_reason(&title, due_date))
        .bind(now.date())
        .bind(FineStatus::Pending.to_string())
        .bind(task_id)
        .execute(pool)
        .await?;

        tracing::info!(task_id, user = %assigned_to, "Overdue task fine created");
        created += 1;
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn overdue_reason_embeds_title_and_due_date() {
        let due = NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        let reason = overdue_fine_reason("Publish the Gulberg listing", due);
        assert!(reason.contains("Publish the Gulberg listing"));
        assert!(reason.contains("2026-01-05"));
    }
}
