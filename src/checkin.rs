use crate::config::AttendancePolicy;
use crate::geo::{self, DeviceClass, GeoFailure};
use crate::model::attendance::AttendanceStatus;
use crate::model::fine::FineStatus;
use crate::utils::{attendance_filter, role_cache};
use chrono::{NaiveDate, NaiveTime, Timelike};
use sqlx::MySqlPool;

/// Which call site asked for the check-in. Both run the same orchestration.
#[derive(Debug, Clone, Copy, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CheckInTrigger {
    Manual,
    Auto,
}

#[derive(Debug, Clone, Copy)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, derive_more::Display)]
pub enum CheckInError {
    #[display(fmt = "Attendance already marked for today")]
    AlreadyMarked,

    #[display(fmt = "{}", "_0.message()")]
    Location(GeoFailure),

    #[display(
        fmt = "You are {:.0}m from the office; check-in requires being within {:.0}m",
        distance_m,
        radius_m
    )]
    OutOfGeofence { distance_m: f64, radius_m: f64 },

    #[display(fmt = "Failed to record attendance")]
    Db(sqlx::Error),
}

impl From<sqlx::Error> for CheckInError {
    fn from(e: sqlx::Error) -> Self {
        CheckInError::Db(e)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CheckInClass {
    pub status: AttendanceStatus,
    pub is_late: bool,
    pub should_fine: bool,
}

/// Minute-granularity classification against the standard in-time plus
/// grace window. The grace boundary is inclusive: arriving exactly at the
/// end of grace still counts as present.
pub fn classify_check_in(policy: &AttendancePolicy, check_in: NaiveTime) -> CheckInClass {
    let check_in_minutes = check_in.hour() * 60 + check_in.minute();
    let standard_minutes =
        policy.standard_in_time.hour() * 60 + policy.standard_in_time.minute();
    let grace_minutes = standard_minutes + policy.grace_minutes;

    if check_in_minutes <= grace_minutes {
        CheckInClass {
            status: AttendanceStatus::Present,
            is_late: check_in_minutes > standard_minutes,
            should_fine: false,
        }
    } else {
        CheckInClass {
            status: AttendanceStatus::Late,
            is_late: true,
            should_fine: true,
        }
    }
}

pub fn late_fine_reason(policy: &AttendancePolicy, check_in: NaiveTime) -> String {
    format!(
        "Late Arrival Fine: checked in at {} (standard in-time {}, grace {} min)",
        check_in.format("%H:%M"),
        policy.standard_in_time.format("%H:%M"),
        policy.grace_minutes
    )
}

#[derive(Debug)]
pub struct CheckInSuccess {
    pub attendance_id: u64,
    pub date: NaiveDate,
    pub check_in: NaiveTime,
    pub status: AttendanceStatus,
    pub is_late: bool,
    pub fined: bool,
    pub distance_m: f64,
}

/// The one check-in path, shared by the manual and automatic endpoints.
///
/// Sequencing: idempotence check, client geolocation outcome, geofence,
/// classification, then the attendance insert and any late fine inside a
/// single transaction. The UNIQUE (user_name, date) key is the authority on
/// "already marked"; the filter and the pre-select only save round trips.
pub async fn record_check_in(
    pool: &MySqlPool,
    policy: &AttendancePolicy,
    user_name: &str,
    user_id: u64,
    location: Result<GeoFix, GeoFailure>,
    device: DeviceClass,
    trigger: CheckInTrigger,
) -> Result<CheckInSuccess, CheckInError> {
    let now = chrono::Local::now().naive_local();
    let today = now.date();

    if attendance_filter::might_be_marked(user_name, today) {
        let existing = sqlx::query_scalar::<_, u64>(
            "SELECT id FROM attendance WHERE user_name = ? AND date = ?",
        )
        .bind(user_name)
        .bind(today)
        .fetch_optional(pool)
        .await?;

        if existing.is_some() {
            return Err(CheckInError::AlreadyMarked);
        }
    }

    let fix = location.map_err(CheckInError::Location)?;

    let distance_m = geo::haversine_distance_m(
        fix.latitude,
        fix.longitude,
        policy.office_latitude,
        policy.office_longitude,
    );
    let radius_m = policy.geofence_radius_m(device);

    if distance_m > radius_m {
        return Err(CheckInError::OutOfGeofence {
            distance_m,
            radius_m,
        });
    }

    let check_in = now.time();
    let class = classify_check_in(policy, check_in);

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO attendance (user_name, date, check_in, status, is_late)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_name)
    .bind(today)
    .bind(check_in)
    .bind(class.status.to_string())
    .bind(class.is_late)
    .execute(&mut *tx)
    .await;

    let attendance_id = match inserted {
        Ok(done) => done.last_insert_id(),
        Err(e) => {
            // Duplicate (user_name, date): a concurrent check-in won the race
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(CheckInError::AlreadyMarked);
                }
            }
            return Err(CheckInError::Db(e));
        }
    };

    let mut fined = false;
    if class.should_fine {
        let exempt = role_cache::get_role(pool, user_id)
            .await?
            .map(|role| role.is_fine_exempt())
            .unwrap_or(false);

        if !exempt {
            sqlx::query(
                r#"
                INSERT INTO fines (user_name, amount, reason, date, status, attendance_id)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(user_name)
            .bind(policy.late_fine_amount)
            .bind(late_fine_reason(policy, check_in))
            .bind(today)
            .bind(FineStatus::Pending.to_string())
            .bind(attendance_id)
            .execute(&mut *tx)
            .await?;
            fined = true;
        }
    }

    tx.commit().await?;
    attendance_filter::mark(user_name, today);

    tracing::info!(
        user = user_name,
        trigger = %trigger,
        status = %class.status,
        distance_m = distance_m.round(),
        fined,
        "Attendance recorded"
    );

    Ok(CheckInSuccess {
        attendance_id,
        date: today,
        check_in,
        status: class.status,
        is_late: class.is_late,
        fined,
        distance_m,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn on_time_check_in_is_present() {
        let policy = AttendancePolicy::default();
        for check_in in [t(9, 59), t(10, 0)] {
            let class = classify_check_in(&policy, check_in);
            assert_eq!(class.status, AttendanceStatus::Present);
            assert!(!class.is_late);
            assert!(!class.should_fine);
        }
    }

    #[test]
    fn grace_boundary_is_inclusive() {
        let policy = AttendancePolicy::default();
        let class = classify_check_in(&policy, t(10, 15));
        assert_eq!(class.status, AttendanceStatus::Present);
        assert!(class.is_late);
        assert!(!class.should_fine);
    }

    #[test]
    fn one_minute_past_grace_is_late_and_fined() {
        let policy = AttendancePolicy::default();
        let class = classify_check_in(&policy, t(10, 16));
        assert_eq!(class.status, AttendanceStatus::Late);
        assert!(class.is_late);
        assert!(class.should_fine);
    }

    #[test]
    fn seconds_do_not_affect_classification() {
        let policy = AttendancePolicy::default();
        let boundary = NaiveTime::from_hms_opt(10, 15, 59).unwrap();
        assert!(!classify_check_in(&policy, boundary).should_fine);
    }

    #[test]
    fn fine_reason_embeds_the_check_in_time() {
        let policy = AttendancePolicy::default();
        let reason = late_fine_reason(&policy, t(10, 42));
        assert!(reason.contains("10:42"));
        assert!(reason.contains("10:00"));
    }
}
