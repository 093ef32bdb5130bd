use crate::auth::auth::AuthUser;
use crate::checkin::{self, CheckInError, CheckInTrigger, GeoFix};
use crate::config::Config;
use crate::geo::{DeviceClass, GeoFailure};
use crate::model::attendance::{Attendance, AttendanceStatus};
use actix_web::{HttpRequest, HttpResponse, Responder, http::header, web};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

/// Check-in payload. The browser acquires the fix itself
/// (enableHighAccuracy, 10-15s timeout, maximumAge 0) and posts either the
/// coordinates or the failure kind.
#[derive(Deserialize, ToSchema)]
pub struct CheckInRequest {
    #[schema(example = 33.6975)]
    pub latitude: Option<f64>,

    #[schema(example = 73.0548)]
    pub longitude: Option<f64>,

    /// Set instead of coordinates when no fix could be acquired
    #[schema(example = "permission-denied")]
    pub location_error: Option<GeoFailure>,
}

impl CheckInRequest {
    fn location(&self) -> Result<GeoFix, GeoFailure> {
        if let Some(err) = self.location_error {
            return Err(err);
        }
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Ok(GeoFix {
                latitude,
                longitude,
            }),
            _ => Err(GeoFailure::PositionUnavailable),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CheckInResponse {
    #[schema(example = "Attendance marked! Check-in: 10:05")]
    pub message: String,

    #[schema(example = "On time! Great job!")]
    pub description: String,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "10:05")]
    pub check_in: String,

    #[schema(example = "present")]
    pub status: AttendanceStatus,

    pub is_late: bool,

    /// Whether this check-in raised a pending fine
    pub fined: bool,

    #[schema(example = 128.0)]
    pub distance_m: f64,
}

fn device_class(req: &HttpRequest) -> DeviceClass {
    let ua = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    DeviceClass::from_user_agent(ua)
}

async fn handle_check_in(
    auth: AuthUser,
    pool: &MySqlPool,
    config: &Config,
    payload: &CheckInRequest,
    req: &HttpRequest,
    trigger: CheckInTrigger,
) -> HttpResponse {
    let device = device_class(req);

    let result = checkin::record_check_in(
        pool,
        &config.policy,
        &auth.username,
        auth.user_id,
        payload.location(),
        device,
        trigger,
    )
    .await;

    match result {
        Ok(success) => {
            let check_in = success.check_in.format("%H:%M").to_string();
            let message = match trigger {
                CheckInTrigger::Manual => format!("Attendance marked! Check-in: {check_in}"),
                CheckInTrigger::Auto => {
                    format!("Attendance marked automatically! Check-in: {check_in}")
                }
            };
            let description = if success.fined {
                "You arrived late today. A fine is pending HR review.".to_string()
            } else if success.is_late {
                "You arrived late today".to_string()
            } else {
                "On time! Great job!".to_string()
            };

            HttpResponse::Ok().json(CheckInResponse {
                message,
                description,
                date: success.date,
                check_in,
                status: success.status,
                is_late: success.is_late,
                fined: success.fined,
                distance_m: success.distance_m.round(),
            })
        }

        Err(CheckInError::AlreadyMarked) => HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Already checked in today"
        })),

        Err(err @ CheckInError::Location(_)) => {
            HttpResponse::BadRequest().json(serde_json::json!({
                "message": err.to_string()
            }))
        }

        Err(
            err @ CheckInError::OutOfGeofence {
                distance_m,
                radius_m,
            },
        ) => HttpResponse::BadRequest().json(serde_json::json!({
            "message": err.to_string(),
            "distance_m": distance_m.round(),
            "radius_m": radius_m,
        })),

        Err(CheckInError::Db(e)) => {
            tracing::error!(error = %e, user = %auth.username, "Check-in failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Internal Server Error"
            }))
        }
    }
}

/// Manual check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Checked in successfully", body = CheckInResponse),
        (status = 400, description = "Already checked in, no usable location, or outside the geofence", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CheckInRequest>,
    req: HttpRequest,
) -> impl Responder {
    handle_check_in(
        auth,
        pool.get_ref(),
        config.get_ref(),
        &payload,
        &req,
        CheckInTrigger::Manual,
    )
    .await
}

/// Automatic check-in, fired by the client on page load
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in/auto",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Checked in successfully", body = CheckInResponse),
        (status = 400, description = "Already checked in, no usable location, or outside the geofence"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn auto_check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CheckInRequest>,
    req: HttpRequest,
) -> impl Responder {
    handle_check_in(
        auth,
        pool.get_ref(),
        config.get_ref(),
        &payload,
        &req,
        CheckInTrigger::Auto,
    )
    .await
}

#[derive(Serialize, ToSchema)]
pub struct LocationStatusResponse {
    #[schema(example = 128.0)]
    pub distance_m: f64,

    #[schema(example = 500.0)]
    pub radius_m: f64,

    pub within_geofence: bool,

    #[schema(example = "mobile")]
    pub device: DeviceClass,
}

/// Ephemeral location probe for the dashboard card; never writes
#[utoipa::path(
    post,
    path = "/api/v1/attendance/location",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Distance and geofence status", body = LocationStatusResponse),
        (status = 400, description = "No usable location"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn location_status(
    _auth: AuthUser,
    config: web::Data<Config>,
    payload: web::Json<CheckInRequest>,
    req: HttpRequest,
) -> impl Responder {
    let fix = match payload.location() {
        Ok(fix) => fix,
        Err(failure) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "message": failure.message()
            }));
        }
    };

    let device = device_class(&req);
    let policy = &config.policy;
    let distance_m = crate::geo::haversine_distance_m(
        fix.latitude,
        fix.longitude,
        policy.office_latitude,
        policy.office_longitude,
    );
    let radius_m = policy.geofence_radius_m(device);

    HttpResponse::Ok().json(LocationStatusResponse {
        distance_m: distance_m.round(),
        radius_m,
        within_geofence: distance_m <= radius_m,
        device,
    })
}

#[derive(Serialize, ToSchema)]
pub struct TodayResponse {
    pub marked: bool,
    pub record: Option<Attendance>,
}

/// Today's attendance for the caller
#[utoipa::path(
    get,
    path = "/api/v1/attendance/today",
    responses(
        (status = 200, description = "Whether the caller has checked in today", body = TodayResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let record = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, user_name, date, check_in, status, is_late
        FROM attendance
        WHERE user_name = ? AND date = CURDATE()
        "#,
    )
    .bind(&auth.username)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user = %auth.username, "Failed to fetch today's attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(TodayResponse {
        marked: record.is_some(),
        record,
    }))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SummaryQuery {
    #[schema(example = 2026)]
    pub year: Option<i32>,

    #[schema(example = 1)]
    pub month: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceSummaryResponse {
    pub year: i32,
    pub month: u32,

    /// Days marked present (including late arrivals inside the grace window)
    pub present_days: i64,

    /// Days classified late (past the grace window)
    pub late_days: i64,

    /// Days with is_late set, i.e. any arrival after the standard in-time
    pub late_arrivals: i64,

    #[schema(example = 1000.0)]
    pub fines_total: f64,
}

/// Monthly attendance and fines summary for the caller
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Per-month counts", body = AttendanceSummaryResponse),
        (status = 400, description = "Invalid year/month"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    let now = chrono::Local::now().date_naive();
    let year = query.year.unwrap_or_else(|| now.year());
    let month = query.month.unwrap_or_else(|| now.month());

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| actix_web::error::ErrorBadRequest("Invalid year/month"))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap()
    };

    let internal_error = |e: sqlx::Error| {
        tracing::error!(error = %e, user = %auth.username, "Failed to build attendance summary");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    };

    const COUNT_BY_STATUS_SQL: &str = r#"
        SELECT COUNT(*) FROM attendance
        WHERE user_name = ? AND date >= ? AND date < ? AND status = ?
    "#;

    let present_days = sqlx::query_scalar::<_, i64>(COUNT_BY_STATUS_SQL)
        .bind(&auth.username)
        .bind(first)
        .bind(next_first)
        .bind("present")
        .fetch_one(pool.get_ref())
        .await
        .map_err(internal_error)?;

    let late_days = sqlx::query_scalar::<_, i64>(COUNT_BY_STATUS_SQL)
        .bind(&auth.username)
        .bind(first)
        .bind(next_first)
        .bind("late")
        .fetch_one(pool.get_ref())
        .await
        .map_err(internal_error)?;

    let late_arrivals = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM attendance
        WHERE user_name = ? AND date >= ? AND date < ? AND is_late = TRUE
        "#,
    )
    .bind(&auth.username)
    .bind(first)
    .bind(next_first)
    .fetch_one(pool.get_ref())
    .await
    .map_err(internal_error)?;

    let fines_total = sqlx::query_scalar::<_, f64>(
        r#"
        SELECT COALESCE(SUM(amount), 0) FROM fines
        WHERE user_name = ? AND date >= ? AND date < ?
        "#,
    )
    .bind(&auth.username)
    .bind(first)
    .bind(next_first)
    .fetch_one(pool.get_ref())
    .await
    .map_err(internal_error)?;

    Ok(HttpResponse::Ok().json(AttendanceSummaryResponse {
        year,
        month,
        present_days,
        late_days,
        late_arrivals,
        fines_total,
    }))
}
