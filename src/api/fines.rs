use crate::auth::auth::AuthUser;
use crate::model::fine::Fine;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct FineFilter {
    #[schema(example = "Huraira")]
    /// Filter by the fined user
    pub user_name: Option<String>,
    #[schema(example = "pending")]
    /// Filter by fine status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct FineListResponse {
    pub data: Vec<Fine>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

const FINE_COLUMNS: &str = "id, user_name, amount, reason, date, status, \
     attendance_id, task_id, approved_by, approved_at, created_at";

/// Paginated fines list (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/fines",
    params(FineFilter),
    responses(
        (status = 200, description = "Paginated fine list", body = FineListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Fines"
)]
pub async fn list_fines(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<FineFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<&str> = Vec::new();

    if let Some(user_name) = query.user_name.as_deref() {
        where_sql.push_str(" AND user_name = ?");
        args.push(user_name);
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(status);
    }

    let count_sql = format!("SELECT COUNT(*) FROM fines{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = count_q.bind(*arg);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count fines");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT {FINE_COLUMNS}
        FROM fines
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Fine>(&data_sql);
    for arg in args {
        data_q = data_q.bind(arg);
    }

    let fines = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch fine list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(FineListResponse {
        data: fines,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// Fine details (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/fines/{fine_id}",
    params(
        ("fine_id" = u64, Path, description = "ID of the fine to fetch")
    ),
    responses(
        (status = 200, description = "Fine found", body = Fine),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Fine not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Fines"
)]
pub async fn get_fine(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let fine_id = path.into_inner();

    let fine = sqlx::query_as::<_, Fine>(&format!(
        "SELECT {FINE_COLUMNS} FROM fines WHERE id = ?"
    ))
    .bind(fine_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, fine_id, "Failed to fetch fine");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match fine {
        Some(f) => Ok(HttpResponse::Ok().json(f)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Fine not found"
        }))),
    }
}

/// The caller's own fines
#[utoipa::path(
    get,
    path = "/api/v1/fines/mine",
    responses(
        (status = 200, description = "Fines for the authenticated user", body = [Fine]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Fines"
)]
pub async fn my_fines(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let fines = sqlx::query_as::<_, Fine>(&format!(
        r#"
        SELECT {FINE_COLUMNS}
        FROM fines
        WHERE user_name = ?
        ORDER BY created_at DESC
        LIMIT 100
        "#
    ))
    .bind(&auth.username)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user = %auth.username, "Failed to fetch own fines");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(fines))
}

async fn review_fine(
    auth: AuthUser,
    pool: &MySqlPool,
    fine_id: u64,
    verdict: &'static str,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query(
        r#"
        UPDATE fines
        SET status = ?, approved_by = ?, approved_at = NOW()
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(verdict)
    .bind(&auth.username)
    .bind(fine_id)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, fine_id, verdict, "Fine review failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Fine not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Fine {verdict}")
    })))
}

/// Approve a pending fine (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/fines/{fine_id}/approve",
    params(
        ("fine_id" = u64, Path, description = "ID of the fine to approve")
    ),
    responses(
        (status = 200, description = "Fine approved", body = Object, example = json!({
            "message": "Fine approved"
        })),
        (status = 400, description = "Fine not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Fines"
)]
pub async fn approve_fine(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    review_fine(auth, pool.get_ref(), path.into_inner(), "approved").await
}

/// Reject a pending fine (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/fines/{fine_id}/reject",
    params(
        ("fine_id" = u64, Path, description = "ID of the fine to reject")
    ),
    responses(
        (status = 200, description = "Fine rejected", body = Object, example = json!({
            "message": "Fine rejected"
        })),
        (status = 400, description = "Fine not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Fines"
)]
pub async fn reject_fine(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    review_fine(auth, pool.get_ref(), path.into_inner(), "rejected").await
}
