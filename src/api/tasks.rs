use crate::auth::auth::AuthUser;
use crate::model::task::{AssignmentStatus, Task};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateTask {
    #[schema(example = "Publish the Gulberg listing")]
    pub title: String,

    #[schema(nullable = true)]
    pub description: Option<String>,

    #[schema(example = "Huraira")]
    pub assigned_to: String,

    #[schema(example = "2026-01-05T18:00:00", value_type = String, nullable = true)]
    pub due_date: Option<NaiveDateTime>,
}

#[derive(Deserialize, ToSchema)]
pub struct RespondToTask {
    /// "accepted" or "rejected"
    #[schema(example = "accepted")]
    pub response: AssignmentStatus,
}

#[derive(Serialize, ToSchema)]
pub struct MyTaskResponse {
    #[serde(flatten)]
    pub task: Task,

    /// Accepted, incomplete and past due: the fine sweep will pick it up
    pub overdue: bool,
}

/// Assign a task to a user
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created", body = Object, example = json!({
            "message": "Task assigned"
        })),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tasks"
)]
pub async fn create_task(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateTask>,
) -> actix_web::Result<impl Responder> {
    if payload.title.trim().is_empty() || payload.assigned_to.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "title and assigned_to must not be empty"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO tasks (title, description, assigned_to, due_date, created_by)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.title.trim())
    .bind(&payload.description)
    .bind(payload.assigned_to.trim())
    .bind(payload.due_date)
    .bind(&auth.username)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user = %auth.username, "Failed to create task");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Task assigned"
    })))
}

/// Open tasks assigned to the caller, soonest due first
#[utoipa::path(
    get,
    path = "/api/v1/tasks/mine",
    responses(
        (status = 200, description = "Open tasks for the caller", body = [MyTaskResponse]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tasks"
)]
pub async fn my_tasks(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let tasks = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, title, description, assigned_to, status, assignment_status,
               due_date, created_by, created_at
        FROM tasks
        WHERE assigned_to = ?
        AND status NOT IN ('done', 'cancelled')
        ORDER BY due_date IS NULL, due_date ASC
        "#,
    )
    .bind(&auth.username)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user = %auth.username, "Failed to fetch assigned tasks");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let now = chrono::Local::now().naive_local();
    let tasks: Vec<MyTaskResponse> = tasks
        .into_iter()
        .map(|task| MyTaskResponse {
            overdue: task.is_overdue_for_fine(now),
            task,
        })
        .collect();

    Ok(HttpResponse::Ok().json(tasks))
}

/// Accept or reject a pending task assignment (assignee only)
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{task_id}/respond",
    request_body = RespondToTask,
    params(
        ("task_id" = u64, Path, description = "ID of the task to respond to")
    ),
    responses(
        (status = 200, description = "Response recorded", body = Object, example = json!({
            "message": "Task accepted"
        })),
        (status = 400, description = "Task not found, not yours, or already responded"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tasks"
)]
pub async fn respond_to_task(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<RespondToTask>,
) -> actix_web::Result<impl Responder> {
    let task_id = path.into_inner();

    if payload.response == AssignmentStatus::Pending {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Response must be accepted or rejected"
        })));
    }

    let result = sqlx::query(
        r#"
        UPDATE tasks
        SET assignment_status = ?
        WHERE id = ?
        AND assigned_to = ?
        AND assignment_status = 'pending'
        "#,
    )
    .bind(payload.response.to_string())
    .bind(task_id)
    .bind(&auth.username)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, task_id, "Task response failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Task not found, not assigned to you, or already responded"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Task {}", payload.response)
    })))
}

/// Mark an assigned task done (assignee only)
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{task_id}/complete",
    params(
        ("task_id" = u64, Path, description = "ID of the task to complete")
    ),
    responses(
        (status = 200, description = "Task completed", body = Object, example = json!({
            "message": "Task completed"
        })),
        (status = 400, description = "Task not found, not yours, or not open"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tasks"
)]
pub async fn complete_task(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let task_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE tasks
        SET status = 'done'
        WHERE id = ?
        AND assigned_to = ?
        AND status = 'open'
        "#,
    )
    .bind(task_id)
    .bind(&auth.username)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, task_id, "Task completion failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Task not found, not assigned to you, or not open"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Task completed"
    })))
}
