use crate::api::attendance::{
    AttendanceSummaryResponse, CheckInRequest, CheckInResponse, LocationStatusResponse,
    SummaryQuery, TodayResponse,
};
use crate::api::fines::{FineFilter, FineListResponse};
use crate::api::tasks::{CreateTask, MyTaskResponse, RespondToTask};
use crate::geo::{DeviceClass, GeoFailure};
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::fine::{Fine, FineStatus};
use crate::model::task::{AssignmentStatus, Task, TaskStatus};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendgate API",
        version = "1.0.0",
        description = r#"
## Geofenced Attendance & Fines Service

Backend for office attendance tracking gated on physical presence, with
automatic fine creation pending HR review.

### Key Features
- **Attendance**
  - Manual and page-load check-in, gated by a geofence around the office
  - Device-aware geofence radius (GPS-grade mobile fixes vs. desktop)
  - Late classification against a standard in-time with a grace window
- **Fines**
  - Automatic pending fines for late arrivals and overdue accepted tasks
  - HR approve/reject review flow
- **Tasks**
  - Assignment with accept/reject responses and due dates

### Security
Most endpoints are protected using **JWT Bearer authentication**.
Fine review is restricted to **HR** and **Admin** roles; the CEO/COO role is
exempt from automatic fines.

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::auto_check_in,
        crate::api::attendance::location_status,
        crate::api::attendance::today,
        crate::api::attendance::summary,

        crate::api::fines::list_fines,
        crate::api::fines::get_fine,
        crate::api::fines::my_fines,
        crate::api::fines::approve_fine,
        crate::api::fines::reject_fine,

        crate::api::tasks::create_task,
        crate::api::tasks::my_tasks,
        crate::api::tasks::respond_to_task,
        crate::api::tasks::complete_task
    ),
    components(
        schemas(
            CheckInRequest,
            CheckInResponse,
            LocationStatusResponse,
            TodayResponse,
            SummaryQuery,
            AttendanceSummaryResponse,
            Attendance,
            AttendanceStatus,
            DeviceClass,
            GeoFailure,
            Fine,
            FineStatus,
            FineFilter,
            FineListResponse,
            CreateTask,
            RespondToTask,
            MyTaskResponse,
            Task,
            TaskStatus,
            AssignmentStatus
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Geofenced attendance APIs"),
        (name = "Fines", description = "Fine creation and HR review APIs"),
        (name = "Tasks", description = "Task assignment APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
