pub mod attendance_filter;
pub mod role_cache;
