use crate::geo::DeviceClass;
use chrono::NaiveTime;
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    pub policy: AttendancePolicy,
}

/// Attendance rules as one immutable value instead of free constants, so
/// per-environment overrides and tests can swap them wholesale.
#[derive(Debug, Clone)]
pub struct AttendancePolicy {
    pub office_latitude: f64,
    pub office_longitude: f64,
    /// Geofence radius for mobile clients (GPS-grade fixes).
    pub mobile_radius_m: f64,
    /// Wide tolerance for non-mobile clients, where location is IP/wifi based.
    pub fallback_radius_m: f64,
    pub standard_in_time: NaiveTime,
    pub grace_minutes: u32,
    pub late_fine_amount: f64,
    pub task_fine_amount: f64,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            // P39F+5C Islamabad
            office_latitude: 33.6973,
            office_longitude: 73.0551,
            mobile_radius_m: 500.0,
            fallback_radius_m: 10_000.0,
            standard_in_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            grace_minutes: 15,
            late_fine_amount: 500.0,
            task_fine_amount: 500.0,
        }
    }
}

impl AttendancePolicy {
    pub fn geofence_radius_m(&self, device: DeviceClass) -> f64 {
        match device {
            DeviceClass::Mobile => self.mobile_radius_m,
            DeviceClass::Desktop => self.fallback_radius_m,
        }
    }

    fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            office_latitude: env_parse("OFFICE_LATITUDE", defaults.office_latitude),
            office_longitude: env_parse("OFFICE_LONGITUDE", defaults.office_longitude),
            mobile_radius_m: env_parse("GEOFENCE_MOBILE_RADIUS_M", defaults.mobile_radius_m),
            fallback_radius_m: env_parse("GEOFENCE_FALLBACK_RADIUS_M", defaults.fallback_radius_m),
            standard_in_time: env::var("STANDARD_IN_TIME")
                .ok()
                .map(|v| {
                    NaiveTime::parse_from_str(&v, "%H:%M")
                        .expect("STANDARD_IN_TIME must be HH:MM")
                })
                .unwrap_or(defaults.standard_in_time),
            grace_minutes: env_parse("GRACE_PERIOD_MINUTES", defaults.grace_minutes),
            late_fine_amount: env_parse("LATE_FINE_AMOUNT", defaults.late_fine_amount),
            task_fine_amount: env_parse("TASK_FINE_AMOUNT", defaults.task_fine_amount),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .unwrap(),
            refresh_token_ttl: env::var("REFRESH_TOKEN_TTL")
                .unwrap_or_else(|_| "604800".to_string()) // default 7 days
                .parse()
                .unwrap(),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_register_per_min: env::var("RATE_REGISTER_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_refresh_per_min: env::var("RATE_REFRESH_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            policy: AttendancePolicy::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_office_rules() {
        let policy = AttendancePolicy::default();
        assert_eq!(
            policy.standard_in_time,
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
        assert_eq!(policy.grace_minutes, 15);
        assert_eq!(policy.late_fine_amount, 500.0);
        assert_eq!(policy.task_fine_amount, 500.0);
    }

    #[test]
    fn radius_follows_device_class() {
        let policy = AttendancePolicy::default();
        assert_eq!(policy.geofence_radius_m(DeviceClass::Mobile), 500.0);
        assert_eq!(policy.geofence_radius_m(DeviceClass::Desktop), 10_000.0);
    }
}
