use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two decimal-degree coordinates
/// (haversine). Assumes valid numeric input; NaN propagates.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Known mobile OS/browser tokens, matched case-insensitively.
const MOBILE_UA_TOKENS: [&str; 7] = [
    "android",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    /// Inconclusive or missing user agents fall back to Desktop, which
    /// carries the wide tolerance radius (non-GPS fixes are unreliable).
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_lowercase();
        if MOBILE_UA_TOKENS.iter().any(|token| ua.contains(token)) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Client-reported geolocation failure kinds. The browser acquires the fix
/// (single shot, high accuracy, maximumAge 0, 10-15s timeout) and posts the
/// failure kind when it could not produce one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum GeoFailure {
    PermissionDenied,
    Timeout,
    PositionUnavailable,
    Unsupported,
}

impl GeoFailure {
    pub fn message(&self) -> &'static str {
        match self {
            GeoFailure::PermissionDenied => {
                "Location permission denied. Allow location access to check in."
            }
            GeoFailure::Timeout => "Timed out getting your location. Please try again.",
            GeoFailure::PositionUnavailable => {
                "Your position is currently unavailable. Please try again."
            }
            GeoFailure::Unsupported => "Geolocation is not supported on this device.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_between_identical_points_is_zero() {
        let d = haversine_distance_m(33.6973, 73.0551, 33.6973, 73.0551);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn half_degree_of_latitude_is_about_55_km() {
        // 0.5 deg of latitude along a meridian: R * 0.5 * pi / 180
        let d = haversine_distance_m(33.0, 73.0, 33.5, 73.0);
        assert!((d - 55_597.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn iphone_user_agent_is_mobile() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        assert_eq!(DeviceClass::from_user_agent(ua), DeviceClass::Mobile);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            DeviceClass::from_user_agent("ANDROID build"),
            DeviceClass::Mobile
        );
        assert_eq!(
            DeviceClass::from_user_agent("opera MINI/36.2"),
            DeviceClass::Mobile
        );
    }

    #[test]
    fn every_listed_token_maps_to_mobile() {
        for token in MOBILE_UA_TOKENS {
            assert_eq!(
                DeviceClass::from_user_agent(token),
                DeviceClass::Mobile,
                "token {token}"
            );
        }
    }

    #[test]
    fn empty_or_desktop_user_agent_is_desktop() {
        assert_eq!(DeviceClass::from_user_agent(""), DeviceClass::Desktop);
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0";
        assert_eq!(DeviceClass::from_user_agent(ua), DeviceClass::Desktop);
    }
}
