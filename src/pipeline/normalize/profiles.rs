//! Per-type candidate-key tables driving the shared normalizer.
//!
//! Each record type differs only in which payload keys it probes, so the
//! whole behavior lives in static data. Adding a fourth record type means
//! adding a profile here and a variant to `RecordType`.

use crate::domain::RecordType;

/// Ordered candidate-key lists for one record type. The first present,
/// non-empty value wins for each field.
#[derive(Debug)]
pub struct TypeProfile {
    pub severity_keys: &'static [&'static str],
    pub time_keys: &'static [&'static str],
    pub summary_keys: &'static [&'static str],
    pub region_keys: &'static [&'static str],
    /// Top-level keys copied into the metrics map, overriding any key of the
    /// same name in a nested `metrics` object.
    pub metric_overlay_keys: &'static [&'static str],
}

pub const BULLETIN_PROFILE: TypeProfile = TypeProfile {
    severity_keys: &["danger", "avalanche_danger", "severity", "danger_level"],
    time_keys: &["issued_at", "timestamp", "valid_time", "date"],
    summary_keys: &["summary", "headline", "description", "text"],
    region_keys: &["region", "zone", "area"],
    metric_overlay_keys: &["rose", "aspects", "elevation_bands", "travel_advice"],
};

pub const OBSERVATION_PROFILE: TypeProfile = TypeProfile {
    severity_keys: &["severity", "danger", "hazard_level", "risk"],
    time_keys: &["observed_at", "timestamp", "date", "time"],
    summary_keys: &["summary", "notes", "description", "observation"],
    region_keys: &["region", "zone", "area"],
    metric_overlay_keys: &[
        "snow_depth_cm",
        "new_snow_cm",
        "wind_speed_mph",
        "temperature_f",
        "aspect",
        "slope_angle",
    ],
};

pub const WEATHER_PROFILE: TypeProfile = TypeProfile {
    severity_keys: &["severity", "alert_level", "warning_level"],
    time_keys: &["recorded_at", "timestamp", "observation_time", "time", "date"],
    summary_keys: &["summary", "conditions", "description"],
    region_keys: &["region", "zone", "station_region"],
    metric_overlay_keys: &[
        "temperature_f",
        "temperature_c",
        "wind_speed_mph",
        "wind_gust_mph",
        "wind_direction",
        "relative_humidity",
        "snow_depth_cm",
        "new_snow_cm",
        "pressure_mb",
        "visibility_miles",
    ],
};

pub fn profile_for(record_type: RecordType) -> &'static TypeProfile {
    match record_type {
        RecordType::Bulletin => &BULLETIN_PROFILE,
        RecordType::Observation => &OBSERVATION_PROFILE,
        RecordType::Weather => &WEATHER_PROFILE,
    }
}
