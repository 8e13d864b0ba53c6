//! Presentational formatting for task and node records.

use chrono::{DateTime, Utc};
use serde::Deserialize;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Compute resources as reported by the task server.
pub struct Resources {
    pub cpu_cores: u32,
    pub ram_gb: f64,
    pub disk_gb: f64,
    pub preemptible: bool,
}

/// `"4 CPU cores, 8 GB RAM, 100 GB disk space, preemptible"`; zero-valued
/// optional parts are omitted.
pub fn format_resources(resources: &Resources) -> String {
    let mut rendered = format!("{} CPU cores", resources.cpu_cores);
    if resources.ram_gb > 0.0 {
        rendered.push_str(&format!(", {} GB RAM", resources.ram_gb));
    }
    if resources.disk_gb > 0.0 {
        rendered.push_str(&format!(", {} GB disk space", resources.disk_gb));
    }
    if resources.preemptible {
        rendered.push_str(", preemptible");
    }
    rendered
}

/// Renders RFC 3339 or unix-seconds timestamps in UTC. Anything else is
/// returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return parsed
            .with_timezone(&Utc)
            .format(TIMESTAMP_FORMAT)
            .to_string();
    }
    if let Some(parsed) = trimmed
        .parse::<i64>()
        .ok()
        .and_then(|seconds| DateTime::<Utc>::from_timestamp(seconds, 0))
    {
        return parsed.format(TIMESTAMP_FORMAT).to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_resources, format_timestamp, Resources};

    #[test]
    fn unit_format_resources_includes_only_present_parts() {
        assert_eq!(
            format_resources(&Resources {
                cpu_cores: 2,
                ..Resources::default()
            }),
            "2 CPU cores"
        );
        assert_eq!(
            format_resources(&Resources {
                cpu_cores: 4,
                ram_gb: 8.0,
                disk_gb: 1.5,
                preemptible: true,
            }),
            "4 CPU cores, 8 GB RAM, 1.5 GB disk space, preemptible"
        );
    }

    #[test]
    fn unit_format_timestamp_normalizes_offsets_to_utc() {
        assert_eq!(
            format_timestamp("2018-06-01T12:30:00-07:00"),
            "2018-06-01 19:30:00 UTC"
        );
        assert_eq!(format_timestamp("0"), "1970-01-01 00:00:00 UTC");
    }

    #[test]
    fn regression_format_timestamp_passes_through_unparsable_input() {
        assert_eq!(format_timestamp("yesterday"), "yesterday");
        assert_eq!(format_timestamp(""), "");
    }

    #[test]
    fn unit_resources_deserialize_from_camel_case_payload() {
        let resources: Resources =
            serde_json::from_str(r#"{"cpuCores": 1, "ramGb": 3.5}"#).expect("parse resources");
        assert_eq!(format_resources(&resources), "1 CPU cores, 3.5 GB RAM");
    }
}
