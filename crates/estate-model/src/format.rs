//! Derived display values.
//!
//! Views never compute these inline; they call the helpers here so list,
//! detail, and comparison output stay consistent.

use crate::record::CommunityRecord;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Source-relative image prefix used inside data files.
pub const SOURCE_ASSET_PREFIX: &str = "../assets/";
/// Public-serving prefix the site serves assets from.
pub const PUBLIC_ASSET_PREFIX: &str = "/assets/";

/// Average walking speed, meters per minute.
const WALK_METERS_PER_MINUTE: f64 = 80.0;
/// Average cycling speed, meters per minute.
const BIKE_METERS_PER_MINUTE: f64 = 250.0;

const UNKNOWN_STATION: &str = "未知站点";

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]{4})").expect("year regex"))
}

/// Parse a `YYYY-MM-DD` date; `None` when it is not a calendar date.
pub fn parse_date_value(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

/// Smallest positive, finite metro distance in meters.
pub fn nearest_metro_distance(record: &CommunityRecord) -> Option<f64> {
    record
        .metro()
        .iter()
        .filter_map(|m| m.distance_m)
        .filter(|d| d.is_finite() && *d > 0.0)
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.min(d))))
}

/// `"<station> <distance>"` for the nearest metro station, `-` when there is none.
///
/// Ties go to the station listed first.
pub fn nearest_metro_label(record: &CommunityRecord) -> String {
    let nearest = record
        .metro()
        .iter()
        .filter_map(|m| m.distance_m.filter(|d| d.is_finite()).map(|d| (m, d)))
        .fold(None, |acc, (m, d)| match acc {
            Some((_, best)) if best <= d => acc,
            _ => Some((m, d)),
        });

    match nearest {
        Some((metro, distance)) => {
            let station = metro
                .station
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(UNKNOWN_STATION);
            format!("{station} {}", format_distance_with_time(Some(distance)))
        }
        None => "-".to_string(),
    }
}

/// First four-digit run in `build.build_year_range`.
///
/// No plausibility check: `"9999"` is returned as-is.
pub fn build_start_year(record: &CommunityRecord) -> Option<u32> {
    let range = record.build.as_ref()?.build_year_range.as_deref()?;
    let caps = year_regex().captures(range)?;
    caps.get(1)?.as_str().parse().ok()
}

/// `850m（步行约11分钟 / 骑行约3分钟）`; `-` for missing, zero, or non-finite input.
pub fn format_distance_with_time(distance_m: Option<f64>) -> String {
    let distance = match distance_m {
        Some(d) if d != 0.0 && d.is_finite() => d,
        _ => return "-".to_string(),
    };
    let walk = (distance / WALK_METERS_PER_MINUTE).round() as i64;
    let bike = (distance / BIKE_METERS_PER_MINUTE).round() as i64;
    format!("{distance}m（步行约{walk}分钟 / 骑行约{bike}分钟）")
}

/// Rewrite a data-file image path to the path it is served from.
///
/// Empty and absent paths stay absent.
pub fn normalize_image_path(path: Option<&str>) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;
    match path.strip_prefix(SOURCE_ASSET_PREFIX) {
        Some(rest) => Some(format!("{PUBLIC_ASSET_PREFIX}{rest}")),
        None => Some(path.to_string()),
    }
}

/// Join a site base URL and a path with exactly one separating slash.
pub fn with_base_url(base_url: &str, target_path: &str) -> String {
    let clean_base = if base_url == "/" {
        ""
    } else {
        base_url.strip_suffix('/').unwrap_or(base_url)
    };
    let clean_path = target_path.strip_prefix('/').unwrap_or(target_path);
    format!("{clean_base}/{clean_path}")
}

/// Render an optional value, `-` when missing.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Build, Distance, MetroDistance};

    fn record_with_metro(metro: Vec<MetroDistance>) -> CommunityRecord {
        let mut record = CommunityRecord::new("c1", "测试小区", "2024-01-01");
        record.distance = Some(Distance {
            metro,
            to_targets: vec![],
        });
        record
    }

    fn metro(station: Option<&str>, distance_m: Option<f64>) -> MetroDistance {
        MetroDistance {
            station: station.map(str::to_string),
            line: Some("1号线".to_string()),
            distance_m,
        }
    }

    #[test]
    fn nearest_metro_ignores_non_positive_distances() {
        let record = record_with_metro(vec![
            metro(Some("A"), Some(0.0)),
            metro(Some("B"), Some(1200.0)),
            metro(Some("C"), Some(650.0)),
            metro(Some("D"), None),
        ]);
        assert_eq!(nearest_metro_distance(&record), Some(650.0));
        assert_eq!(nearest_metro_distance(&record_with_metro(vec![])), None);
    }

    #[test]
    fn nearest_metro_label_uses_first_of_ties_and_station_fallback() {
        let record = record_with_metro(vec![
            metro(None, Some(800.0)),
            metro(Some("后"), Some(800.0)),
        ]);
        assert_eq!(
            nearest_metro_label(&record),
            "未知站点 800m（步行约10分钟 / 骑行约3分钟）"
        );
        assert_eq!(nearest_metro_label(&record_with_metro(vec![])), "-");
    }

    #[test]
    fn distance_text_rounds_minutes() {
        assert_eq!(
            format_distance_with_time(Some(850.0)),
            "850m（步行约11分钟 / 骑行约3分钟）"
        );
        assert_eq!(format_distance_with_time(Some(0.0)), "-");
        assert_eq!(format_distance_with_time(None), "-");
        assert_eq!(format_distance_with_time(Some(f64::NAN)), "-");
    }

    #[test]
    fn build_year_takes_first_four_digits() {
        let mut record = record_with_metro(vec![]);
        record.build = Some(Build {
            build_year_range: Some("约2012-2015年".to_string()),
        });
        assert_eq!(build_start_year(&record), Some(2012));

        record.build = Some(Build {
            build_year_range: Some("unknown".to_string()),
        });
        assert_eq!(build_start_year(&record), None);

        record.build = None;
        assert_eq!(build_start_year(&record), None);
    }

    #[test]
    fn image_paths_rewrite_only_the_source_prefix() {
        assert_eq!(
            normalize_image_path(Some("../assets/cover.jpg")).as_deref(),
            Some("/assets/cover.jpg")
        );
        assert_eq!(
            normalize_image_path(Some("https://example.com/x.jpg")).as_deref(),
            Some("https://example.com/x.jpg")
        );
        assert_eq!(normalize_image_path(None), None);
        assert_eq!(normalize_image_path(Some("")), None);
    }

    #[test]
    fn base_url_join_avoids_double_slashes() {
        assert_eq!(with_base_url("/", "/communities"), "/communities");
        assert_eq!(with_base_url("/site/", "communities/a"), "/site/communities/a");
        assert_eq!(with_base_url("/site", "/assets/x.jpg"), "/site/assets/x.jpg");
    }

    #[test]
    fn date_values_parse_calendar_dates_only() {
        assert!(parse_date_value("2024-02-29").is_some());
        assert!(parse_date_value("2023-02-30").is_none());
        assert!(parse_date_value("not a date").is_none());
    }
}
