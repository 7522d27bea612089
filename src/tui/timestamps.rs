use chrono::{DateTime, Datelike, Utc};

/// Format an ingestion time with tiered display:
/// - Relative for <7 days: "2h ago", "3d ago"
/// - Absolute for ≥7 days: "Jan 15", "Dec 3, 2024"
/// - "—" when the backend sent no time
pub fn format_added_at(added_at: Option<&DateTime<Utc>>, now: &DateTime<Utc>) -> String {
    let Some(timestamp) = added_at else {
        return "—".to_string();
    };

    let duration = now.signed_duration_since(*timestamp);
    if duration.num_days() < 7 {
        format_relative(duration.num_seconds())
    } else {
        format_absolute(timestamp, now)
    }
}

/// Full timestamp for the viewer header
pub fn format_full(added_at: Option<&DateTime<Utc>>) -> String {
    added_at.map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()).unwrap_or_else(|| "unknown".to_string())
}

fn format_relative(seconds: i64) -> String {
    // Clock skew can put the backend slightly ahead of us
    if seconds < 60 {
        return "just now".to_string();
    }
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else {
        format!("{}m ago", minutes)
    }
}

fn format_absolute(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    if timestamp.year() == now.year() {
        timestamp.format("%b %-d").to_string()
    } else {
        timestamp.format("%b %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_missing_time() {
        assert_eq!(format_added_at(None, &now()), "—");
        assert_eq!(format_full(None), "unknown");
    }

    #[test]
    fn test_relative_tiers() {
        let now = now();
        assert_eq!(format_added_at(Some(&(now - Duration::seconds(30))), &now), "just now");
        assert_eq!(format_added_at(Some(&(now - Duration::minutes(45))), &now), "45m ago");
        assert_eq!(format_added_at(Some(&(now - Duration::hours(3))), &now), "3h ago");
        assert_eq!(format_added_at(Some(&(now - Duration::days(5))), &now), "5d ago");
    }

    #[test]
    fn test_future_time_is_just_now() {
        let now = now();
        assert_eq!(format_added_at(Some(&(now + Duration::minutes(2))), &now), "just now");
    }

    #[test]
    fn test_absolute_same_year() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap();
        assert_eq!(format_added_at(Some(&ts), &now()), "Jan 15");
    }

    #[test]
    fn test_absolute_different_year() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 3, 8, 0, 0).unwrap();
        assert_eq!(format_added_at(Some(&ts), &now()), "Dec 3, 2024");
    }

    #[test]
    fn test_format_full() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 3, 8, 5, 9).unwrap();
        assert_eq!(format_full(Some(&ts)), "2024-12-03 08:05:09 UTC");
    }
}
