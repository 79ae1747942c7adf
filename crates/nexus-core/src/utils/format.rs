use chrono::{DateTime, Utc};

/// Human-readable age of a timestamp ("just now", "5m ago", "2h ago", "3d ago")
pub fn age_display(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew (negative ages)
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        let remaining_mins = minutes % 60;
        if remaining_mins >= 30 {
            // Round up: 1h 30m+ becomes 2h
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        let remaining_hours = (minutes % 1440) / 60;
        if remaining_hours >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_age_display() {
        let now = Utc::now();
        assert_eq!(age_display(now, now), "just now");
        assert_eq!(age_display(now + Duration::minutes(5), now), "just now");
        assert_eq!(age_display(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(age_display(now - Duration::minutes(90), now), "2h ago");
        assert_eq!(age_display(now - Duration::minutes(70), now), "1h ago");
        assert_eq!(age_display(now - Duration::hours(50), now), "2d ago");
        assert_eq!(age_display(now - Duration::hours(60), now), "3d ago");
    }
}
