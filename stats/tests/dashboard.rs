use chrono::NaiveDate;
use records::{ClassRecord, VibeRating};
use serde_json::json;
use stats::{aggregate, overview, student_range, student_trend, Dimension, Overview};

fn record(id: i64, day: u32, location: &str, theme: Option<&str>, students: u32, vibe: i64) -> ClassRecord {
    ClassRecord {
        id,
        date: NaiveDate::from_ymd_opt(2026, 7, day).unwrap(),
        time: None,
        day_of_week: String::new(),
        location: Some(location.into()),
        class_type: None,
        is_heated: None,
        theme: theme.map(Into::into),
        theme_category: None,
        peak_pose: None,
        energy: None,
        student_count: students,
        vibe_rating: VibeRating::new(vibe).unwrap(),
        intention: None,
        notes: None,
        sequence: None,
    }
}

#[test]
fn overview_matches_dashboard_header() {
    let records = vec![
        record(1, 1, "Equinox Pine Street", Some("Joy"), 20, 5),
        record(2, 2, "Equinox Van Ness", Some("Joy"), 10, 4),
        record(3, 3, "Equinox Van Ness", None, 15, 4),
    ];
    let o = overview(&records);
    assert_eq!(o.total_classes, 3);
    assert_eq!(o.total_students, 45);
    assert_eq!(o.avg_vibe, Some(4.3));
    assert_eq!(o.locations_taught, 2);
    assert_eq!(o.unique_themes, 1);

    assert_eq!(overview(&[]).avg_vibe, None);
}

#[test]
fn trend_is_chronological_with_rolling_mean() {
    // newest first, as the store returns them
    let records = vec![
        record(4, 4, "A", None, 30, 5),
        record(3, 3, "A", None, 20, 5),
        record(2, 2, "A", None, 10, 5),
        record(1, 1, "A", None, 6, 5),
    ];
    let trend = student_trend(&records);
    let students: Vec<_> = trend.iter().map(|p| p.students).collect();
    assert_eq!(students, vec![6, 10, 20, 30]);
    let rolling: Vec<_> = trend.iter().map(|p| p.rolling_avg).collect();
    assert_eq!(rolling, vec![6.0, 8.0, 12.0, 20.0]);
}

#[test]
fn range_covers_extremes() {
    let records = vec![record(1, 1, "A", None, 12, 3), record(2, 2, "A", None, 32, 5)];
    let range = student_range(&records).unwrap();
    assert_eq!((range.min, range.max, range.average), (12, 32, 22.0));
    assert!(student_range(&[]).is_none());
}

#[test]
fn dashboard_types_serialize_with_stable_field_names() {
    let records = vec![
        record(1, 1, "Equinox Pine Street", Some("Joy"), 20, 5),
        record(2, 2, "Equinox Pine Street", None, 10, 4),
    ];

    let empty = serde_json::to_value(overview(&[])).unwrap();
    assert_eq!(empty["avg_vibe"], serde_json::Value::Null);

    let value = serde_json::to_value(overview(&records)).unwrap();
    assert_eq!(
        value,
        json!({
            "total_classes": 2,
            "total_students": 30,
            "avg_vibe": 4.5,
            "locations_taught": 1,
            "unique_themes": 1
        })
    );
    let back: Overview = serde_json::from_value(value).unwrap();
    assert_eq!(back, overview(&records));

    let groups = serde_json::to_value(aggregate(&records, Dimension::Location)).unwrap();
    assert_eq!(
        groups,
        json!([{
            "key": "Equinox Pine Street",
            "count": 2,
            "avg_students": 15.0,
            "avg_vibe": 4.5
        }])
    );

    let trend = serde_json::to_value(student_trend(&records)).unwrap();
    assert_eq!(trend[0]["date"], "2026-07-01");
    assert_eq!(trend[1]["rolling_avg"], 15.0);
}
