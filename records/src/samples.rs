//! A fortnight-and-a-bit of example classes for trying the journal out.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::{
    model::{Energy, NewClass, VibeRating},
    reference::{CLASS_TYPES, LOCATIONS, THEMES},
};

// (days ago, time, location, class type, theme, intention, peak, energy, students, vibe, notes)
// Indices refer to the reference tables.
type SampleRow = (
    i64,
    (u32, u32),
    usize,
    usize,
    usize,
    &'static str,
    &'static str,
    Energy,
    u32,
    i64,
    &'static str,
);

const SAMPLES: &[SampleRow] = &[
    (45, (9, 0), 0, 0, 0, "Open hips to release tension", "Pigeon", Energy::High, 22, 5, "Great energy!"),
    (42, (18, 30), 1, 1, 1, "Open heart to give and receive", "Wheel", Energy::VeryHigh, 28, 5, "Packed class!"),
    (38, (7, 0), 0, 0, 2, "Find steadiness in instability", "Dancer", Energy::Medium, 15, 4, "Focused group"),
    (35, (12, 0), 2, 2, 6, "Release what no longer serves", "Pigeon", Energy::Low, 18, 5, "Emotional releases"),
    (31, (9, 0), 1, 1, 0, "Create space in hips", "Flying Pigeon", Energy::VeryHigh, 35, 5, "Sunday packed!"),
    (28, (18, 30), 0, 0, 11, "Be here now", "Crow", Energy::High, 20, 4, "Good arm balance work"),
    (24, (9, 0), 2, 1, 1, "Expand capacity for love", "Camel", Energy::High, 25, 5, "Beautiful backbends"),
    (21, (7, 0), 0, 0, 4, "Build strength from center", "Crow", Energy::High, 16, 4, "Core was intense"),
    (17, (18, 30), 1, 0, 3, "Rinse and release", "Revolved Triangle", Energy::Medium, 19, 4, "Twist-heavy class"),
    (14, (9, 0), 2, 1, 10, "Find joy in practice", "Dancer", Energy::High, 30, 5, "Lots of laughter"),
    (10, (12, 0), 0, 4, 13, "Surrender to what is", "Reclined Butterfly", Energy::Low, 12, 5, "Perfect Yin class"),
    (7, (9, 0), 1, 0, 0, "Free the hips", "King Pigeon", Energy::VeryHigh, 32, 5, "Saturday hit!"),
    (4, (18, 30), 0, 0, 2, "Find your center", "Standing Splits", Energy::High, 21, 4, "Balance challenge"),
    (2, (9, 0), 2, 0, 8, "Appreciate what you have", "Wheel", Energy::High, 24, 5, "Gratitude resonated"),
];

/// Sample classes dated relative to `today`.
pub fn sample_classes(today: NaiveDate) -> Vec<NewClass> {
    SAMPLES
        .iter()
        .filter_map(
            |&(days_ago, (h, m), loc, ct, theme, intention, peak, energy, students, vibe, notes)| {
                Some(NewClass {
                    date: today - Duration::days(days_ago),
                    time: NaiveTime::from_hms_opt(h, m, 0),
                    location: LOCATIONS[loc].0.to_string(),
                    class_type: CLASS_TYPES[ct].3.to_string(),
                    theme: Some(THEMES[theme].0.to_string()),
                    intention: Some(intention.to_string()),
                    peak_pose: Some(peak.to_string()),
                    energy: Some(energy),
                    student_count: students,
                    vibe_rating: VibeRating::new(vibe).ok()?,
                    notes: Some(notes.to_string()),
                    sequence: None,
                })
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_samples_are_valid() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let classes = sample_classes(today);
        assert_eq!(classes.len(), SAMPLES.len());
        assert!(classes.iter().all(|c| c.date < today));
    }
}
