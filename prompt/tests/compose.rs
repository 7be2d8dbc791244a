use prompt::{compose, label, parse_context, CompositionError, Composer, Instruction, Task};
use stats::{aggregate, to_rows, AggregateRow, Dimension, Metric};

fn rows(n: usize) -> Vec<AggregateRow> {
    (0..n)
        .map(|i| AggregateRow {
            group_key: format!("Theme number {i}"),
            metric: Metric::AvgStudents,
            metric_value: (i % 20) as f64 + 0.5,
        })
        .collect()
}

#[test]
fn budget_is_never_exceeded() {
    let instruction = Instruction::new(Task::Theme).text();
    for budget in [instruction.chars().count(), 1_200, 2_000, 4_000] {
        let composer = Composer::new(budget);
        let prompt = composer.compose(&rows(500), &instruction).unwrap();
        assert!(prompt.len() <= budget, "{} > {}", prompt.len(), budget);
        assert_eq!(prompt.rows_included() + prompt.rows_dropped(), 500);
    }
}

#[test]
fn trailing_rows_are_dropped_first() {
    let all = rows(500);
    let prompt = Composer::new(1_000).compose(&all, "Suggest a theme.").unwrap();
    let parsed = parse_context(prompt.as_str());
    assert!(!parsed.is_empty());
    assert!(prompt.rows_dropped() > 0);
    for (pair, row) in parsed.iter().zip(&all) {
        assert_eq!(pair.0, label(row));
    }
}

#[test]
fn instruction_over_budget_is_an_error() {
    let err = Composer::new(10)
        .compose(&rows(3), "This instruction is far too long")
        .unwrap_err();
    assert_eq!(
        err,
        CompositionError::InstructionTooLong {
            length: 32,
            budget: 10
        }
    );
}

#[test]
fn parse_recovers_pairs_in_order() {
    let data = vec![
        AggregateRow {
            group_key: "Joy".into(),
            metric: Metric::Count,
            metric_value: 2.0,
        },
        AggregateRow {
            group_key: "Joy".into(),
            metric: Metric::AvgStudents,
            metric_value: 8.0,
        },
        AggregateRow {
            group_key: "Strength: Core".into(),
            metric: Metric::AvgVibe,
            metric_value: 4.5,
        },
    ];
    let prompt = compose(&data, &Instruction::new(Task::Theme).text()).unwrap();
    let parsed = parse_context(prompt.as_str());
    assert_eq!(
        parsed,
        vec![
            ("Joy count".to_string(), 2.0),
            ("Joy avg_students".to_string(), 8.0),
            ("Strength: Core avg_vibe".to_string(), 4.5),
        ]
    );
}

#[test]
fn empty_history_gives_data_free_prompt() {
    let instruction = Instruction::new(Task::Sequence).text();
    let prompt = compose(&[], &instruction).unwrap();
    assert!(prompt.as_str().starts_with(&instruction));
    assert!(!prompt.as_str().contains("TEACHING DATA:"));
    assert!(parse_context(prompt.as_str()).is_empty());
    assert_eq!(prompt.rows_included(), 0);
}

#[test]
fn empty_notice_is_skipped_when_it_does_not_fit() {
    let prompt = Composer::new(5).compose(&[], "Hello").unwrap();
    assert_eq!(prompt.as_str(), "Hello");
}

#[test]
fn aggregated_history_flows_into_prompt() {
    use chrono::NaiveDate;
    use records::{ClassRecord, VibeRating};

    let record = |id: i64, theme: &str, students: u32, vibe: i64| ClassRecord {
        id,
        date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        time: None,
        day_of_week: "Friday".into(),
        location: Some("Downtown".into()),
        class_type: Some("Vinyasa".into()),
        is_heated: Some(false),
        theme: Some(theme.into()),
        theme_category: None,
        peak_pose: None,
        energy: None,
        student_count: students,
        vibe_rating: VibeRating::new(vibe).unwrap(),
        intention: None,
        notes: None,
        sequence: None,
    };
    let records = vec![
        record(1, "Joy", 10, 5),
        record(2, "Joy", 6, 1),
        record(3, "Calm", 4, 4),
    ];
    let rows = to_rows(&aggregate(&records, Dimension::Theme));
    let prompt = compose(&rows, "Suggest a theme.").unwrap();
    let parsed = parse_context(prompt.as_str());
    assert_eq!(parsed[0], ("Joy count".to_string(), 2.0));
    assert_eq!(parsed[1], ("Joy avg_students".to_string(), 8.0));
    assert_eq!(parsed[2], ("Joy avg_vibe".to_string(), 3.0));
    assert_eq!(parsed[3], ("Calm count".to_string(), 1.0));
}

#[test]
fn earlier_ideas_only_use_leftover_budget() {
    let instruction = Instruction::new(Task::Sequence).text();
    let ideas: Vec<String> = (0..5)
        .map(|i| format!("- Peak: Pose {i} | Sequence: {}", "y".repeat(600)))
        .collect();
    let budget = instruction.chars().count() + 10;
    let prompt = Composer::new(budget)
        .compose_avoiding(&rows(3), &instruction, &ideas)
        .unwrap();
    assert!(prompt.len() <= budget);
    assert_eq!(prompt.ideas_included(), 0);
    assert_eq!(prompt.ideas_dropped(), 5);

    let prompt = Composer::default()
        .compose_avoiding(&rows(3), &instruction, &ideas)
        .unwrap();
    assert!(prompt.len() <= prompt::DEFAULT_BUDGET);
    assert_eq!(prompt.rows_included(), 3);
    assert!(prompt.ideas_included() > 0 && prompt.ideas_dropped() > 0);
    assert!(prompt.as_str().contains("Pose 0"));
    assert_eq!(parse_context(prompt.as_str()).len(), 3);
}
