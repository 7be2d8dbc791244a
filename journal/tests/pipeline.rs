use std::time::Duration;

use chrono::{NaiveDate, Utc};
use journal::{Journal, JournalError, Stage, Task};
use llm::{LLMError, ModelCatalog, RetryPolicy, ScriptedBackend, SuggestionClient};
use prompt::{parse_context, DEFAULT_BUDGET};
use records::{
    ClassFilter, GeneratedIdea, IdeaKind, MemoryStore, NewClass, RecordStore, VibeRating,
};

fn class(theme: Option<&str>, pose: Option<&str>, students: u32, vibe: i64) -> NewClass {
    NewClass {
        date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
        time: None,
        location: "Equinox Palo Alto".into(),
        class_type: "Yin 60".into(),
        theme: theme.map(Into::into),
        intention: None,
        peak_pose: pose.map(Into::into),
        energy: None,
        student_count: students,
        vibe_rating: VibeRating::new(vibe).unwrap(),
        notes: None,
        sequence: None,
    }
}

fn journal(backend: ScriptedBackend) -> Journal<MemoryStore, ScriptedBackend> {
    let client = SuggestionClient::new(backend, ModelCatalog::hosted()).with_policy(
        RetryPolicy::default().with_backoff(Duration::from_millis(1), Duration::from_millis(2)),
    );
    Journal::new(MemoryStore::new(), client, "mistral-large-latest".parse().unwrap())
}

async fn log_history(journal: &Journal<MemoryStore, ScriptedBackend>) {
    for c in [
        class(Some("Hip Openers"), Some("Pigeon"), 10, 4),
        class(Some("Hip Openers"), Some("Crow"), 8, 5),
        class(Some("Backbends"), Some("Wheel"), 6, 3),
    ] {
        journal.log_class(&c).await.unwrap();
    }
}

#[tokio::test]
async fn theme_suggestion_runs_the_whole_chain() {
    let backend = ScriptedBackend::new()
        .reply("THEME: Rooted Hips\nDATA INSIGHTS: Hip Openers averaged 9.0\nAPPROACH: Slow, grounded hip work.");
    let mut journal = journal(backend.clone());
    log_history(&journal).await;

    let suggestion = journal
        .inspire(Task::Theme, &ClassFilter::new())
        .await
        .unwrap();
    assert_eq!(suggestion.attempts, 1);
    assert!(suggestion.raw_response_text.starts_with("THEME: Rooted Hips"));

    let prompt = &backend.prompts()[0];
    assert!(prompt.contains("TEACHING DATA:\nHip Openers count: 2.0; Hip Openers avg_students: 9.0; Hip Openers avg_vibe: 4.5; Backbends count: 1.0"));

    let saved = journal
        .store()
        .recent_ideas(IdeaKind::Theme, 5)
        .await
        .unwrap();
    assert_eq!(saved[0].title, "Rooted Hips");
    assert_eq!(saved[0].body, "Slow, grounded hip work.");
    assert_eq!(
        journal.cache().get(Task::Theme).map(|s| s.attempts),
        Some(1)
    );
}

#[tokio::test]
async fn earlier_ideas_are_listed_in_the_next_prompt() {
    let backend = ScriptedBackend::new()
        .reply("THEME: Rooted Hips\nAPPROACH: ground down")
        .reply("THEME: Open Heart\nAPPROACH: lift up");
    let mut journal = journal(backend.clone());
    log_history(&journal).await;

    journal.inspire(Task::Theme, &ClassFilter::new()).await.unwrap();
    journal.inspire(Task::Theme, &ClassFilter::new()).await.unwrap();

    let prompts = backend.prompts();
    assert!(!prompts[0].contains("IDEAS ALREADY SUGGESTED"));
    assert!(prompts[1].contains("IDEAS ALREADY SUGGESTED"));
    assert!(prompts[1].contains("Theme: Rooted Hips | Approach: ground down"));
}

#[tokio::test]
async fn long_earlier_ideas_never_crowd_out_the_data() {
    let journal = journal(ScriptedBackend::new());
    for i in 0..12 {
        let pose = format!("Pose {i}");
        journal
            .log_class(&class(None, Some(&pose), 20, 4))
            .await
            .unwrap();
    }
    let outline = "- Warmup (10 min): cat cow, child's pose\\n".repeat(40);
    for i in 0..5 {
        let idea = GeneratedIdea {
            kind: IdeaKind::Sequence,
            title: format!("Peak {i} ").repeat(60),
            body: outline.clone(),
            created_at: Utc::now(),
        };
        journal.store().record_idea(&idea).await.unwrap();
    }

    let context = journal
        .prepare(Task::Sequence, &ClassFilter::new())
        .await
        .unwrap();
    assert!(context.len() <= DEFAULT_BUDGET, "{}", context.len());
    assert_eq!(context.rows_included(), 36);
    assert_eq!(context.rows_dropped(), 0);
    assert!(context.ideas_included() > 0);
    assert_eq!(context.ideas_included() + context.ideas_dropped(), 5);
    assert_eq!(parse_context(context.as_str()).len(), 36);
}

#[tokio::test]
async fn sequences_draw_on_full_classes_grouped_by_pose() {
    let backend = ScriptedBackend::new().reply("PEAK POSE: Crow\nSEQUENCE:\n- Warmup (10 min): cat cow");
    let mut journal = journal(backend.clone());
    journal
        .log_class(&class(None, Some("Crow"), 22, 5))
        .await
        .unwrap();
    journal
        .log_class(&class(None, Some("Pigeon"), 6, 4))
        .await
        .unwrap();

    journal
        .inspire(Task::Sequence, &ClassFilter::new())
        .await
        .unwrap();

    let prompt = &backend.prompts()[0];
    assert!(prompt.contains("Crow count: 1.0"));
    assert!(!prompt.contains("Pigeon"));
    let saved = journal
        .store()
        .recent_ideas(IdeaKind::Sequence, 5)
        .await
        .unwrap();
    assert_eq!(saved[0].title, "Crow");
}

#[tokio::test]
async fn empty_history_still_produces_a_prompt() {
    let backend = ScriptedBackend::new().reply("TIP: breathe");
    let mut journal = journal(backend.clone());
    let suggestion = journal.inspire(Task::Tip, &ClassFilter::new()).await.unwrap();
    assert_eq!(suggestion.raw_response_text, "TIP: breathe");
    assert!(!backend.prompts()[0].contains("TEACHING DATA:"));
}

#[tokio::test]
async fn retried_failures_are_reported_as_suggestion_stage() {
    let backend = ScriptedBackend::new()
        .fail(LLMError::Transient("HTTP 429".into()))
        .fail(LLMError::Transient("HTTP 429".into()))
        .fail(LLMError::Transient("HTTP 429".into()));
    let mut journal = journal(backend.clone());
    log_history(&journal).await;

    let err = journal
        .inspire(Task::Theme, &ClassFilter::new())
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Suggestion);
    assert!(err.retryable());
    assert!(matches!(&err, JournalError::Suggestion(e) if e.attempts == 3));
    assert!(journal.cache().is_empty());
    assert_eq!(backend.calls(), 3);
}

#[tokio::test]
async fn tiny_budget_is_a_composition_error() {
    let backend = ScriptedBackend::new().reply("unused");
    let mut journal = journal(backend.clone()).with_budget(20);
    let err = journal
        .inspire(Task::Theme, &ClassFilter::new())
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Composition);
    assert!(!err.retryable());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn editing_a_missing_class_is_a_store_error() {
    let journal = journal(ScriptedBackend::new());
    let err = journal.edit_class(42, |_| {}).await.unwrap_err();
    assert_eq!(err.stage(), Stage::Store);

    let id = journal
        .log_class(&class(Some("Balance"), None, 9, 3))
        .await
        .unwrap();
    let updated = journal
        .edit_class(id, |c| c.student_count = 12)
        .await
        .unwrap();
    assert_eq!(updated.student_count, 12);
    assert_eq!(updated.theme.as_deref(), Some("Balance"));
}

#[tokio::test]
async fn dashboard_over_sample_classes() {
    let journal = journal(ScriptedBackend::new());
    let inserted = journal.seed_samples().await.unwrap();
    let dashboard = journal.dashboard(&ClassFilter::new()).await.unwrap();
    assert_eq!(dashboard.overview.total_classes, inserted);
    assert_eq!(dashboard.trend.len(), inserted);
    assert!(dashboard.top_themes.len() <= 5);
    let counted: usize = dashboard.by_location.iter().map(|g| g.count).sum();
    assert_eq!(counted, inserted);
    let by_type: usize = dashboard.by_class_type.iter().map(|g| g.count).sum();
    assert_eq!(by_type, inserted);
    assert!(dashboard
        .by_class_type
        .iter()
        .all(|g| g.key != stats::UNSPECIFIED));
    assert!(dashboard.range.is_some());
}
