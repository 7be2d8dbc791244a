use chrono::{DateTime, Utc};
use records::GeneratedIdea;

use crate::Task;

const APPROACH_CHARS: usize = 300;
const OUTLINE_CHARS: usize = 500;

/// Text following `marker`, up to the end of that line.
fn line_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let (_, rest) = text.split_once(marker)?;
    Some(rest.lines().next().unwrap_or_default())
}

/// Everything following `marker`.
fn rest_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    text.split_once(marker).map(|(_, rest)| rest)
}

/// Strip whitespace and markdown emphasis around a field value.
fn clean(value: &str) -> &str {
    value.trim().trim_matches('*').trim()
}

fn clip(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Pull the headline and body out of a model reply so it can be remembered.
///
/// Theme replies need a `THEME:` line; the `APPROACH:` section becomes the
/// body. Sequence replies need both `PEAK POSE:` and `SEQUENCE:`. Tips are
/// never remembered. Returns `None` when the reply does not follow the
/// requested format.
pub fn extract_idea(task: Task, response: &str, at: DateTime<Utc>) -> Option<GeneratedIdea> {
    let kind = task.idea_kind()?;
    let (title, body) = match task {
        Task::Theme => {
            let title = clean(line_after(response, "THEME:")?);
            let body = rest_after(response, "APPROACH:")
                .map(|approach| clip(clean(approach), APPROACH_CHARS))
                .unwrap_or_default();
            (title, body)
        }
        Task::Sequence => {
            let title = clean(line_after(response, "PEAK POSE:")?);
            let body = clip(clean(rest_after(response, "SEQUENCE:")?), OUTLINE_CHARS);
            (title, body)
        }
        Task::Tip => return None,
    };
    if title.is_empty() {
        return None;
    }
    Some(GeneratedIdea {
        kind,
        title: title.to_string(),
        body,
        created_at: at,
    })
}
