use std::{fmt, str::FromStr};

use indoc::indoc;
use records::{GeneratedIdea, IdeaKind};
use serde::{Deserialize, Serialize};

/// How many earlier ideas are listed so the model avoids repeating them.
pub const MAX_PREVIOUS_IDEAS: usize = 5;
const PREVIOUS_IDEA_CHARS: usize = 300;

/// What the instructor is asking the model for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Task {
    Theme,
    Sequence,
    Tip,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Theme => "theme",
            Task::Sequence => "sequence",
            Task::Tip => "tip",
        }
    }

    /// The history table replies to this task are remembered in.
    pub fn idea_kind(&self) -> Option<IdeaKind> {
        match self {
            Task::Theme => Some(IdeaKind::Theme),
            Task::Sequence => Some(IdeaKind::Sequence),
            Task::Tip => None,
        }
    }

    fn template(&self) -> &'static str {
        match self {
            Task::Theme => THEME_TEMPLATE,
            Task::Sequence => SEQUENCE_TEMPLATE,
            Task::Tip => TIP_TEMPLATE,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "theme" => Ok(Task::Theme),
            "sequence" => Ok(Task::Sequence),
            "tip" | "coaching" => Ok(Task::Tip),
            other => Err(format!("unknown task '{other}'")),
        }
    }
}

const PREAMBLE: &str = indoc! {"
    You are helping a yoga teacher plan classes based on their teaching history.
    The teaching data below is a list of '<group> <metric>: <value>' pairs separated by
    semicolons. count is how many classes were taught, avg_students is the mean
    attendance and avg_vibe is the mean class rating from 1 to 5."};

const THEME_TEMPLATE: &str = indoc! {"
    Based on this data, suggest a theme for my next class.

    RULES:
    1. Reference specific patterns from my teaching data (cite numbers)
    2. If you suggest a theme listed under ideas already suggested, give it a DIFFERENT approach (different angle, physical focus or message)
    3. Vary your suggestions - do not repeat the same theme AND the same approach

    Format your response as:
    THEME: [name]
    DATA INSIGHTS: [what patterns you see in my history - cite specific numbers]
    WHY THIS FITS: [how this theme connects to what works for me]
    APPROACH: [how to teach this theme - message, physical focus, how students should feel leaving]"};

const SEQUENCE_TEMPLATE: &str = indoc! {"
    The data covers my most popular classes (15 or more students), grouped by peak pose.
    Based on this data, suggest a peak pose and build a 60-minute sequence.

    RULES:
    1. Reference specific patterns from my teaching data (cite numbers)
    2. If you suggest a peak pose listed under ideas already suggested, build a DIFFERENT sequence (different warmup, standing poses and prep)
    3. Keep the sequence anatomically sound - proper warm-up for the peak and appropriate counter-poses
    4. Vary your suggestions - do not repeat the same pose AND the same sequence style

    Format your response as:
    PEAK POSE: [name]
    DATA INSIGHTS: [what patterns you see in my history - cite specific numbers]
    WHY THIS FITS: [how this connects to what works for me]
    SEQUENCE:
    - Warmup (10 min): [poses]
    - Standing (15 min): [poses]
    - Peak Prep (20 min): [poses]
    - Cool Down (10 min): [poses]
    - Savasana (5 min)"};

const TIP_TEMPLATE: &str = indoc! {"
    Based on this data, give me one practical coaching tip for my upcoming classes.

    RULES:
    1. Reference specific patterns from my teaching data (cite numbers)
    2. Keep it actionable in a single class

    Format your response as:
    TIP: [one sentence]
    WHY: [the pattern in my data that motivates it]
    TRY THIS: [a concrete cue or drill]"};

fn clip(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// The fixed instruction for a [`Task`], plus the earlier ideas the model
/// should steer away from.
///
/// [`Instruction::text`] never includes the earlier ideas. They are handed
/// to the composer separately as [`Instruction::reminders`] so they can be
/// dropped when the budget runs short.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    task: Task,
    previous: Vec<GeneratedIdea>,
}

impl Instruction {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            previous: Vec::new(),
        }
    }

    /// Remember up to [`MAX_PREVIOUS_IDEAS`] of `ideas`, most recent first.
    pub fn avoiding(mut self, ideas: impl IntoIterator<Item = GeneratedIdea>) -> Self {
        self.previous = ideas.into_iter().take(MAX_PREVIOUS_IDEAS).collect();
        self
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn text(&self) -> String {
        format!("{PREAMBLE}\n\n{}", self.task.template())
    }

    /// One single-line entry per earlier idea, most recent first.
    pub fn reminders(&self) -> Vec<String> {
        let (title, body) = match self.task {
            Task::Sequence => ("Peak", "Sequence"),
            _ => ("Theme", "Approach"),
        };
        self.previous
            .iter()
            .map(|idea| {
                format!(
                    "- {title}: {} | {body}: {}",
                    one_line(&clip(idea.title.trim(), PREVIOUS_IDEA_CHARS)),
                    one_line(&clip(idea.body.trim(), PREVIOUS_IDEA_CHARS))
                )
            })
            .collect()
    }
}

fn one_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn idea(title: &str, body: &str) -> GeneratedIdea {
        GeneratedIdea {
            kind: IdeaKind::Theme,
            title: title.into(),
            body: body.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn each_task_asks_for_its_format() {
        assert!(Instruction::new(Task::Theme).text().contains("THEME: [name]"));
        assert!(Instruction::new(Task::Sequence).text().contains("PEAK POSE: [name]"));
        assert!(Instruction::new(Task::Tip).text().contains("TIP:"));
    }

    #[test]
    fn earlier_ideas_leave_the_text_unchanged() {
        let plain = Instruction::new(Task::Theme);
        let avoiding = plain.clone().avoiding(vec![idea("Balance", "Slow flow")]);
        assert_eq!(plain.text(), avoiding.text());
        assert_eq!(
            avoiding.reminders(),
            vec!["- Theme: Balance | Approach: Slow flow".to_string()]
        );
    }

    #[test]
    fn reminders_are_capped_and_clipped() {
        let long = "x".repeat(1000);
        let ideas: Vec<_> = (0..8).map(|i| idea(&format!("Idea {i}"), &long)).collect();
        let reminders = Instruction::new(Task::Theme).avoiding(ideas).reminders();
        assert_eq!(reminders.len(), MAX_PREVIOUS_IDEAS);
        assert!(reminders[4].contains("Idea 4"));
        assert!(reminders.iter().all(|r| !r.contains(&"x".repeat(301))));
    }

    #[test]
    fn reminders_stay_on_one_line() {
        let reminders = Instruction::new(Task::Sequence)
            .avoiding(vec![idea("Crow\nPose", "Warmup\nStanding\r\nPeak")])
            .reminders();
        assert_eq!(
            reminders,
            vec!["- Peak: Crow Pose | Sequence: Warmup Standing  Peak".to_string()]
        );
    }
}
