use std::fmt;

use log::debug;
use stats::AggregateRow;
use thiserror::Error;

/// Default maximum prompt length, in characters.
pub const DEFAULT_BUDGET: usize = 4000;

const DATA_HEADER: &str = "TEACHING DATA:";
const IDEAS_HEADER: &str = "IDEAS ALREADY SUGGESTED:";
const PAIR_DELIMITER: &str = "; ";
const PAIR_SEPARATOR: &str = ": ";
const EMPTY_NOTICE: &str =
    "No classes have been logged yet, so draw on general yoga teaching experience instead.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompositionError {
    #[error("instruction is {length} characters, over the prompt budget of {budget}")]
    InstructionTooLong { length: usize, budget: usize },
}

/// A composed prompt and how many aggregate rows and earlier ideas made it in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptContext {
    text: String,
    rows_included: usize,
    rows_dropped: usize,
    ideas_included: usize,
    ideas_dropped: usize,
}

impl PromptContext {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn rows_included(&self) -> usize {
        self.rows_included
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_dropped
    }

    pub fn ideas_included(&self) -> usize {
        self.ideas_included
    }

    pub fn ideas_dropped(&self) -> usize {
        self.ideas_dropped
    }

    /// Length in characters, the unit the budget is measured in.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for PromptContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for PromptContext {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Builds prompts that never exceed `budget` characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Composer {
    budget: usize,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
        }
    }
}

impl Composer {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Render `rows` in order after `instruction`.
    ///
    /// Rows that would push the prompt past the budget are dropped from the
    /// end, so the leading (most frequent) groups survive. With no rows the
    /// prompt carries a short notice instead of data. Only an instruction
    /// that alone exceeds the budget is an error.
    pub fn compose(
        &self,
        rows: &[AggregateRow],
        instruction: &str,
    ) -> Result<PromptContext, CompositionError> {
        let instruction_len = instruction.chars().count();
        if instruction_len > self.budget {
            return Err(CompositionError::InstructionTooLong {
                length: instruction_len,
                budget: self.budget,
            });
        }

        if rows.is_empty() {
            let text = format!("{instruction}\n\n{EMPTY_NOTICE}");
            let text = if text.chars().count() <= self.budget {
                text
            } else {
                instruction.to_string()
            };
            return Ok(PromptContext {
                text,
                rows_included: 0,
                rows_dropped: 0,
                ideas_included: 0,
                ideas_dropped: 0,
            });
        }

        // "\n\n" + header + "\n"
        let mut used = instruction_len + DATA_HEADER.chars().count() + 3;
        let mut pairs = Vec::with_capacity(rows.len());
        for row in rows {
            let pair = pair(row);
            let cost = pair.chars().count()
                + if pairs.is_empty() {
                    0
                } else {
                    PAIR_DELIMITER.len()
                };
            if used + cost > self.budget {
                break;
            }
            used += cost;
            pairs.push(pair);
        }

        let rows_included = pairs.len();
        let rows_dropped = rows.len() - rows_included;
        if rows_dropped > 0 {
            debug!(
                "prompt budget {} reached: kept {} of {} rows",
                self.budget,
                rows_included,
                rows.len()
            );
        }

        let text = if pairs.is_empty() {
            instruction.to_string()
        } else {
            format!(
                "{instruction}\n\n{DATA_HEADER}\n{}",
                pairs.join(PAIR_DELIMITER)
            )
        };
        Ok(PromptContext {
            text,
            rows_included,
            rows_dropped,
            ideas_included: 0,
            ideas_dropped: 0,
        })
    }

    /// [`Composer::compose`], then list `ideas` under their own heading below
    /// the data.
    ///
    /// Ideas only use the budget the instruction and rows leave over, and
    /// trailing ideas are dropped first. They never cause an error.
    pub fn compose_avoiding(
        &self,
        rows: &[AggregateRow],
        instruction: &str,
        ideas: &[String],
    ) -> Result<PromptContext, CompositionError> {
        let mut context = self.compose(rows, instruction)?;
        if ideas.is_empty() {
            return Ok(context);
        }

        // "\n\n" + header + "\n"
        let mut used = context.len() + IDEAS_HEADER.chars().count() + 3;
        let mut kept: Vec<&str> = Vec::with_capacity(ideas.len());
        for idea in ideas {
            let cost = idea.chars().count() + usize::from(!kept.is_empty());
            if used + cost > self.budget {
                break;
            }
            used += cost;
            kept.push(idea);
        }

        context.ideas_included = kept.len();
        context.ideas_dropped = ideas.len() - kept.len();
        if context.ideas_dropped > 0 {
            debug!(
                "prompt budget {} reached: kept {} of {} earlier ideas",
                self.budget,
                kept.len(),
                ideas.len()
            );
        }
        if !kept.is_empty() {
            context.text.push_str(&format!("\n\n{IDEAS_HEADER}\n{}", kept.join("\n")));
        }
        Ok(context)
    }
}

/// [`Composer::compose`] with the [`DEFAULT_BUDGET`].
pub fn compose(
    rows: &[AggregateRow],
    instruction: &str,
) -> Result<PromptContext, CompositionError> {
    Composer::default().compose(rows, instruction)
}

/// The label a row is rendered under: group key followed by metric name.
///
/// Characters that would break the pair list apart are replaced.
pub fn label(row: &AggregateRow) -> String {
    let key: String = row
        .group_key
        .chars()
        .map(|c| match c {
            ';' => ',',
            '\n' | '\r' => ' ',
            c => c,
        })
        .collect();
    format!("{} {}", key.trim(), row.metric_name())
}

fn pair(row: &AggregateRow) -> String {
    format!("{}{PAIR_SEPARATOR}{:.1}", label(row), row.metric_value)
}

/// Recover the ordered `(label, value)` pairs from a composed prompt.
///
/// Returns an empty list for a prompt composed without data.
pub fn parse_context(prompt: &str) -> Vec<(String, f64)> {
    let marker = format!("\n\n{DATA_HEADER}\n");
    let Some(start) = prompt.rfind(&marker) else {
        return Vec::new();
    };
    let data = &prompt[start + marker.len()..];
    let data = match data.find(&format!("\n\n{IDEAS_HEADER}")) {
        Some(end) => &data[..end],
        None => data,
    };
    data.split(PAIR_DELIMITER)
        .filter_map(|pair| {
            let (label, value) = pair.rsplit_once(PAIR_SEPARATOR)?;
            let value = value.trim().parse::<f64>().ok()?;
            Some((label.to_string(), value))
        })
        .collect()
}
