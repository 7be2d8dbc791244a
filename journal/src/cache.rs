use std::collections::HashMap;

use llm::Suggestion;
use prompt::Task;

/// Last suggestion per task for the current session. Never persisted.
#[derive(Debug, Default)]
pub struct SuggestionCache {
    entries: HashMap<Task, Suggestion>,
}

impl SuggestionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, task: Task) -> Option<&Suggestion> {
        self.entries.get(&task)
    }

    pub fn insert(&mut self, task: Task, suggestion: Suggestion) {
        self.entries.insert(task, suggestion);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
