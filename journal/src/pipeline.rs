use chrono::Local;
use log::{info, warn};

use llm::{GenerationParams, ModelId, Suggestion, SuggestionClient, TextGenerator};
use prompt::{extract_idea, Composer, Instruction, PromptContext, Task, MAX_PREVIOUS_IDEAS};
use records::{
    samples::sample_classes, ClassFilter, ClassId, ClassRecord, ClassType, Location, NewClass,
    RecordStore, Theme,
};
use stats::{aggregate, student_range, student_trend, to_rows, Dimension, GroupSummary};

use crate::cache::SuggestionCache;
use crate::error::JournalError;
use crate::report::Dashboard;

/// Sequence ideas are drawn only from classes at least this full.
pub const SEQUENCE_MIN_STUDENTS: u32 = 15;

fn dimension_for(task: Task) -> Dimension {
    match task {
        Task::Theme => Dimension::Theme,
        Task::Sequence => Dimension::Pose,
        Task::Tip => Dimension::Location,
    }
}

fn filter_for(task: Task, filter: &ClassFilter) -> ClassFilter {
    let mut filter = filter.clone();
    if task == Task::Sequence {
        let min = filter.min_students.unwrap_or(0).max(SEQUENCE_MIN_STUDENTS);
        filter.min_students = Some(min);
    }
    filter
}

pub struct Journal<S, G> {
    store: S,
    client: SuggestionClient<G>,
    model: ModelId,
    params: GenerationParams,
    composer: Composer,
    cache: SuggestionCache,
}

impl<S: RecordStore, G: TextGenerator> Journal<S, G> {
    pub fn new(store: S, client: SuggestionClient<G>, model: ModelId) -> Self {
        Self {
            store,
            client,
            model,
            params: GenerationParams::default(),
            composer: Composer::default(),
            cache: SuggestionCache::new(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.composer = Composer::new(budget);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn client(&self) -> &SuggestionClient<G> {
        &self.client
    }

    pub fn cache(&self) -> &SuggestionCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub async fn log_class(&self, class: &NewClass) -> Result<ClassId, JournalError> {
        let id = self.store.insert_class(class).await?;
        info!("logged class {id} on {}", class.date);
        Ok(id)
    }

    /// Overwrite the class with `id` with whatever `edit` leaves behind.
    pub async fn edit_class<F>(&self, id: ClassId, edit: F) -> Result<ClassRecord, JournalError>
    where
        F: FnOnce(&mut NewClass),
    {
        let mut class = NewClass::from(self.store.get_class(id).await?);
        edit(&mut class);
        self.store.update_class(id, &class).await?;
        info!("updated class {id}");
        Ok(self.store.get_class(id).await?)
    }

    pub async fn delete_class(&self, id: ClassId) -> Result<(), JournalError> {
        self.store.delete_class(id).await?;
        info!("deleted class {id}");
        Ok(())
    }

    /// Insert the sample classes, dated relative to today.
    pub async fn seed_samples(&self) -> Result<usize, JournalError> {
        let samples = sample_classes(Local::now().date_naive());
        for class in &samples {
            self.store.insert_class(class).await?;
        }
        info!("inserted {} sample classes", samples.len());
        Ok(samples.len())
    }

    pub async fn history(&self, filter: &ClassFilter) -> Result<Vec<ClassRecord>, JournalError> {
        Ok(self.store.list_classes(filter).await?)
    }

    pub async fn references(
        &self,
    ) -> Result<(Vec<Location>, Vec<ClassType>, Vec<Theme>), JournalError> {
        Ok((
            self.store.locations().await?,
            self.store.class_types().await?,
            self.store.themes().await?,
        ))
    }

    pub async fn summarize(
        &self,
        filter: &ClassFilter,
        dimension: Dimension,
    ) -> Result<Vec<GroupSummary>, JournalError> {
        let records = self.store.list_classes(filter).await?;
        Ok(aggregate(&records, dimension))
    }

    pub async fn dashboard(&self, filter: &ClassFilter) -> Result<Dashboard, JournalError> {
        let records = self.store.list_classes(filter).await?;
        let mut top_themes = aggregate(&records, Dimension::Theme);
        top_themes.truncate(Dashboard::TOP_THEMES);
        Ok(Dashboard {
            overview: stats::overview(&records),
            by_location: aggregate(&records, Dimension::Location),
            by_class_type: aggregate(&records, Dimension::ClassType),
            top_themes,
            trend: student_trend(&records),
            range: student_range(&records),
        })
    }

    /// Build the prompt `task` would send, without sending it.
    pub async fn prepare(
        &self,
        task: Task,
        filter: &ClassFilter,
    ) -> Result<PromptContext, JournalError> {
        let records = self.store.list_classes(&filter_for(task, filter)).await?;
        let rows = to_rows(&aggregate(&records, dimension_for(task)));

        let mut instruction = Instruction::new(task);
        if let Some(kind) = task.idea_kind() {
            let previous = self.store.recent_ideas(kind, MAX_PREVIOUS_IDEAS).await?;
            instruction = instruction.avoiding(previous);
        }

        let context =
            self.composer
                .compose_avoiding(&rows, &instruction.text(), &instruction.reminders())?;
        info!(
            "composed {task} prompt from {} classes ({} of {} rows, {} earlier ideas)",
            records.len(),
            context.rows_included(),
            rows.len(),
            context.ideas_included()
        );
        Ok(context)
    }

    /// Ask the model for a `task` idea grounded in the filtered history.
    ///
    /// The reply is cached for the session. Theme and sequence ideas are
    /// also saved so later requests can steer away from them; a failure to
    /// save is logged and does not fail the request.
    pub async fn inspire(
        &mut self,
        task: Task,
        filter: &ClassFilter,
    ) -> Result<Suggestion, JournalError> {
        let context = self.prepare(task, filter).await?;
        let suggestion = self
            .client
            .suggest(context.as_str(), &self.model, &self.params)
            .await?;

        match extract_idea(task, &suggestion.raw_response_text, suggestion.timestamp) {
            Some(idea) => {
                if let Err(e) = self.store.record_idea(&idea).await {
                    warn!("could not save generated {task} '{}': {e}", idea.title);
                }
            }
            None if task.idea_kind().is_some() => {
                warn!("{task} reply did not follow the requested format; not saved");
            }
            None => {}
        }

        self.cache.insert(task, suggestion.clone());
        Ok(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_filter_keeps_the_higher_minimum() {
        let base = ClassFilter::new();
        assert_eq!(filter_for(Task::Sequence, &base).min_students, Some(15));
        assert_eq!(filter_for(Task::Theme, &base).min_students, None);
        let strict = ClassFilter::new().min_students(20);
        assert_eq!(filter_for(Task::Sequence, &strict).min_students, Some(20));
    }

    #[test]
    fn each_task_groups_along_its_dimension() {
        assert_eq!(dimension_for(Task::Theme), Dimension::Theme);
        assert_eq!(dimension_for(Task::Sequence), Dimension::Pose);
        assert_eq!(dimension_for(Task::Tip), Dimension::Location);
    }
}
