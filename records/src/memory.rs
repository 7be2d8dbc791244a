//! In-process [`RecordStore`] used by tests and demos.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    error::StoreError,
    filter::ClassFilter,
    model::{
        ClassId, ClassRecord, ClassType, GeneratedIdea, IdeaKind, Location, NewClass, Theme,
    },
    reference::{CLASS_TYPES, LOCATIONS, THEMES},
    store::RecordStore,
};

#[derive(Default)]
struct MemoryState {
    next_id: ClassId,
    classes: Vec<ClassRecord>,
    locations: Vec<Location>,
    class_types: Vec<ClassType>,
    themes: Vec<Theme>,
    ideas: Vec<GeneratedIdea>,
}

/// Keeps classes in a vector behind a mutex. Seeded with the same reference
/// data as a fresh [`crate::Database`].
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let locations = LOCATIONS
            .iter()
            .zip(1..)
            .map(|(&(name, neighborhood, address), id)| Location {
                id,
                name: name.into(),
                neighborhood: Some(neighborhood.into()),
                address: Some(address.into()),
            })
            .collect();
        let class_types = CLASS_TYPES
            .iter()
            .zip(1..)
            .map(|(&(class_name, duration, heated, display), id)| ClassType {
                id,
                class_name: class_name.into(),
                duration_minutes: duration,
                is_heated: heated,
                display_name: display.into(),
            })
            .collect();
        let themes = THEMES
            .iter()
            .zip(1..)
            .map(|(&(name, category, notes), id)| Theme {
                id,
                name: name.into(),
                category: Some(category.into()),
                notes: Some(notes.into()),
            })
            .collect();
        Self {
            state: Mutex::new(MemoryState {
                next_id: 1,
                locations,
                class_types,
                themes,
                ..Default::default()
            }),
        }
    }

    /// A store holding exactly `records`, e.g. rows with missing fields that
    /// the insert path would never produce.
    pub fn with_records(records: Vec<ClassRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            state.next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            state.classes = records;
        }
        store
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Connection("memory store lock poisoned".into()))
    }
}

impl MemoryState {
    fn build(&self, id: ClassId, class: &NewClass) -> Result<ClassRecord, StoreError> {
        let location = self
            .locations
            .iter()
            .find(|l| l.name == class.location)
            .ok_or_else(|| StoreError::UnknownReference {
                kind: "location",
                name: class.location.clone(),
            })?;
        let class_type = self
            .class_types
            .iter()
            .find(|c| c.display_name == class.class_type)
            .ok_or_else(|| StoreError::UnknownReference {
                kind: "class type",
                name: class.class_type.clone(),
            })?;
        let theme_text = class
            .theme
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let known = theme_text.and_then(|name| {
            self.themes
                .iter()
                .find(|t| t.name.to_lowercase() == name.to_lowercase())
        });

        Ok(ClassRecord {
            id,
            date: class.date,
            time: class.time,
            day_of_week: class.day_of_week(),
            location: Some(location.name.clone()),
            class_type: Some(class_type.display_name.clone()),
            is_heated: Some(class_type.is_heated),
            theme: known
                .map(|t| t.name.clone())
                .or_else(|| theme_text.map(str::to_string)),
            theme_category: known.and_then(|t| t.category.clone()),
            peak_pose: class.peak_pose.clone(),
            energy: class.energy,
            student_count: class.student_count,
            vibe_rating: class.vibe_rating,
            intention: class.intention.clone(),
            notes: class.notes.clone(),
            sequence: class.sequence.clone().filter(|s| !s.is_empty()),
        })
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_class(&self, class: &NewClass) -> Result<ClassId, StoreError> {
        let mut state = self.lock()?;
        let id = state.next_id;
        let record = state.build(id, class)?;
        state.classes.push(record);
        state.next_id += 1;
        Ok(id)
    }

    async fn update_class(&self, id: ClassId, class: &NewClass) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let record = state.build(id, class)?;
        let slot = state
            .classes
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))?;
        *slot = record;
        Ok(())
    }

    async fn delete_class(&self, id: ClassId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let before = state.classes.len();
        state.classes.retain(|c| c.id != id);
        if state.classes.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn get_class(&self, id: ClassId) -> Result<ClassRecord, StoreError> {
        self.lock()?
            .classes
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_classes(&self, filter: &ClassFilter) -> Result<Vec<ClassRecord>, StoreError> {
        let state = self.lock()?;
        let mut classes: Vec<_> = state
            .classes
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        classes.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.time.cmp(&a.time))
                .then(b.id.cmp(&a.id))
        });
        Ok(classes)
    }

    async fn locations(&self) -> Result<Vec<Location>, StoreError> {
        let mut locations = self.lock()?.locations.clone();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }

    async fn class_types(&self) -> Result<Vec<ClassType>, StoreError> {
        let mut types = self.lock()?.class_types.clone();
        types.sort_by(|a, b| {
            a.class_name
                .cmp(&b.class_name)
                .then(a.duration_minutes.cmp(&b.duration_minutes))
                .then(a.display_name.cmp(&b.display_name))
        });
        Ok(types)
    }

    async fn themes(&self) -> Result<Vec<Theme>, StoreError> {
        let mut themes = self.lock()?.themes.clone();
        themes.sort_by(|a, b| a.category.cmp(&b.category).then(a.name.cmp(&b.name)));
        Ok(themes)
    }

    async fn record_idea(&self, idea: &GeneratedIdea) -> Result<(), StoreError> {
        self.lock()?.ideas.push(idea.clone());
        Ok(())
    }

    async fn recent_ideas(
        &self,
        kind: IdeaKind,
        limit: usize,
    ) -> Result<Vec<GeneratedIdea>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .ideas
            .iter()
            .rev()
            .filter(|i| i.kind == kind)
            .take(limit)
            .cloned()
            .collect())
    }
}
