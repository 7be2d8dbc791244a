use async_trait::async_trait;

use crate::{
    error::StoreError,
    filter::ClassFilter,
    model::{ClassId, ClassRecord, ClassType, GeneratedIdea, IdeaKind, Location, NewClass, Theme},
};

/// Persistence boundary for class logs and their reference data.
///
/// Implementations own their own concurrency and isolation; callers should
/// assume nothing stronger than single-statement atomicity.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_class(&self, class: &NewClass) -> Result<ClassId, StoreError>;

    async fn update_class(&self, id: ClassId, class: &NewClass) -> Result<(), StoreError>;

    async fn delete_class(&self, id: ClassId) -> Result<(), StoreError>;

    async fn get_class(&self, id: ClassId) -> Result<ClassRecord, StoreError>;

    /// Matching classes, newest first.
    async fn list_classes(&self, filter: &ClassFilter) -> Result<Vec<ClassRecord>, StoreError>;

    async fn locations(&self) -> Result<Vec<Location>, StoreError>;

    async fn class_types(&self) -> Result<Vec<ClassType>, StoreError>;

    async fn themes(&self) -> Result<Vec<Theme>, StoreError>;

    async fn record_idea(&self, idea: &GeneratedIdea) -> Result<(), StoreError>;

    /// Most recent ideas of `kind`, newest first.
    async fn recent_ideas(
        &self,
        kind: IdeaKind,
        limit: usize,
    ) -> Result<Vec<GeneratedIdea>, StoreError>;
}
