//! Persistence seam. The real application stores annotation records in a
//! managed backend; this crate only needs create and list.

use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::FramemarkResult,
    model::{AnnotationDraft, AnnotationRecord},
};

/// External persistence collaborator for annotation records. No update or
/// delete: records are immutable in this core's scope.
// Pipelines are single-threaded and cooperative; implementations are not
// required to be Send.
#[allow(async_fn_in_trait)]
pub trait AnnotationStore {
    async fn create(&self, draft: AnnotationDraft) -> FramemarkResult<AnnotationRecord>;

    /// All records of a project, ordered by `timestamp_ms`.
    async fn list(&self, project_id: Uuid) -> FramemarkResult<Vec<AnnotationRecord>>;
}

/// In-memory store for tests and offline diagnostics.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<AnnotationRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AnnotationRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AnnotationStore for InMemoryStore {
    async fn create(&self, draft: AnnotationDraft) -> FramemarkResult<AnnotationRecord> {
        let record = AnnotationRecord {
            id: Uuid::new_v4(),
            project_id: draft.project_id,
            timestamp_ms: draft.timestamp_ms,
            canvas_data: draft.canvas_data,
            comment: draft.comment,
            created_at: Utc::now(),
        };
        self.lock().push(record.clone());
        Ok(record)
    }

    async fn list(&self, project_id: Uuid) -> FramemarkResult<Vec<AnnotationRecord>> {
        let mut out: Vec<AnnotationRecord> = self
            .lock()
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.timestamp_ms);
        Ok(out)
    }
}
