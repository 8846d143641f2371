use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::quiz::models::{LearningPathRecord, LearningPathResult};

/// Generated learning paths, in creation order.
///
/// The process holds a single backend session, so this list belongs to that
/// session: every quiz session appends here, and signing out clears it.
#[derive(Debug, Default)]
pub struct LearningPathHistory {
    records: RwLock<Vec<LearningPathRecord>>,
}

impl LearningPathHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always appends, even when an identical path already exists.
    pub fn append(&self, path: LearningPathResult) -> LearningPathRecord {
        let record = LearningPathRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            path,
        };
        self.records.write().push(record.clone());
        record
    }

    pub fn list(&self) -> Vec<LearningPathRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn clear(&self) {
        self.records.write().clear();
    }
}
