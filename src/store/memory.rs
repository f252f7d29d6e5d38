use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{LeadStore, StoreError};
use crate::models::{LeadRecord, NewLead};

/// In-process store. `set_failing(true)` makes every save fail.
#[derive(Default)]
pub struct MemoryLeadStore {
    records: Mutex<Vec<LeadRecord>>,
    failing: AtomicBool,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<LeadRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn save(&self, lead: &NewLead) -> Result<LeadRecord, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is not accepting writes".to_string()));
        }

        let record = LeadRecord {
            id: Uuid::now_v7(),
            name: lead.name.clone(),
            phone: lead.phone.clone(),
            course: lead.course.clone(),
            social: lead.social.clone(),
            created_at: Utc::now(),
        };

        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
        Ok(record)
    }
}
