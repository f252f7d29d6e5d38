use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::LeadRecord;

/// Body posted to every integration target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadPayload {
    pub name: String,
    pub phone: String,
    pub social: String,
    pub course: String,
    pub source: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<bool>,
}

impl LeadPayload {
    pub fn from_record(record: &LeadRecord, source: &str, website: Option<String>) -> Self {
        Self {
            name: record.name.clone(),
            phone: record.phone.clone(),
            social: record.social.clone(),
            course: record.course.clone(),
            source: source.to_string(),
            timestamp: record.created_at.to_rfc3339(),
            website,
            test: None,
        }
    }

    /// Synthetic lead used to check that a target is reachable.
    pub fn test(source: &str, course: &str) -> Self {
        Self {
            name: "Test Lead".to_string(),
            phone: "+79990000000".to_string(),
            social: "@test".to_string(),
            course: course.to_string(),
            source: source.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            website: None,
            test: Some(true),
        }
    }
}
