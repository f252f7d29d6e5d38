pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{LeadRecord, NewLead};

pub use memory::MemoryLeadStore;
pub use postgres::PgLeadStore;

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(err) => write!(f, "Database error: {err}"),
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// Durable home of accepted leads. A successful `save` is what counts as "captured".
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn save(&self, lead: &NewLead) -> Result<LeadRecord, StoreError>;
}
