use async_trait::async_trait;
use sqlx::PgPool;

use super::{LeadStore, StoreError};
use crate::db;
use crate::models::{LeadRecord, NewLead};

pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn save(&self, lead: &NewLead) -> Result<LeadRecord, StoreError> {
        Ok(db::leads::create(&self.pool, lead).await?)
    }
}
