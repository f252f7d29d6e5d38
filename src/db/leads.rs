use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{LeadRecord, NewLead};

pub async fn create(pool: &PgPool, lead: &NewLead) -> Result<LeadRecord, sqlx::Error> {
    sqlx::query_as::<_, LeadRecord>(
        "INSERT INTO leads (id, name, phone, course, social)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&lead.name)
    .bind(&lead.phone)
    .bind(&lead.course)
    .bind(&lead.social)
    .fetch_one(pool)
    .await
}
