//! PostgreSQL implementation of CallRecorder.
//!
//! Call rows are upserted by call id so the same record can be written when
//! the call opens and again when it closes. Transcript lines are insert-only.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::call::{CallRecord, TranscriptRecord};
use crate::ports::{CallRecorder, RecorderError};

use super::MIGRATOR;

/// PostgreSQL implementation of CallRecorder.
#[derive(Debug, Clone)]
pub struct PostgresCallRecorder {
    pool: PgPool,
}

impl PostgresCallRecorder {
    /// Creates a recorder over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool from configuration, running migrations if asked to.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, RecorderError> {
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(config.idle_timeout())
            .max_lifetime(config.max_lifetime())
            .connect(&config.url)
            .await
            .map_err(|e| RecorderError::Unavailable(format!("Failed to connect: {}", e)))?;

        if config.run_migrations {
            MIGRATOR
                .run(&pool)
                .await
                .map_err(|e| RecorderError::Database(format!("Migration failed: {}", e)))?;
            tracing::info!("database migrations applied");
        }

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl CallRecorder for PostgresCallRecorder {
    async fn record_call(&self, call: &CallRecord) -> Result<(), RecorderError> {
        let duration = call
            .duration_secs
            .map(|secs| i64::try_from(secs).unwrap_or(i64::MAX));

        sqlx::query(
            r#"
            INSERT INTO calls (
                call_id, customer_name, agent_name, language, status, outcome,
                final_state, customer_data, start_time, end_time, duration_secs
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (call_id) DO UPDATE SET
                status = EXCLUDED.status,
                outcome = EXCLUDED.outcome,
                final_state = EXCLUDED.final_state,
                customer_data = EXCLUDED.customer_data,
                end_time = EXCLUDED.end_time,
                duration_secs = EXCLUDED.duration_secs
            "#,
        )
        .bind(call.call_id.as_uuid())
        .bind(&call.customer_name)
        .bind(&call.agent_name)
        .bind(&call.language)
        .bind(call.status.as_str())
        .bind(call.outcome.as_str())
        .bind(call.final_state.as_str())
        .bind(&call.customer_data)
        .bind(call.start_time.as_datetime())
        .bind(call.end_time.map(|t| *t.as_datetime()))
        .bind(duration)
        .execute(&self.pool)
        .await
        .map_err(|e| RecorderError::Database(format!("Failed to upsert call: {}", e)))?;

        Ok(())
    }

    async fn record_transcript(&self, line: &TranscriptRecord) -> Result<(), RecorderError> {
        sqlx::query(
            r#"
            INSERT INTO transcripts (id, call_id, sequence, speaker, text, state, spoken_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (call_id, sequence) DO NOTHING
            "#,
        )
        .bind(line.id.as_uuid())
        .bind(line.call_id.as_uuid())
        .bind(i64::from(line.sequence))
        .bind(line.speaker.as_str())
        .bind(&line.text)
        .bind(line.state.as_str())
        .bind(line.timestamp.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| RecorderError::Database(format!("Failed to insert transcript: {}", e)))?;

        Ok(())
    }
}
