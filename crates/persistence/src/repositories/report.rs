//! Report repository for database operations.

use domain::models::report::NewReport;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ReportEntity;
use crate::metrics::QueryTimer;

/// Repository for report database operations.
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    /// Creates a new ReportRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the participant's report.
    pub async fn upsert(
        &self,
        new: &NewReport,
        content: serde_json::Value,
    ) -> Result<ReportEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_report");
        let result = sqlx::query_as::<_, ReportEntity>(
            r#"
            INSERT INTO reports (participant_id, event_id, content, generator, webview_url, pdf_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (participant_id) DO UPDATE SET
                event_id = EXCLUDED.event_id,
                content = EXCLUDED.content,
                generator = EXCLUDED.generator,
                webview_url = EXCLUDED.webview_url,
                pdf_url = EXCLUDED.pdf_url,
                generated_at = NOW()
            RETURNING id, participant_id, event_id, content, generator, webview_url, pdf_url, generated_at
            "#,
        )
        .bind(new.participant_id)
        .bind(new.event_id)
        .bind(content)
        .bind(&new.generator)
        .bind(&new.webview_url)
        .bind(&new.pdf_url)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_participant(
        &self,
        participant_id: Uuid,
    ) -> Result<Option<ReportEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_report_by_participant");
        let result = sqlx::query_as::<_, ReportEntity>(
            r#"
            SELECT id, participant_id, event_id, content, generator, webview_url, pdf_url, generated_at
            FROM reports
            WHERE participant_id = $1
            "#,
        )
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
