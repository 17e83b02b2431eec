//! Report entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::ReportContent;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the reports table.
#[derive(Debug, Clone, FromRow)]
pub struct ReportEntity {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub event_id: Uuid,
    pub content: serde_json::Value,
    pub generator: String,
    pub webview_url: String,
    pub pdf_url: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl TryFrom<ReportEntity> for domain::models::Report {
    type Error = serde_json::Error;

    fn try_from(entity: ReportEntity) -> Result<Self, Self::Error> {
        let content: ReportContent = serde_json::from_value(entity.content)?;
        Ok(Self {
            id: entity.id,
            participant_id: entity.participant_id,
            event_id: entity.event_id,
            content,
            generator: entity.generator,
            webview_url: entity.webview_url,
            pdf_url: entity.pdf_url,
            generated_at: entity.generated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_entity_decodes_content() {
        let entity = ReportEntity {
            id: Uuid::new_v4(),
            participant_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            content: serde_json::json!({"strengths": ["focus"], "star": {"s": "S"}}),
            generator: "openai".to_string(),
            webview_url: "/api/v1/reports/x/view".to_string(),
            pdf_url: None,
            generated_at: Utc::now(),
        };
        let report = domain::models::Report::try_from(entity).unwrap();
        assert_eq!(report.content.strengths, vec!["focus".to_string()]);
        assert_eq!(report.content.star.len(), 1);
    }

    #[test]
    fn test_report_entity_rejects_malformed_content() {
        let entity = ReportEntity {
            id: Uuid::new_v4(),
            participant_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            content: serde_json::json!({"strengths": "not a list"}),
            generator: "openai".to_string(),
            webview_url: String::new(),
            pdf_url: None,
            generated_at: Utc::now(),
        };
        assert!(domain::models::Report::try_from(entity).is_err());
    }
}
