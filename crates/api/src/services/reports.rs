//! Personal report assembly.
//!
//! Reports are upserted, so each participant has at most one current report.

use domain::models::answer::AnswerFilter;
use domain::models::report::{
    tag_frequency, BatchReportResponse, GenerateReportRequest, GenerateReportResponse, NewReport,
    ParticipantMeta, ReportDetails, ReportInput, ReportParticipant, ReportSummary,
};
use domain::models::{Event, Participant, Report};
use domain::services::generator::placeholder_report;
use domain::services::{render_report_html, ReportHeader};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_report_generated;
use crate::services::access::find_event;

/// Public URL of the rendered report page.
pub fn webview_url(base_url: &str, participant_id: Uuid) -> String {
    format!(
        "{}/api/v1/reports/{}/view",
        base_url.trim_end_matches('/'),
        participant_id
    )
}

async fn find_participant(state: &AppState, id: Uuid) -> Result<Participant, ApiError> {
    state
        .store
        .find_participant(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Participant not found".to_string()))
}

async fn event_of(state: &AppState, participant: &Participant) -> Result<Event, ApiError> {
    state
        .store
        .find_event_by_id(participant.event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))
}

/// Builds and stores the report of one participant.
///
/// A generator failure falls back to the placeholder report.
pub async fn generate_for(
    state: &AppState,
    event: &Event,
    participant: &Participant,
) -> Result<Report, ApiError> {
    let answers = state
        .store
        .list_answers(AnswerFilter {
            event_id: Some(event.id),
            participant_id: Some(participant.id),
        })
        .await?;
    let slots = state
        .store
        .list_slots(event.id)
        .await?
        .into_iter()
        .map(|s| s.slot)
        .collect();

    let input = ReportInput {
        event_name: event.name.clone(),
        participant: ParticipantMeta {
            nickname: participant.nickname.clone(),
            team: participant.team.clone(),
        },
        slots,
        tag_frequency: tag_frequency(answers.iter().map(|a| a.answer.tags.as_slice())),
        answers,
    };

    let (content, generator) = match state.generator.generate_report(&input).await {
        Ok(content) => (content, state.generator.name()),
        Err(e) => {
            tracing::warn!(
                participant_id = %participant.id,
                generator = state.generator.name(),
                error = %e,
                "Report generation failed, using placeholder report"
            );
            (placeholder_report(&input), "placeholder")
        }
    };

    let report = state
        .store
        .upsert_report(NewReport {
            participant_id: participant.id,
            event_id: event.id,
            content,
            generator: generator.to_string(),
            webview_url: webview_url(&state.config.server.public_base_url, participant.id),
            pdf_url: None,
        })
        .await?;

    record_report_generated(generator);
    tracing::info!(
        event_code = %event.code,
        participant_id = %participant.id,
        answers = input.answers.len(),
        generator,
        "Report generated"
    );

    Ok(report)
}

pub async fn generate_report(
    state: &AppState,
    request: GenerateReportRequest,
) -> Result<GenerateReportResponse, ApiError> {
    let participant = find_participant(state, request.participant_id).await?;
    let event = event_of(state, &participant).await?;
    let report = generate_for(state, &event, &participant).await?;

    Ok(GenerateReportResponse {
        report_id: report.id,
        participant_id: report.participant_id,
        generator: report.generator,
        webview_url: report.webview_url,
        report: report.content,
    })
}

/// Generates reports for every participant of an event. A failure for one
/// participant does not stop the others.
pub async fn generate_event_reports(
    state: &AppState,
    code: &str,
) -> Result<BatchReportResponse, ApiError> {
    let event = find_event(state, code).await?;
    let participants = state.store.list_participants(event.id).await?;

    let mut generated = 0;
    for participant in &participants {
        match generate_for(state, &event, participant).await {
            Ok(_) => generated += 1,
            Err(e) => {
                tracing::warn!(
                    event_code = %event.code,
                    participant_id = %participant.id,
                    error = %e,
                    "Report generation failed, continuing"
                );
            }
        }
    }

    tracing::info!(
        event_code = %event.code,
        participants = participants.len(),
        generated,
        "Event reports generated"
    );

    Ok(BatchReportResponse {
        event_code: event.code,
        participants: participants.len(),
        generated,
        failed: participants.len() - generated,
    })
}

/// The stored report of a participant with the data it was built from.
pub async fn report_details(
    state: &AppState,
    participant_id: Uuid,
) -> Result<ReportDetails, ApiError> {
    let participant = find_participant(state, participant_id).await?;
    let report = state
        .store
        .find_report_by_participant(participant.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?;
    let event = event_of(state, &participant).await?;
    let answers = state
        .store
        .list_answers(AnswerFilter {
            event_id: Some(event.id),
            participant_id: Some(participant.id),
        })
        .await?;

    Ok(ReportDetails {
        summary: ReportSummary::from_answers(&answers),
        participant: ReportParticipant {
            id: participant.id,
            nickname: participant.nickname,
            team: participant.team,
        },
        event,
        report,
        answers,
    })
}

/// Renders the stored report as an HTML page.
pub async fn render_report_view(state: &AppState, participant_id: Uuid) -> Result<String, ApiError> {
    let details = report_details(state, participant_id).await?;
    let header = ReportHeader {
        event_name: &details.event.name,
        nickname: &details.participant.nickname,
        team: &details.participant.team,
    };
    Ok(render_report_html(
        &header,
        &details.report.content,
        &details.summary,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webview_url() {
        let id = Uuid::nil();
        assert_eq!(
            webview_url("http://localhost:3000/", id),
            "http://localhost:3000/api/v1/reports/00000000-0000-0000-0000-000000000000/view"
        );
    }
}
