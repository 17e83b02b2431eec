//! Personal insight report models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::answer::AnswerWithContext;
use super::event::Event;
use super::slot::Slot;

/// Count of each tag across a participant's answers.
pub type TagFrequency = BTreeMap<String, u32>;

/// Counts tags exactly as written. `demo` and `Demo` are different tags.
pub fn tag_frequency<'a, I>(tag_lists: I) -> TagFrequency
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut freq = TagFrequency::new();
    for tags in tag_lists {
        for tag in tags {
            *freq.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    freq
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    #[serde(default)]
    pub slot_title: String,
    #[serde(default)]
    pub snap: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Story {
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub validation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mentoring {
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub applied: Vec<String>,
}

/// A follow-up action for the next 30 days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NextAction {
    #[serde(default)]
    pub task: String,
    /// `YYYY-MM-DD`, as produced by the generator.
    #[serde(default)]
    pub due: String,
    #[serde(default)]
    pub priority: u8,
}

/// Situation / Task / Action / Result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StarItem {
    #[serde(default)]
    pub s: String,
    #[serde(default)]
    pub t: String,
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub r: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Social {
    #[serde(default)]
    pub linkedin3: String,
}

/// Structured body of a personal report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportContent {
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
    #[serde(default)]
    pub story: Story,
    #[serde(default)]
    pub mentoring: Mentoring,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub next30: Vec<NextAction>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub star: Vec<StarItem>,
    #[serde(default)]
    pub social: Social,
}

// Generators return `star` either as one object or as a list.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<StarItem>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(StarItem),
        Many(Vec<StarItem>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(item)) => vec![item],
        Some(OneOrMany::Many(items)) => items,
        None => Vec::new(),
    })
}

/// A generated report. At most one per participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub event_id: Uuid,
    pub content: ReportContent,
    /// Name of the generator that produced `content`.
    pub generator: String,
    pub webview_url: String,
    pub pdf_url: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Data needed to upsert a report.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub participant_id: Uuid,
    pub event_id: Uuid,
    pub content: ReportContent,
    pub generator: String,
    pub webview_url: String,
    pub pdf_url: Option<String>,
}

/// Participant fields passed to the generator.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantMeta {
    pub nickname: String,
    pub team: String,
}

/// Everything the report generator sees.
#[derive(Debug, Clone, Serialize)]
pub struct ReportInput {
    pub event_name: String,
    pub participant: ParticipantMeta,
    pub slots: Vec<Slot>,
    pub answers: Vec<AnswerWithContext>,
    pub tag_frequency: TagFrequency,
}

/// Request to generate one participant's report.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateReportRequest {
    #[serde(alias = "participantId")]
    pub participant_id: Uuid,
}

/// Response after generating one report.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReportResponse {
    pub report_id: Uuid,
    pub participant_id: Uuid,
    pub generator: String,
    pub webview_url: String,
    pub report: ReportContent,
}

/// Response after generating reports for a whole event.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReportResponse {
    pub event_code: String,
    pub participants: usize,
    pub generated: usize,
    pub failed: usize,
}

/// Participant as shown on a report page.
#[derive(Debug, Clone, Serialize)]
pub struct ReportParticipant {
    pub id: Uuid,
    pub nickname: String,
    pub team: String,
}

/// Aggregate numbers shown next to a report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_answers: usize,
    pub total_tags: usize,
    pub tag_frequency: TagFrequency,
}

impl ReportSummary {
    pub fn from_answers(answers: &[AnswerWithContext]) -> Self {
        Self {
            total_answers: answers.len(),
            total_tags: answers.iter().map(|a| a.answer.tags.len()).sum(),
            tag_frequency: tag_frequency(answers.iter().map(|a| a.answer.tags.as_slice())),
        }
    }
}

/// Full report view for a participant.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDetails {
    pub participant: ReportParticipant,
    pub event: Event,
    pub report: Report,
    pub answers: Vec<AnswerWithContext>,
    pub summary: ReportSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tag_frequency_is_case_sensitive() {
        let answers = vec![tags(&["demo"]), tags(&["Demo"])];
        let freq = tag_frequency(answers.iter().map(Vec::as_slice));
        assert_eq!(freq.get("demo"), Some(&1));
        assert_eq!(freq.get("Demo"), Some(&1));
        assert_eq!(freq.len(), 2);
    }

    #[test]
    fn test_tag_frequency_counts_repeats() {
        let answers = vec![tags(&["mentor", "pivot"]), tags(&["pivot"]), vec![]];
        let freq = tag_frequency(answers.iter().map(Vec::as_slice));
        assert_eq!(freq.get("pivot"), Some(&2));
        assert_eq!(freq.get("mentor"), Some(&1));
    }

    #[test]
    fn test_report_content_tolerates_missing_sections() {
        let content: ReportContent = serde_json::from_str(r#"{"strengths":["focus"]}"#).unwrap();
        assert_eq!(content.strengths, vec!["focus".to_string()]);
        assert!(content.timeline.is_empty());
        assert!(content.star.is_empty());
    }

    #[test]
    fn test_star_accepts_single_object() {
        let content: ReportContent =
            serde_json::from_str(r#"{"star":{"s":"S","t":"T","a":"A","r":"R"}}"#).unwrap();
        assert_eq!(content.star.len(), 1);
        assert_eq!(content.star[0].r, "R");
    }

    #[test]
    fn test_star_accepts_list() {
        let content: ReportContent =
            serde_json::from_str(r#"{"star":[{"s":"1"},{"s":"2"}]}"#).unwrap();
        assert_eq!(content.star.len(), 2);
    }

    #[test]
    fn test_timeline_photo_omitted_when_absent() {
        let entry = TimelineEntry {
            slot_title: "Kickoff".to_string(),
            snap: "Picked a problem".to_string(),
            photo: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("photo"));
    }
}
